//! AST dumping tool for debugging `.ast.json` inputs.
//!
//! Prints the loaded tree with the node ids checks see, the detected
//! capability tier and each node's source text.

use anyhow::Context;
use cxx_clippy::ast::{AstDocument, NodeId, TranslationUnit};
use cxx_clippy::standard::{CapabilityTier, LanguageFlags};
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn print_tree(tu: &TranslationUnit, node: NodeId, indent: usize) {
    let indent_str = "  ".repeat(indent);
    let data = tu.node(node);

    // Get node text (truncate if too long)
    let text = tu.text(node).unwrap_or("");
    let text_display = match text.char_indices().nth(50) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    };
    let text_display = text_display.replace('\n', "\\n");

    let ty = data
        .ty
        .as_ref()
        .map(|ty| format!(" : {}", ty.spelling))
        .unwrap_or_default();
    let origin = data
        .file
        .as_deref()
        .map(|f| format!(" [{f}]"))
        .unwrap_or_default();

    println!(
        "{}{} {:?}{}{}  \"{}\"",
        indent_str, node, data.kind, ty, origin, text_display
    );

    for &child in tu.children(node) {
        print_tree(tu, child, indent + 1);
    }
}

fn run(file_path: &str) -> anyhow::Result<()> {
    let doc = AstDocument::load(Path::new(file_path))
        .with_context(|| format!("failed to load {file_path}"))?;
    let tu = TranslationUnit::from_document(doc, LanguageFlags::for_tier(CapabilityTier::Unknown));

    println!("AST for {}:", tu.file());
    println!("tier: {}", CapabilityTier::detect(tu.language()));
    println!("================");
    print_tree(&tu, tu.root(), 0);
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: dump_ast <file.ast.json>");
        return ExitCode::from(1);
    }

    match run(&args[1]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}
