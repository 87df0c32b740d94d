use anyhow::Context;
use clap::Parser;
use cxx_clippy::CheckEngine;
use cxx_clippy::ast::AstDocument;
use cxx_clippy::catalog::catalog;
use cxx_clippy::cli::{Args, Command, LintArgs, OutputFormat};
use cxx_clippy::config;
use cxx_clippy::diagnostics::{FixIt, Finding, Note};
use cxx_clippy::lint::{CheckOptions, CheckRegistry, CheckSettings, resolve_check_alias};
use cxx_clippy::standard::LanguageFlags;
use itertools::Itertools;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// File suffix of dumped translation units.
const AST_SUFFIX: &str = ".ast.json";

fn main() -> ExitCode {
    cxx_clippy::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListChecks) => {
            list_checks();
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { check }) => {
            explain_check(&check)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_checks() {
    for d in catalog().descriptors().sorted_by_key(|d| d.id) {
        let fix_status = if d.fix.available {
            format!(" [fix: {}]", d.fix.safety.as_str())
        } else {
            String::new()
        };
        println!(
            "{}\t{}\t{}\t{}{}",
            d.id,
            d.category.as_str(),
            d.min_tier.requirement_label(),
            d.description,
            fix_status
        );
    }
}

fn explain_check(check: &str) -> anyhow::Result<()> {
    let canonical = resolve_check_alias(check);
    let Some(d) = catalog().get(canonical) else {
        anyhow::bail!("unknown check: {check}");
    };

    println!("id: {}", d.id);
    println!("legacy name: {}", d.legacy_name());
    println!("category: {}", d.category.as_str());
    println!("requires: {}", d.min_tier.requirement_label());
    println!("description: {}", d.description);
    if d.fix.available {
        println!("fix: available ({})", d.fix.safety.as_str());
        if !d.fix.description.is_empty() {
            println!("fix description: {}", d.fix.description);
        }
    } else {
        println!("fix: not available");
    }
    Ok(())
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    let start_dir = infer_start_dir(&args)?;
    let loaded_cfg = config::load_config(args.config.as_deref(), &start_dir)?;

    let (disabled, settings, options, fallback) = match loaded_cfg.as_ref() {
        Some((_path, cfg)) => (
            cfg.checks.disabled.clone(),
            CheckSettings::default()
                .with_config_levels(cfg.checks.levels.clone())
                .disable(cfg.checks.disabled.clone()),
            cfg.options.clone(),
            cfg.analysis.language()?,
        ),
        None => (
            Vec::new(),
            CheckSettings::default(),
            CheckOptions::default(),
            None,
        ),
    };

    // `--std` wins over both the document and the config fallback.
    let language_override = args
        .std
        .as_deref()
        .map(|s| {
            s.parse::<LanguageFlags>()
                .with_context(|| format!("invalid --std value: {s}"))
        })
        .transpose()?;

    let registry = CheckRegistry::default_checks_filtered(&args.only, &args.skip, &disabled, &options)?;
    let mut engine = CheckEngine::new_with_settings(registry, settings);
    if let Some(fallback) = fallback {
        engine = engine.with_fallback_language(fallback);
    }

    let documents = if args.paths.is_empty() {
        vec![read_stdin_document()?]
    } else {
        collect_ast_files(&args.paths)?
            .into_iter()
            .map(|path| {
                AstDocument::load(&path)
                    .with_context(|| format!("failed to load {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let mut findings = Vec::new();
    for doc in documents {
        let mut tu = engine.translation_unit(doc);
        if let Some(language) = language_override {
            tu = tu.with_language(language);
        }
        let file_findings = engine.analyze(&tu);
        if args.format == OutputFormat::Pretty {
            print_pretty(&file_findings);
            println!("{} findings for {}", file_findings.len(), tu.file());
        }
        findings.extend(file_findings);
    }

    match args.format {
        OutputFormat::Pretty => {}
        OutputFormat::Json => {
            let out = findings.iter().map(JsonFinding::from).collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Github => print_github(&findings),
    }

    Ok(ExitCode::SUCCESS)
}

fn read_stdin_document() -> anyhow::Result<AstDocument> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    let mut doc = AstDocument::from_json(&text).context("failed to load AST document from stdin")?;
    if doc.file.is_empty() {
        doc.file = "stdin".to_string();
    }
    Ok(doc)
}

#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    file: &'a str,
    row: usize,
    column: usize,
    level: &'static str,
    check: &'static str,
    legacy_name: String,
    message: &'a str,
    notes: &'a [Note],
    #[serde(skip_serializing_if = "Option::is_none")]
    fixit: Option<&'a FixIt>,
}

impl<'a> From<&'a Finding> for JsonFinding<'a> {
    fn from(f: &'a Finding) -> Self {
        Self {
            file: &f.file,
            row: f.span.start.row,
            column: f.span.start.column,
            level: f.level.as_str(),
            check: f.check.id,
            legacy_name: f.check.legacy_name(),
            message: &f.message,
            notes: &f.notes,
            fixit: f.fixit.as_ref(),
        }
    }
}

fn print_pretty(findings: &[Finding]) {
    for f in findings {
        println!(
            "{}:{}:{}: {}: {}: {}",
            f.file,
            f.span.start.row,
            f.span.start.column,
            f.level.as_str(),
            f.check.id,
            f.message
        );
        for note in &f.notes {
            println!("  note: {}", note.message);
        }
        if let Some(fix) = &f.fixit {
            println!("  fix-it: replace `{}` with `{}`", fix.original, fix.replacement);
        }
    }
}

fn print_github(findings: &[Finding]) {
    for f in findings {
        let body = std::iter::once(f.message.as_str())
            .chain(f.notes.iter().map(|n| n.message.as_str()))
            .join("\n");
        println!(
            "::{} file={},line={},col={},title={}::{}",
            f.level.as_str(),
            github_escape(&f.file),
            f.span.start.row,
            f.span.start.column,
            f.check.id,
            github_escape(&body)
        );
    }
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn collect_ast_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        collect_from_path(path, &mut out)?;
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn collect_from_path(path: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let meta =
        std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !meta.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    let walker = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && should_skip_dir(e.path())));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_ast_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

fn is_ast_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.ends_with(AST_SUFFIX))
}

fn should_skip_dir(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };

    matches!(name, ".git" | "target" | "build")
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    let base = match args.paths.first() {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };

    let base = if base.is_file() {
        base.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };

    Ok(base)
}
