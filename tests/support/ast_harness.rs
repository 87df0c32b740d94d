#![allow(dead_code)]

use cxx_clippy::CheckEngine;
use cxx_clippy::ast::{
    AstNode, ConstructorKind, FunctionRole, NodeKind, Opcode, RecordInfo, SourceRange, Storage,
    TranslationUnit, TypeRef,
};
use cxx_clippy::diagnostics::Finding;
use cxx_clippy::lint::{CheckOptions, CheckRegistry};
use cxx_clippy::standard::{CapabilityTier, LanguageFlags};

/// Source text of a test unit. Node ranges are located by substring so the
/// tree and the text cannot drift apart.
#[derive(Debug, Clone, Copy)]
pub struct Source(pub &'static str);

impl Source {
    /// Range of the first occurrence of `needle`.
    pub fn at(&self, needle: &str) -> SourceRange {
        self.nth(needle, 0)
    }

    /// Range of the `n`th (0-based) occurrence of `needle`.
    pub fn nth(&self, needle: &str, n: usize) -> SourceRange {
        let begin = self
            .0
            .match_indices(needle)
            .nth(n)
            .map(|(i, _)| i)
            .unwrap_or_else(|| panic!("{needle:?} occurrence {n} not in source"));
        SourceRange::new(begin, begin + needle.len())
    }
}

// ============================================================================
// Node builders
// ============================================================================

pub fn function(name: &str) -> AstNode {
    AstNode::new(NodeKind::FunctionDecl {
        name: name.to_string(),
        returns: None,
        role: FunctionRole::Free,
        special: Default::default(),
        is_definition: true,
        is_defaulted: false,
        is_deleted: false,
        is_noexcept: false,
    })
}

pub fn function_with_role(name: &str, role: FunctionRole) -> AstNode {
    let mut node = function(name);
    if let NodeKind::FunctionDecl { role: r, .. } = &mut node.kind {
        *r = role;
    }
    node
}

pub fn function_returning(name: &str, ty: TypeRef) -> AstNode {
    let mut node = function(name);
    if let NodeKind::FunctionDecl { returns, .. } = &mut node.kind {
        *returns = Some(ty);
    }
    node
}

pub fn compound() -> AstNode {
    AstNode::new(NodeKind::CompoundStmt)
}

pub fn return_stmt(value: AstNode) -> AstNode {
    AstNode::new(NodeKind::ReturnStmt).child(value)
}

pub fn for_loop() -> AstNode {
    AstNode::new(NodeKind::ForStmt)
}

pub fn record(name: &str) -> AstNode {
    AstNode::new(NodeKind::RecordDecl {
        name: name.to_string(),
    })
}

pub fn local(name: &str, ty: TypeRef) -> AstNode {
    AstNode::new(NodeKind::VarDecl {
        name: name.to_string(),
        storage: Storage::Automatic,
    })
    .typed(ty)
}

pub fn global(name: &str, ty: TypeRef) -> AstNode {
    AstNode::new(NodeKind::VarDecl {
        name: name.to_string(),
        storage: Storage::Static,
    })
    .typed(ty)
}

pub fn param(name: &str, ty: TypeRef) -> AstNode {
    AstNode::new(NodeKind::ParmVarDecl {
        name: name.to_string(),
    })
    .typed(ty)
}

pub fn field(name: &str, ty: TypeRef) -> AstNode {
    AstNode::new(NodeKind::FieldDecl {
        name: name.to_string(),
    })
    .typed(ty)
}

pub fn alias(name: &str, ty: TypeRef) -> AstNode {
    AstNode::new(NodeKind::TypeAliasDecl {
        name: name.to_string(),
    })
    .typed(ty)
}

pub fn call(callee: &str) -> AstNode {
    AstNode::new(NodeKind::CallExpr {
        callee: Some(callee.to_string()),
    })
}

/// Member call; `object` becomes child 0.
pub fn member_call(method: &str, class: &str, object: AstNode) -> AstNode {
    AstNode::new(NodeKind::MemberCallExpr {
        method: method.to_string(),
        class: Some(class.to_string()),
        is_virtual: false,
    })
    .child(object)
}

pub fn virtual_call(method: &str, class: &str, object: AstNode) -> AstNode {
    AstNode::new(NodeKind::MemberCallExpr {
        method: method.to_string(),
        class: Some(class.to_string()),
        is_virtual: true,
    })
    .child(object)
}

pub fn decl_ref(name: &str) -> AstNode {
    AstNode::new(NodeKind::DeclRefExpr {
        name: name.to_string(),
    })
}

pub fn int(value: u64) -> AstNode {
    AstNode::new(NodeKind::IntegerLiteral { value }).typed(TypeRef::integer("int"))
}

pub fn string_literal() -> AstNode {
    AstNode::new(NodeKind::StringLiteral)
}

pub fn operator_call(op: Opcode, lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::OperatorCallExpr { operator: op })
        .child(lhs)
        .child(rhs)
}

pub fn binary(op: Opcode, lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::BinaryOperator { opcode: op })
        .child(lhs)
        .child(rhs)
}

pub fn rewritten(op: Opcode, inner: AstNode) -> AstNode {
    AstNode::new(NodeKind::RewrittenBinaryOperator { opcode: op }).child(inner)
}

pub fn implicit(inner: AstNode) -> AstNode {
    AstNode::new(NodeKind::ImplicitCastExpr).child(inner)
}

pub fn static_cast(to: TypeRef, operand: AstNode) -> AstNode {
    AstNode::new(NodeKind::StaticCastExpr).typed(to).child(operand)
}

pub fn throw_expr() -> AstNode {
    AstNode::new(NodeKind::ThrowExpr)
}

pub fn construct(constructor: ConstructorKind) -> AstNode {
    AstNode::new(NodeKind::ConstructExpr { constructor })
}

// ============================================================================
// Units and runs
// ============================================================================

pub fn flags(tier: CapabilityTier) -> LanguageFlags {
    LanguageFlags::for_tier(tier)
}

/// A unit whose top-level declarations are `children`.
pub fn unit(
    tier: CapabilityTier,
    source: Source,
    records: Vec<RecordInfo>,
    children: Vec<AstNode>,
) -> TranslationUnit {
    TranslationUnit::new(
        "test.cpp",
        source.0,
        flags(tier),
        records,
        AstNode::new(NodeKind::TranslationUnitDecl).with_children(children),
    )
}

/// What a C++23 standard library declares on `std::basic_string`.
pub fn string_records() -> Vec<RecordInfo> {
    vec![RecordInfo::new(
        "std::basic_string",
        &[
            "find",
            "rfind",
            "substr",
            "compare",
            "size",
            "length",
            "starts_with",
            "ends_with",
            "contains",
        ],
    )]
}

pub fn map_records() -> Vec<RecordInfo> {
    vec![
        RecordInfo::new("std::map", &["find", "count", "end", "contains"]),
        RecordInfo::new("std::set", &["find", "count", "end", "contains"]),
    ]
}

/// Run a single check (by any name it answers to) over `tu`.
pub fn run_check(name: &str, tu: &TranslationUnit) -> Vec<Finding> {
    run_check_with(name, tu, &CheckOptions::default())
}

pub fn run_check_with(name: &str, tu: &TranslationUnit, options: &CheckOptions) -> Vec<Finding> {
    let registry = CheckRegistry::default_checks_filtered(&[name.to_string()], &[], &[], options)
        .expect("check name should be known");
    CheckEngine::new(registry).analyze(tu)
}

pub fn run_all(tu: &TranslationUnit) -> Vec<Finding> {
    cxx_clippy::create_default_engine().analyze(tu)
}

/// Render findings one per block, in the CLI's pretty layout.
pub fn render(findings: &[Finding]) -> String {
    let mut lines = Vec::new();
    for f in findings {
        lines.push(format!(
            "{}:{}: {}: {}",
            f.span.start.row, f.span.start.column, f.check.id, f.message
        ));
        for note in &f.notes {
            lines.push(format!("  note: {}", note.message));
        }
        if let Some(fix) = &f.fixit {
            lines.push(format!("  fix-it: `{}` -> `{}`", fix.original, fix.replacement));
        }
    }
    lines.join("\n")
}

pub fn ids(findings: &[Finding]) -> Vec<&'static str> {
    findings.iter().map(|f| f.check.id).collect()
}

pub fn note_texts(finding: &Finding) -> Vec<&str> {
    finding.notes.iter().map(|n| n.message.as_str()).collect()
}
