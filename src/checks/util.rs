use crate::ast::{NodeId, NodeKind, TranslationUnit};

/// Human label of a declaration node, as used in messages.
pub(crate) fn decl_label(tu: &TranslationUnit, node: NodeId) -> &'static str {
    match tu.kind(node) {
        NodeKind::VarDecl { .. } => "variable",
        NodeKind::ParmVarDecl { .. } => "parameter",
        NodeKind::FieldDecl { .. } => "field",
        NodeKind::TypeAliasDecl { .. } => "type alias",
        _ => "declaration",
    }
}

/// Qualified name of the declaration behind a node's type, falling back to
/// the type's spelling.
pub(crate) fn type_name(tu: &TranslationUnit, node: NodeId) -> String {
    match tu.ty(node) {
        Some(ty) => ty
            .decl_name()
            .map(str::to_string)
            .unwrap_or_else(|| ty.spelling.clone()),
        None => String::new(),
    }
}

pub(crate) fn callee(tu: &TranslationUnit, node: NodeId) -> Option<&str> {
    match tu.kind(node) {
        NodeKind::CallExpr { callee } => callee.as_deref(),
        _ => None,
    }
}

pub(crate) fn method(tu: &TranslationUnit, node: NodeId) -> Option<&str> {
    match tu.kind(node) {
        NodeKind::MemberCallExpr { method, .. } => Some(method),
        _ => None,
    }
}

/// Unqualified tail of a qualified name: `std::regex_search` -> `regex_search`.
pub(crate) fn last_segment(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_segment_strips_qualification() {
        assert_eq!(last_segment("std::regex_search"), "regex_search");
        assert_eq!(last_segment("atoi"), "atoi");
    }
}
