//! Correlation of a lookup call with the comparison that consumes it.
//!
//! Existence tests such as `m.find(k) != m.end()` appear in several shapes
//! depending on the container and the language mode: a plain binary
//! comparison, an overloaded operator call, or (C++20 and later) a rewritten
//! comparison synthesized from `operator==`. Checks match the lookup call,
//! which is present in every shape, and then ask this module whether the
//! call's value flows straight into a comparison against the expected
//! sentinel.

use std::collections::BTreeSet;

use crate::ast::{NodeId, NodeKind, NodeTag, Opcode, TranslationUnit};
use crate::query::{NamePattern, operator_of};

/// Well-known "not found" marker a lookup result is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// `container.end()` / `container.cend()`.
    EndIterator,
    /// A reference to `npos`.
    NotFound,
    /// The integer literal `0`.
    Zero,
}

/// Comparison written with the lookup on the left: `lookup OP sentinel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    NotEqual,
    /// `lookup > sentinel`, or mirrored `sentinel < lookup`.
    Greater,
}

impl Relation {
    fn accepts(self, op: Opcode, lookup_on_left: bool) -> bool {
        match self {
            Relation::Equal => op == Opcode::Eq,
            Relation::NotEqual => op == Opcode::Ne,
            Relation::Greater => {
                (lookup_on_left && op == Opcode::Gt) || (!lookup_on_left && op == Opcode::Lt)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelComparison {
    pub sentinel: Sentinel,
    pub relations: &'static [Relation],
}

impl SentinelComparison {
    pub const fn new(sentinel: Sentinel, relations: &'static [Relation]) -> Self {
        Self {
            sentinel,
            relations,
        }
    }
}

/// Wrapper kinds the walk passes through on its way up. Known to be an
/// approximation: new wrapper kinds are added here as dumpers emit them.
pub const DEFAULT_TRANSPARENT: &[NodeTag] = &[
    NodeTag::ImplicitCastExpr,
    NodeTag::MaterializeTemporaryExpr,
    NodeTag::ConstructExpr,
    NodeTag::UnaryOperator,
    NodeTag::ExprWithCleanups,
    NodeTag::CxxBindTemporaryExpr,
    NodeTag::ParenExpr,
];

/// Bounded upward walk from a lookup call to its consuming comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelWalker {
    transparent: BTreeSet<NodeTag>,
}

impl Default for SentinelWalker {
    fn default() -> Self {
        Self {
            transparent: DEFAULT_TRANSPARENT.iter().copied().collect(),
        }
    }
}

impl SentinelWalker {
    /// A walker that skips nothing.
    pub fn empty() -> Self {
        Self {
            transparent: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_transparent(mut self, tag: NodeTag) -> Self {
        self.transparent.insert(tag);
        self
    }

    pub fn is_transparent(&self, tag: NodeTag) -> bool {
        self.transparent.contains(&tag)
    }

    /// Walk up from `node`:
    /// - a rewritten comparison anywhere on the path accepts;
    /// - the first comparison or operator call decides, accepting only an
    ///   allowed relation whose other operand is the sentinel;
    /// - transparent wrappers are skipped;
    /// - any other node rejects.
    pub fn is_followed_by_sentinel_comparison(
        &self,
        tu: &TranslationUnit,
        node: NodeId,
        comparison: &SentinelComparison,
    ) -> bool {
        let mut current = node;
        while let Some(parent) = tu.parent(current) {
            let kind = tu.kind(parent);
            if matches!(kind, NodeKind::RewrittenBinaryOperator { .. }) {
                return true;
            }
            if let Some(op) = operator_of(kind) {
                return compares_against_sentinel(tu, parent, current, op, comparison);
            }
            if !self.is_transparent(kind.tag()) {
                return false;
            }
            current = parent;
        }
        false
    }
}

/// [`SentinelWalker::is_followed_by_sentinel_comparison`] with the default
/// transparent table.
pub fn is_followed_by_sentinel_comparison(
    tu: &TranslationUnit,
    node: NodeId,
    comparison: &SentinelComparison,
) -> bool {
    SentinelWalker::default().is_followed_by_sentinel_comparison(tu, node, comparison)
}

fn compares_against_sentinel(
    tu: &TranslationUnit,
    operator: NodeId,
    from: NodeId,
    op: Opcode,
    comparison: &SentinelComparison,
) -> bool {
    let [lhs, rhs] = match tu.children(operator) {
        [lhs, rhs, ..] => [*lhs, *rhs],
        _ => return false,
    };
    let (lookup_on_left, other) = if lhs == from {
        (true, rhs)
    } else if rhs == from {
        (false, lhs)
    } else {
        return false;
    };

    is_sentinel(tu, tu.skip_implicit(other), comparison.sentinel)
        && comparison
            .relations
            .iter()
            .any(|r| r.accepts(op, lookup_on_left))
}

fn is_sentinel(tu: &TranslationUnit, node: NodeId, sentinel: Sentinel) -> bool {
    match (sentinel, tu.kind(node)) {
        (Sentinel::EndIterator, NodeKind::MemberCallExpr { method, .. }) => {
            method == "end" || method == "cend"
        }
        (Sentinel::NotFound, NodeKind::DeclRefExpr { name }) => {
            NamePattern::One("npos").matches(name)
        }
        (Sentinel::Zero, NodeKind::IntegerLiteral { value }) => *value == 0,
        _ => false,
    }
}
