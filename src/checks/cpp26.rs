//! Standard-upgrade checks that need C++26.

use crate::ast::{NodeId, NodeKind, NodeTag, Storage, TranslationUnit};
use crate::lint::{Check, CheckCategory, CheckContext, CheckDescriptor, InplaceVectorOptions};
use crate::query::{
    MatchBinding, Matcher, NamePattern, Query, TypePredicate, any_of, argument, enclosing_function,
    initializer, integer_literal, kind, member_call, object, typed,
};
use crate::standard::CapabilityTier;

use super::util::{decl_label, type_name};

const STD_FUNCTION: NamePattern = NamePattern::One("::std::function");
const STD_VECTOR: NamePattern = NamePattern::One("::std::vector");

// ============================================================================
// PreferFunctionRef
// ============================================================================

pub struct PreferFunctionRef;

static PREFER_FUNCTION_REF: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-function-ref",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier26,
    "non-owning callable parameters should be std::function_ref",
);

impl Check for PreferFunctionRef {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_FUNCTION_REF
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "function-param",
            kind(NodeTag::ParmVarDecl)
                .and(any_of([
                    typed(TypePredicate::Named(STD_FUNCTION)),
                    typed(TypePredicate::ConstRefTo(STD_FUNCTION)),
                ]))
                .bind("param"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(param) = binding.get("param") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), param)
            .message(
                "std::function parameter can likely be replaced with std::function_ref (C++26) for non-owning callable references",
                &[],
            )
            .note("std::function_ref has zero overhead: no heap allocation, no type-erasure copy/move operations, typically just 2 pointers")
            .note("use std::function_ref when the callable does not need to outlive the function call; use std::move_only_function (C++23) for ownership transfer")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferInplaceVector
// ============================================================================

pub struct PreferInplaceVector {
    max_inplace_size: u64,
}

impl PreferInplaceVector {
    pub fn new(options: InplaceVectorOptions) -> Self {
        Self {
            max_inplace_size: options.max_inplace_size,
        }
    }
}

static PREFER_INPLACE_VECTOR: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-inplace-vector",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier26,
    "small fixed-capacity local vectors fit std::inplace_vector",
);

const QUERY_RESERVE: &str = "local-reserve";

impl Check for PreferInplaceVector {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_INPLACE_VECTOR
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_RESERVE,
                member_call(&["reserve"])
                    .and(object(
                        kind(NodeTag::DeclRefExpr)
                            .and(typed(TypePredicate::Class(STD_VECTOR)))
                            .bind("vector"),
                    ))
                    .and(argument(0, integer_literal().bind("size")))
                    .bind("anchor"),
            ),
            Query::new(
                "local-sized-vector",
                kind(NodeTag::VarDecl)
                    .and(typed(TypePredicate::Named(STD_VECTOR)))
                    .and(Matcher::LocalStorage)
                    .and(enclosing_function(kind(NodeTag::FunctionDecl)))
                    .and(initializer(
                        kind(NodeTag::ConstructExpr)
                            .and(argument(0, integer_literal().bind("size"))),
                    ))
                    .bind("anchor"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let (Some(anchor), Some(size)) = (binding.get("anchor"), binding.get("size")) else {
            return;
        };
        let tu = ctx.tu();
        let NodeKind::IntegerLiteral { value } = *tu.kind(size) else {
            return;
        };
        if value > self.max_inplace_size {
            return;
        }

        let composer = ctx.compose(self.descriptor(), anchor);
        let finding = if query == QUERY_RESERVE {
            let is_local = binding
                .get("vector")
                .is_some_and(|v| refers_to_local(tu, v));
            if !is_local {
                return;
            }
            composer
                .message(
                    "std::vector with reserve({0}) in local scope; consider std::inplace_vector<{0}> (C++26) to avoid heap allocation",
                    &[&value],
                )
                .note("std::inplace_vector stores all elements inline (on the stack), eliminating allocator overhead entirely")
        } else {
            composer
                .message(
                    "local std::vector({0}) with small fixed size; consider std::inplace_vector<T, {0}> (C++26) for zero-allocation storage",
                    &[&value],
                )
                .note("for pre-C++26 code, boost::static_vector or absl::InlinedVector provide similar stack-based storage")
        }
        .finish();
        ctx.report(finding);
    }
}

/// Whether `reference` names a vector with local storage: an automatic
/// variable, or a parameter taken by value.
fn refers_to_local(tu: &TranslationUnit, reference: NodeId) -> bool {
    let Some(decl) = tu.resolve_declaration(reference) else {
        return false;
    };
    let is_vector = tu
        .ty(decl)
        .is_some_and(|ty| ty.is_value() && STD_VECTOR.matches(ty.decl_name().unwrap_or_default()));
    is_vector
        && match tu.kind(decl) {
            NodeKind::VarDecl { storage, .. } => *storage == Storage::Automatic,
            NodeKind::ParmVarDecl { .. } => true,
            _ => false,
        }
}

// ============================================================================
// PreferCopyableFunction
// ============================================================================

pub struct PreferCopyableFunction;

static PREFER_COPYABLE_FUNCTION: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-copyable-function",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier26,
    "std::function should become std::copyable_function",
);

impl Check for PreferCopyableFunction {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_COPYABLE_FUNCTION
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "function-decl",
            any_of([
                kind(NodeTag::VarDecl),
                kind(NodeTag::FieldDecl),
                kind(NodeTag::ParmVarDecl),
            ])
            .and(typed(TypePredicate::Class(STD_FUNCTION)))
            .bind("decl"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(decl) = binding.get("decl") else {
            return;
        };
        let label = decl_label(ctx.tu(), decl);
        let finding = ctx
            .compose(self.descriptor(), decl)
            .message(
                "std::function {0} can be replaced with std::copyable_function (C++26) for stricter const/noexcept correctness",
                &[&label],
            )
            .note("std::copyable_function enforces that operator() const only invokes const-qualified callables, preventing subtle bugs with mutable lambdas")
            .note("if the callable does not need to be copied, prefer std::move_only_function (C++23) or std::function_ref (C++26) for even lower overhead")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferHive
// ============================================================================

pub struct PreferHive;

static PREFER_HIVE: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-hive",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier26,
    "linked lists kept for pointer stability fit std::hive",
);

impl Check for PreferHive {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_HIVE
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "list-decl",
            any_of([kind(NodeTag::VarDecl), kind(NodeTag::FieldDecl)])
                .and(typed(TypePredicate::Named(NamePattern::Any(&[
                    "::std::list",
                    "::std::forward_list",
                ]))))
                .bind("decl"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(decl) = binding.get("decl") else {
            return;
        };
        let container = type_name(ctx.tu(), decl);
        let finding = ctx
            .compose(self.descriptor(), decl)
            .message(
                "{0} has per-node allocation and cache-hostile traversal; consider std::hive (C++26) for stable pointers with cache-friendly iteration",
                &[&container],
            )
            .note("std::hive stores elements in contiguous blocks with a skipfield; provides O(1) insert/erase, stable pointers, and 5-20x faster iteration than linked lists")
            .note("if pointer/iterator stability is not needed, prefer std::vector which has the best cache locality; for pre-C++26, consider plf::colony")
            .finish();
        ctx.report(finding);
    }
}
