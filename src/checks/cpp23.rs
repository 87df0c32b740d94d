//! Standard-upgrade checks that need C++23.

use crate::ast::{FunctionRole, NodeTag, Opcode};
use crate::lint::{Check, CheckCategory, CheckContext, CheckDescriptor};
use crate::query::{
    FunctionPredicate, MatchBinding, Matcher, NamePattern, Query, TypePredicate, all_of, argument,
    any_of, call_to, decl_ref, enclosing_function, function, kind, not, typed,
};
use crate::standard::CapabilityTier;

use super::util::last_segment;

const STD_FUNCTION: NamePattern = NamePattern::One("::std::function");

// ============================================================================
// PreferExpected
// ============================================================================

pub struct PreferExpected;

static PREFER_EXPECTED: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-expected",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier23,
    "error signalling via std::optional or exceptions; std::expected carries typed errors",
);

const QUERY_OPTIONAL_RETURN: &str = "optional-return";

impl Check for PreferExpected {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_EXPECTED
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_OPTIONAL_RETURN,
                kind(NodeTag::FunctionDecl)
                    .and(function(FunctionPredicate::Returns(TypePredicate::Class(
                        NamePattern::One("::std::optional"),
                    ))))
                    .bind("node"),
            ),
            Query::new(
                "throw-in-function",
                kind(NodeTag::ThrowExpr)
                    .and(enclosing_function(not(any_of([
                        function(FunctionPredicate::Role(FunctionRole::Constructor)),
                        function(FunctionPredicate::Role(FunctionRole::Destructor)),
                    ]))))
                    .bind("node"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let composer = ctx.compose(self.descriptor(), node);
        let finding = if query == QUERY_OPTIONAL_RETURN {
            composer
                .message(
                    "function returns std::optional but may benefit from std::expected<T, E> (C++23) to propagate error information",
                    &[],
                )
                .note("std::expected carries both the success value and a typed error, enabling richer error handling without exceptions")
                .note("use monadic operations (.and_then, .or_else, .transform) for composable error handling pipelines")
        } else {
            composer
                .message(
                    "throw expression in regular function; exceptions have high overhead for expected error conditions; consider returning std::expected<T, E> (C++23) instead",
                    &[],
                )
                .note("exception unwinding traverses the call stack and involves RTTI; std::expected is a zero-overhead value type")
                .note("reserve exceptions for truly exceptional/unrecoverable conditions (out of memory, invariant violations)")
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferMoveOnlyFunction
// ============================================================================

pub struct PreferMoveOnlyFunction;

static PREFER_MOVE_ONLY_FUNCTION: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-move-only-function",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier23,
    "owned callbacks that are never copied fit std::move_only_function",
);

const QUERY_FIELD: &str = "function-field";
const QUERY_BY_VALUE: &str = "function-by-value-param";

impl Check for PreferMoveOnlyFunction {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_MOVE_ONLY_FUNCTION
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_FIELD,
                kind(NodeTag::FieldDecl)
                    .and(typed(TypePredicate::Named(STD_FUNCTION)))
                    .bind("decl"),
            ),
            Query::new(
                QUERY_BY_VALUE,
                kind(NodeTag::ParmVarDecl)
                    .and(typed(TypePredicate::Named(STD_FUNCTION)))
                    .bind("decl"),
            ),
            Query::new(
                "function-rvalue-param",
                kind(NodeTag::ParmVarDecl)
                    .and(typed(TypePredicate::RValueRefTo(STD_FUNCTION)))
                    .bind("decl"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(decl) = binding.get("decl") else {
            return;
        };
        let label = match query {
            QUERY_FIELD => "field",
            QUERY_BY_VALUE => "by-value parameter",
            _ => "rvalue-reference parameter",
        };
        let finding = ctx
            .compose(self.descriptor(), decl)
            .message(
                "std::function {0} can likely be replaced with std::move_only_function (C++23) for move-only callbacks",
                &[&label],
            )
            .note("std::move_only_function does not require the callable to be copyable, enabling more aggressive small-buffer optimization and eliminating unnecessary copy overhead")
            .note("std::move_only_function also supports const, noexcept, and ref-qualified call operators for stronger API contracts")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferUnreachable
// ============================================================================

pub struct PreferUnreachable;

static PREFER_UNREACHABLE: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-unreachable",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier23,
    "compiler-specific unreachable hints should use std::unreachable()",
);

const QUERY_BUILTIN: &str = "builtin-unreachable";

impl Check for PreferUnreachable {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_UNREACHABLE
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_BUILTIN,
                call_to(&["::__builtin_unreachable"]).bind("call"),
            ),
            Query::new("msvc-assume", call_to(&["::__assume"]).bind("call")),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let composer = ctx.compose(self.descriptor(), call);
        let finding = if query == QUERY_BUILTIN {
            composer
                .message(
                    "__builtin_unreachable() is a GCC/Clang extension; use std::unreachable() (C++23) for portable code",
                    &[],
                )
                .note("std::unreachable() provides the same optimization hint to the compiler while being portable across all C++23 compilers")
        } else {
            composer.message(
                "__assume(false) is an MSVC extension; use std::unreachable() (C++23) for portable code",
                &[],
            )
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferToUnderlying
// ============================================================================

pub struct PreferToUnderlying;

static PREFER_TO_UNDERLYING: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-to-underlying",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier23,
    "casting a scoped enum to an integer should use std::to_underlying()",
);

impl Check for PreferToUnderlying {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_TO_UNDERLYING
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "enum-to-integer-cast",
            all_of([
                kind(NodeTag::StaticCastExpr),
                typed(TypePredicate::Integer),
            ])
            .bind("cast"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(cast) = binding.get("cast") else {
            return;
        };
        let tu = ctx.tu();
        // The cast's own operand, not some enum nested deeper inside it.
        let Some(operand) = tu.child(cast, 0).map(|c| tu.skip_implicit(c)) else {
            return;
        };
        let Some(ty) = tu
            .ty(operand)
            .filter(|ty| TypePredicate::ScopedEnum.matches(ty))
        else {
            return;
        };
        let name = last_segment(ty.decl_name().unwrap_or(ty.spelling.as_str()));

        let finding = ctx
            .compose(self.descriptor(), cast)
            .message(
                "static_cast of scoped enum '{0}' to integer; use std::to_underlying() (C++23) for type-safe conversion",
                &[&name],
            )
            .note("std::to_underlying() always returns the correct underlying type, preventing silent truncation or widening bugs")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferPrint
// ============================================================================

pub struct PreferPrint;

static PREFER_PRINT: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-print",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier23,
    "C stdio and iostream output should use std::print/std::println",
);

const QUERY_PRINTF: &str = "printf-call";
const QUERY_FPRINTF: &str = "fprintf-call";

impl Check for PreferPrint {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_PRINT
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_PRINTF,
                call_to(&["::printf", "::puts", "::std::printf", "::std::puts"]).bind("node"),
            ),
            Query::new(
                QUERY_FPRINTF,
                call_to(&["::fprintf", "::fputs", "::std::fprintf", "::std::fputs"]).bind("node"),
            ),
            // Only the innermost `<<` of a chain has the stream as its left
            // operand, so each chain is reported once.
            Query::new(
                "stream-shift",
                kind(NodeTag::OperatorCallExpr)
                    .and(Matcher::Operator(&[Opcode::Shl]))
                    .and(argument(0, decl_ref(&["::std::cout", "::std::cerr"])))
                    .bind("node"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let composer = ctx.compose(self.descriptor(), node);
        let finding = match query {
            QUERY_PRINTF => composer
                .message(
                    "printf/puts is not type-safe; use std::print/std::println (C++23) with compile-time format validation",
                    &[],
                )
                .note("std::print writes directly without global mutex contention and supports user-defined types via std::formatter"),
            QUERY_FPRINTF => composer.message(
                "fprintf/fputs is not type-safe; use std::print(stream, fmt, args...) (C++23)",
                &[],
            ),
            _ => composer
                .message(
                    "cout/cerr << chain has global mutex contention and stateful formatting; use std::print/std::println (C++23)",
                    &[],
                )
                .note("std::println handles newline automatically without flush overhead, and formatting is localized to each call"),
        }
        .finish();
        ctx.report(finding);
    }
}
