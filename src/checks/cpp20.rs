//! Standard-upgrade checks whose primary replacement arrived in C++20, plus
//! `prefer-flat-containers`, whose advice climbs to C++23.

use crate::ast::{NodeId, NodeTag, Opcode, TranslationUnit};
use crate::compose::render;
use crate::lint::{Check, CheckCategory, CheckContext, CheckDescriptor};
use crate::query::{
    MatchBinding, Matcher, NamePattern, Query, TypePredicate, any_of, argument, call_to,
    descendant, kind, member_call, operand, typed, zero_literal,
};
use crate::resolver::{Relation, Sentinel, SentinelComparison, is_followed_by_sentinel_comparison};
use crate::standard::CapabilityTier;

use super::util::{callee, last_segment, type_name};

// ============================================================================
// PreferJthread
// ============================================================================

pub struct PreferJthread;

static PREFER_JTHREAD: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-jthread",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "std::thread needs manual join/detach; std::jthread joins on destruction",
);

impl Check for PreferJthread {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_JTHREAD
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "thread-decl",
            any_of([kind(NodeTag::VarDecl), kind(NodeTag::FieldDecl)])
                .and(typed(TypePredicate::Named(NamePattern::One("::std::thread"))))
                .bind("decl"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(decl) = binding.get("decl") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), decl)
            .message(
                "std::thread requires manual join/detach; prefer std::jthread (C++20) which auto-joins on destruction and supports cooperative cancellation via std::stop_token",
                &[],
            )
            .note("std::jthread eliminates common bugs: dangling threads, std::terminate on non-joined threads, and manual cancellation logic")
            .note("for high-load services, std::jthread with std::stop_token enables graceful shutdown without external synchronization")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferFormat
// ============================================================================

pub struct PreferFormat;

static PREFER_FORMAT: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-format",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "string streams and printf-style formatting should move to std::format",
);

const QUERY_STRINGSTREAM: &str = "stringstream-var";
const QUERY_SPRINTF: &str = "sprintf-call";
const QUERY_FPRINTF: &str = "fprintf-call";

const STRING_STREAMS: NamePattern = NamePattern::Any(&[
    "::std::stringstream",
    "::std::ostringstream",
    "::std::istringstream",
    "::std::basic_stringstream",
    "::std::basic_ostringstream",
    "::std::basic_istringstream",
]);

impl Check for PreferFormat {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_FORMAT
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_STRINGSTREAM,
                kind(NodeTag::VarDecl)
                    .and(typed(TypePredicate::Named(STRING_STREAMS)))
                    .bind("node"),
            ),
            Query::new(
                QUERY_SPRINTF,
                call_to(&["::sprintf", "::snprintf", "::std::sprintf", "::std::snprintf"])
                    .bind("node"),
            ),
            Query::new(
                QUERY_FPRINTF,
                call_to(&["::fprintf", "::std::fprintf"]).bind("node"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let composer = ctx.compose(self.descriptor(), node);
        let finding = match query {
            QUERY_STRINGSTREAM => composer
                .message(
                    "std::stringstream has significant overhead: virtual dispatch, locale handling, and heap allocation; prefer std::format (C++20)",
                    &[],
                )
                .note("std::format is type-safe, faster, and validates format strings at compile time")
                .upgrade(
                    "std::print",
                    CapabilityTier::Tier23,
                    "for direct output use std::print/std::println (C++23); avoids intermediate string allocation entirely",
                ),
            QUERY_SPRINTF => composer
                .message(
                    "sprintf/snprintf are not type-safe and risk buffer overflow; prefer std::format (C++20) or std::format_to for pre-allocated buffers",
                    &[],
                )
                .note("std::format_to writes into an output iterator, allowing direct output to a pre-sized buffer without intermediate string allocation"),
            _ => composer
                .message(
                    "fprintf is not type-safe; prefer std::format (C++20) with explicit write, or std::print (C++23) for direct output",
                    &[],
                )
                .upgrade(
                    "std::print",
                    CapabilityTier::Tier23,
                    "std::print(stream, fmt, args...) provides type-safe formatted output directly to a stream (C++23)",
                ),
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferSpan
// ============================================================================

pub struct PreferSpan;

static PREFER_SPAN: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-span",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "contiguous-range parameters should be std::span",
);

const QUERY_VECTOR_REF: &str = "const-vector-ref-param";

/// Parameter-name fragments that suggest a pointer addresses a buffer.
const BUFFER_HINTS: &[&str] = &["buf", "data", "ptr", "arr", "items", "elems"];

impl Check for PreferSpan {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_SPAN
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_VECTOR_REF,
                kind(NodeTag::ParmVarDecl)
                    .and(typed(TypePredicate::ConstRefTo(NamePattern::One(
                        "::std::vector",
                    ))))
                    .bind("param"),
            ),
            Query::new(
                "pointer-param",
                kind(NodeTag::ParmVarDecl)
                    .and(typed(TypePredicate::Pointer))
                    .bind("param"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(param) = binding.get("param") else {
            return;
        };
        let tu = ctx.tu();

        if query == QUERY_VECTOR_REF {
            let finding = ctx
                .compose(self.descriptor(), param)
                .message(
                    "'const std::vector<T>&' parameter ties the interface to std::vector; prefer std::span<const T> (C++20) to accept any contiguous range (vector, array, C-array)",
                    &[],
                )
                .note("std::span is a non-owning view with zero overhead; it decouples the interface from the container type")
                .finish();
            ctx.report(finding);
            return;
        }

        let name = tu.kind(param).decl_name().unwrap_or_default();
        if name.is_empty() {
            return;
        }
        let lowered = name.to_ascii_lowercase();
        let suggestive = BUFFER_HINTS.iter().any(|h| lowered.contains(h));
        if !suggestive && !followed_by_size(tu, param) {
            return;
        }

        let finding = ctx
            .compose(self.descriptor(), param)
            .message(
                "raw pointer parameter '{0}' with suggestive name; consider std::span (C++20) for bounds-safe contiguous access",
                &[&name],
            )
            .note("std::span encapsulates pointer+size, preventing buffer overruns and making the API self-documenting")
            .finish();
        ctx.report(finding);
    }
}

/// The parameter right after `param` has integer type: the `(T*, size_t)`
/// signature.
fn followed_by_size(tu: &TranslationUnit, param: NodeId) -> bool {
    let Some(function) = tu.parent(param) else {
        return false;
    };
    let siblings = tu.children(function);
    let Some(pos) = siblings.iter().position(|&s| s == param) else {
        return false;
    };
    siblings.get(pos + 1).is_some_and(|&next| {
        tu.tag(next) == NodeTag::ParmVarDecl && tu.ty(next).is_some_and(|t| t.is_integer && !t.is_pointer)
    })
}

// ============================================================================
// PreferStartsEndsWith
// ============================================================================

pub struct PreferStartsEndsWith;

static PREFER_STARTS_ENDS_WITH: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-starts-ends-with",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "hand-written prefix/suffix tests should use starts_with/ends_with",
);

const QUERY_FIND_ZERO: &str = "find-eq-zero";
const QUERY_RFIND_ZERO: &str = "rfind-eq-zero";
const QUERY_SUBSTR: &str = "substr-eq";
const QUERY_COMPARE_PREFIX: &str = "compare-prefix-eq-zero";
const QUERY_COMPARE_SUFFIX: &str = "compare-suffix-eq-zero";

static EQUALS_ZERO: SentinelComparison = SentinelComparison::new(Sentinel::Zero, &[Relation::Equal]);

fn string_method(name: &'static [&'static str]) -> Matcher {
    member_call(name).and(Matcher::ClassDeclares("starts_with"))
}

impl Check for PreferStartsEndsWith {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_STARTS_ENDS_WITH
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(QUERY_FIND_ZERO, string_method(&["find"]).bind("call")),
            Query::new(
                QUERY_RFIND_ZERO,
                string_method(&["rfind"])
                    .and(argument(1, zero_literal()))
                    .bind("call"),
            ),
            Query::new(
                QUERY_SUBSTR,
                kind(NodeTag::OperatorCallExpr)
                    .and(Matcher::Operator(&[Opcode::Eq]))
                    .and(descendant(
                        string_method(&["substr"])
                            .and(argument(0, zero_literal()))
                            .bind("call"),
                    )),
            ),
            Query::new(
                QUERY_COMPARE_PREFIX,
                string_method(&["compare"])
                    .and(Matcher::ArgumentCount(3))
                    .and(argument(0, zero_literal()))
                    .bind("call"),
            ),
            Query::new(
                QUERY_COMPARE_SUFFIX,
                member_call(&["compare"])
                    .and(Matcher::ClassDeclares("ends_with"))
                    .and(Matcher::ArgumentCount(3))
                    .and(argument(
                        0,
                        kind(NodeTag::BinaryOperator)
                            .and(Matcher::Operator(&[Opcode::Sub]))
                            .and(operand(member_call(&["size", "length"]))),
                    ))
                    .bind("call"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        // Every shape except substr is only a prefix test when the call's
        // value is compared with 0.
        if query != QUERY_SUBSTR && !is_followed_by_sentinel_comparison(ctx.tu(), call, &EQUALS_ZERO) {
            return;
        }

        let composer = ctx.compose(self.descriptor(), call);
        let finding = match query {
            QUERY_FIND_ZERO => composer
                .message(
                    "s.find(x) == 0 scans the entire string to check a prefix; use s.starts_with(x) (C++20) which is O(prefix length)",
                    &[],
                )
                .note("starts_with performs no allocation and clearly expresses intent; also works on std::string_view"),
            QUERY_RFIND_ZERO => composer
                .message(
                    "s.rfind(x, 0) == 0 is an obscure way to check a prefix; use s.starts_with(x) (C++20) for clarity",
                    &[],
                )
                .note("starts_with performs no allocation and clearly expresses intent; also works on std::string_view"),
            QUERY_SUBSTR => composer
                .message(
                    "s.substr(0, n) == x ALLOCATES a temporary string to check a prefix; use s.starts_with(x) (C++20) for zero allocation",
                    &[],
                )
                .note("this pattern creates a heap-allocated temporary on every call; critical in hot paths with high request rates"),
            QUERY_COMPARE_PREFIX => composer.message(
                "s.compare(0, n, x) == 0 is correct but verbose; use s.starts_with(x) (C++20) for clarity",
                &[],
            ),
            _ => composer
                .message(
                    "s.compare(s.size() - n, n, x) == 0 checks a suffix with manual index arithmetic; use s.ends_with(x) (C++20) for clarity",
                    &[],
                )
                .note("ends_with performs no allocation and cannot underflow when the suffix is longer than the string"),
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferContains
// ============================================================================

pub struct PreferContains;

static PREFER_CONTAINS: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-contains",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "existence tests via count()/find() should use contains()",
);

const QUERY_COUNT: &str = "count-compared-with-zero";
const QUERY_FIND_END: &str = "find-compared-with-end";
const QUERY_FIND_NPOS: &str = "find-compared-with-npos";

static COUNT_NONZERO: SentinelComparison = SentinelComparison::new(
    Sentinel::Zero,
    &[Relation::NotEqual, Relation::Greater],
);
static FIND_VS_END: SentinelComparison = SentinelComparison::new(
    Sentinel::EndIterator,
    &[Relation::Equal, Relation::NotEqual],
);
static FIND_VS_NPOS: SentinelComparison =
    SentinelComparison::new(Sentinel::NotFound, &[Relation::NotEqual]);

impl Check for PreferContains {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_CONTAINS
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_COUNT,
                member_call(&["count"])
                    .and(Matcher::ClassDeclares("contains"))
                    .bind("call"),
            ),
            Query::new(
                QUERY_FIND_END,
                member_call(&["find"])
                    .and(Matcher::ClassDeclares("contains"))
                    .bind("call"),
            ),
            Query::new(
                QUERY_FIND_NPOS,
                member_call(&["find"])
                    .and(Matcher::ClassDeclares("starts_with"))
                    .bind("call"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let comparison = match query {
            QUERY_COUNT => &COUNT_NONZERO,
            QUERY_FIND_END => &FIND_VS_END,
            _ => &FIND_VS_NPOS,
        };
        if !is_followed_by_sentinel_comparison(ctx.tu(), call, comparison) {
            return;
        }

        let composer = ctx.compose(self.descriptor(), call);
        let finding = match query {
            QUERY_COUNT => composer
                .message(
                    "count() > 0 for existence check is suboptimal; use .contains() (C++20) which returns bool directly",
                    &[],
                )
                .note("on multimap/multiset, count() traverses ALL matching elements; contains() stops after the first match"),
            QUERY_FIND_END => composer
                .message(
                    "find(k) != end() for existence check is verbose; use .contains(k) (C++20) for clearer intent",
                    &[],
                )
                .note("contains() returns bool directly, avoiding the unused iterator and potential dangling-iterator bugs"),
            _ => composer
                .message(
                    "string.find(x) != npos for substring existence check; use string.contains(x) (C++23) for clarity",
                    &[],
                )
                .upgrade(
                    "std::string::contains",
                    CapabilityTier::Tier23,
                    "std::string::contains (C++23) returns bool directly and states the intent of the lookup",
                ),
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferEraseIf
// ============================================================================

pub struct PreferEraseIf;

static PREFER_ERASE_IF: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-erase-if",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Tier20,
    "the erase-remove idiom should use std::erase/std::erase_if",
);

impl Check for PreferEraseIf {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_ERASE_IF
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "erase-remove",
            member_call(&["erase"])
                .and(Matcher::ArgumentCount(2))
                .and(descendant(
                    call_to(&["::std::remove", "::std::remove_if"]).bind("remove"),
                ))
                .bind("call"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let (Some(call), Some(remove)) = (binding.get("call"), binding.get("remove")) else {
            return;
        };
        let is_predicate = callee(ctx.tu(), remove).map(last_segment) == Some("remove_if");
        let message = if is_predicate {
            "erase-remove_if idiom is verbose and error-prone; use std::erase_if(container, predicate) (C++20)"
        } else {
            "erase-remove idiom is verbose and error-prone; use std::erase(container, value) (C++20)"
        };
        let finding = ctx
            .compose(self.descriptor(), call)
            .message(message, &[])
            .note("std::erase_if works uniformly on all standard containers (vector, deque, string, list, set, map, etc.) and returns the count of erased elements")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferFlatContainers
// ============================================================================

pub struct PreferFlatContainers;

static PREFER_FLAT_CONTAINERS: CheckDescriptor = CheckDescriptor::new(
    "standard-upgrade.prefer-flat-containers",
    CheckCategory::StandardUpgrade,
    CapabilityTier::Baseline,
    "tree-based associative containers allocate per node",
);

const TREE_CONTAINERS: NamePattern = NamePattern::Any(&[
    "::std::map",
    "::std::set",
    "::std::multimap",
    "::std::multiset",
]);

impl Check for PreferFlatContainers {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_FLAT_CONTAINERS
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "tree-container-decl",
            any_of([kind(NodeTag::VarDecl), kind(NodeTag::FieldDecl)])
                .and(typed(TypePredicate::Named(TREE_CONTAINERS)))
                .bind("decl"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(decl) = binding.get("decl") else {
            return;
        };
        let container = type_name(ctx.tu(), decl);
        let flat = format!("std::flat_{}", last_segment(&container));
        let advice = render(
            "use {0} (C++23): contiguous storage with cache-friendly lookup and iteration",
            &[&flat],
        );

        let finding = ctx
            .compose(self.descriptor(), decl)
            .message(
                "{0} is a tree-based container with per-node heap allocation and poor cache locality; consider a flat/contiguous alternative",
                &[&container],
            )
            .note("a sorted std::vector with std::lower_bound, or boost::container::flat_map/flat_set, gives the same layout on any standard")
            .upgrade(&flat, CapabilityTier::Tier23, advice)
            .note("if O(1) average lookup is needed, consider std::unordered_map/unordered_set or absl::flat_hash_map")
            .finish();
        ctx.report(finding);
    }
}
