//! Baseline performance checks.
//!
//! These flag costs that exist under every language standard. Where a newer
//! standard offers a better replacement, the remediation notes say so through
//! an upgrade rung instead of staying silent.

use crate::ast::{NodeId, NodeKind, NodeTag, SpecialMember, TranslationUnit};
use crate::lint::{Check, CheckCategory, CheckContext, CheckDescriptor};
use crate::query::{
    FunctionPredicate, MatchBinding, Matcher, NamePattern, Query, TypePredicate, any_argument,
    any_of, argument, call_matching, call_to, decl_ref, function, kind, member_call, not, object,
    temporary, typed,
};
use crate::standard::CapabilityTier;

use super::util::{callee, decl_label, last_segment, method, type_name};

const STD_FUNCTION: NamePattern = NamePattern::One("::std::function");
const LINKED_LISTS: NamePattern = NamePattern::Any(&["::std::list", "::std::forward_list"]);
const SHARED_PTR: NamePattern = NamePattern::One("::std::shared_ptr");

fn value_decl(tags: &[NodeTag], pattern: NamePattern) -> Matcher {
    any_of(tags.iter().map(|&t| kind(t))).and(typed(TypePredicate::Named(pattern)))
}

// ============================================================================
// AvoidStdFunction
// ============================================================================

pub struct AvoidStdFunction;

static AVOID_STD_FUNCTION: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-std-function",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Baseline,
    "std::function declarations pay for heap allocation and type erasure",
);

impl Check for AvoidStdFunction {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_STD_FUNCTION
    }

    fn queries(&self) -> Vec<Query> {
        let tags = [
            NodeTag::VarDecl,
            NodeTag::ParmVarDecl,
            NodeTag::FieldDecl,
            NodeTag::TypeAliasDecl,
        ];
        vec![Query::new(
            "std-function-decl",
            value_decl(&tags, STD_FUNCTION).bind("decl"),
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
                "std::function causes heap allocation and type-erasure overhead; avoid in high-load / hot-path code ({0})",
                &[&label],
            )
            .note("for non-owning callable references use a template parameter or a function pointer")
            .upgrade(
                "std::move_only_function",
                CapabilityTier::Tier23,
                "if ownership transfer is needed, consider std::move_only_function (C++23); avoids copy overhead",
            )
            .upgrade(
                "std::function_ref",
                CapabilityTier::Tier26,
                "for non-owning callable parameters, consider std::function_ref (C++26), a zero-overhead type-erased reference",
            )
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidStdRegex
// ============================================================================

pub struct AvoidStdRegex;

static AVOID_STD_REGEX: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-std-regex",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "std::regex construction and matching are slow and allocation heavy",
);

const REGEX_TYPES: NamePattern = NamePattern::Any(&["::std::regex", "::std::basic_regex"]);

impl Check for AvoidStdRegex {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_STD_REGEX
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                "regex-construct",
                kind(NodeTag::ConstructExpr)
                    .and(typed(TypePredicate::Class(REGEX_TYPES)))
                    .bind("node"),
            ),
            Query::new(
                "regex-var",
                kind(NodeTag::VarDecl)
                    .and(typed(TypePredicate::Class(REGEX_TYPES)))
                    .bind("node"),
            ),
            Query::new(
                "regex-call",
                call_matching("::std::regex_(search|match|replace)").bind("node"),
            ),
        ]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), node)
            .message(
                "std::regex has extremely poor performance: dynamic pattern compilation, heavy heap allocations, and no compile-time optimizations; banned in Chromium and other high-load projects",
                &[],
            )
            .note("use CTRE (compile-time regular expressions) for static patterns, or Google RE2 for runtime patterns with linear-time guarantees")
            .note("for simple string matching consider std::string::find(), std::string_view::find(), or hand-written parsers")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidStdEndl
// ============================================================================

pub struct AvoidStdEndl;

static AVOID_STD_ENDL: CheckDescriptor = CheckDescriptor::with_fix(
    "baseline-performance.avoid-std-endl",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "std::endl flushes the stream on every use",
    "replace std::endl with '\\n'",
);

impl Check for AvoidStdEndl {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_STD_ENDL
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new("endl", decl_ref(&["::std::endl"]).bind("endl"))]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(endl) = binding.get("endl") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), endl)
            .message(
                "std::endl forces a stream flush on every call; use '\\n' instead: up to 10x faster in I/O-intensive code",
                &[],
            )
            .note("if you need an explicit flush, call stream.flush() separately to make the intent clear")
            .fixit(endl, "'\\n'")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferVector
// ============================================================================

pub struct PreferVector;

static PREFER_VECTOR: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-vector",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "node-based lists have poor cache locality compared to std::vector",
);

impl Check for PreferVector {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_VECTOR
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "list-decl",
            value_decl(&[NodeTag::VarDecl, NodeTag::FieldDecl], LINKED_LISTS).bind("decl"),
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
                "{0} has poor cache locality due to node-based allocation; prefer std::vector for contiguous memory and cache-friendly iteration",
                &[&container],
            )
            .note("std::vector is faster for iteration, push_back, and even random insertion for up to ~10K elements due to CPU cache effects")
            .note_at_least(
                CapabilityTier::Tier23,
                "if you need stable iterators/pointers, consider boost::stable_vector or a pool allocator with std::vector",
            )
            .upgrade(
                "std::hive",
                CapabilityTier::Tier26,
                "std::hive (C++26) provides stable pointers with better cache locality than linked lists",
            )
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferStringView
// ============================================================================

pub struct PreferStringView;

static PREFER_STRING_VIEW: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-string-view",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Baseline,
    "read-only string parameters should be std::string_view",
);

impl Check for PreferStringView {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_STRING_VIEW
    }

    fn queries(&self) -> Vec<Query> {
        let strings = NamePattern::Any(&["::std::basic_string", "::std::string"]);
        vec![Query::new(
            "const-string-ref-param",
            kind(NodeTag::ParmVarDecl)
                .and(typed(TypePredicate::ConstRefTo(strings)))
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
                "'const std::string&' parameter causes potential heap allocation when called with string literals or substrings; prefer std::string_view for read-only access",
                &[],
            )
            .note("std::string_view is a non-owning view that avoids copies; available since C++17")
            .note("note: if the function stores the string, keep std::string parameter (by value with move) for ownership transfer")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferFromChars
// ============================================================================

pub struct PreferFromChars;

static PREFER_FROM_CHARS: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-from-chars",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Baseline,
    "locale-dependent or throwing number conversions should use std::from_chars/std::to_chars",
);

const QUERY_STO: &str = "sto-call";
const QUERY_TO_STRING: &str = "to-string-call";
const QUERY_ATO: &str = "ato-call";

impl Check for PreferFromChars {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_FROM_CHARS
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_STO,
                call_matching("::std::sto(i|l|ll|ul|ull|f|d|ld)").bind("call"),
            ),
            Query::new(QUERY_TO_STRING, call_to(&["::std::to_string"]).bind("call")),
            Query::new(
                QUERY_ATO,
                call_matching("::(std::)?ato(i|l|f|ll)").bind("call"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let composer = ctx.compose(self.descriptor(), call);
        let finding = match query {
            QUERY_STO => composer
                .message(
                    "std::sto* functions throw exceptions on invalid input and use locale-dependent parsing (global locale lock contention); prefer std::from_chars (C++17)",
                    &[],
                )
                .note("std::from_chars is locale-independent, exception-free, and performs no heap allocations; up to 20x faster"),
            QUERY_TO_STRING => composer
                .message(
                    "std::to_string allocates heap memory and depends on the global locale; prefer std::to_chars (C++17) for high-throughput code",
                    &[],
                )
                .note("std::to_chars writes directly into a caller-provided buffer, avoiding allocation entirely")
                .upgrade(
                    "std::format",
                    CapabilityTier::Tier20,
                    "alternatively, std::format (C++20) provides type-safe formatting with better performance than std::to_string",
                ),
            _ => composer
                .message(
                    "C-style ato* functions have undefined behavior on overflow and no error reporting; prefer std::from_chars (C++17)",
                    &[],
                )
                .note("std::from_chars reports errors via std::errc and handles overflow safely"),
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidStdAny
// ============================================================================

pub struct AvoidStdAny;

static AVOID_STD_ANY: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-std-any",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Baseline,
    "std::any allocates and relies on RTTI; std::variant covers closed type sets",
);

impl Check for AvoidStdAny {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_STD_ANY
    }

    fn queries(&self) -> Vec<Query> {
        let tags = [NodeTag::VarDecl, NodeTag::FieldDecl, NodeTag::ParmVarDecl];
        vec![
            Query::new(
                "any-decl",
                value_decl(&tags, NamePattern::One("::std::any")).bind("node"),
            ),
            Query::new("any-cast", call_to(&["::std::any_cast"]).bind("node")),
        ]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), node)
            .message(
                "std::any performs heap allocation for non-trivial types and requires RTTI; prefer std::variant for a closed set of types",
                &[],
            )
            .note("std::variant is stored inline (no heap allocation), type-safe, and allows exhaustive visitation via std::visit")
            .note("if the type set is truly open, consider template-based polymorphism or a custom type-erased wrapper with SBO")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferUniquePtr
// ============================================================================

pub struct PreferUniquePtr;

static PREFER_UNIQUE_PTR: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-unique-ptr",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "shared ownership costs atomic reference counting; prefer std::unique_ptr",
);

const QUERY_MAKE_SHARED: &str = "make-shared";
const QUERY_SHARED_FIELD: &str = "shared-ptr-field";
const QUERY_SHARED_PARAM: &str = "shared-ptr-param";

impl Check for PreferUniquePtr {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_UNIQUE_PTR
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(QUERY_MAKE_SHARED, call_to(&["::std::make_shared"]).bind("node")),
            Query::new(
                QUERY_SHARED_FIELD,
                value_decl(&[NodeTag::FieldDecl], SHARED_PTR).bind("node"),
            ),
            Query::new(
                QUERY_SHARED_PARAM,
                value_decl(&[NodeTag::ParmVarDecl], SHARED_PTR).bind("node"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(node) = binding.get("node") else {
            return;
        };
        let (message, note) = match query {
            QUERY_MAKE_SHARED => (
                "std::make_shared implies shared ownership with atomic reference counting; prefer std::make_unique if ownership is not shared",
                "std::unique_ptr has zero overhead over raw pointers and no atomic operations; use std::shared_ptr only when multiple owners are genuinely needed",
            ),
            QUERY_SHARED_FIELD => (
                "std::shared_ptr class member: atomic reference counting causes cache-line bouncing in multi-threaded code; ensure shared ownership is truly required",
                "if single ownership suffices, use std::unique_ptr; if borrowing, use a raw pointer or std::observer_ptr",
            ),
            _ => (
                "std::shared_ptr passed by value triggers atomic increment/decrement of the reference count",
                "pass by 'const std::shared_ptr&' if you only need to read, or pass the underlying 'T&'/'T*' if ownership is not transferred",
            ),
        };
        let finding = ctx
            .compose(self.descriptor(), node)
            .message(message, &[])
            .note(note)
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferReserve
// ============================================================================

pub struct PreferReserve;

static PREFER_RESERVE: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-reserve",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "growing a std::vector in a loop without reserve() reallocates repeatedly",
);

impl Check for PreferReserve {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_RESERVE
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "push-in-loop",
            member_call(&["push_back", "emplace_back"])
                .and(object(typed(TypePredicate::Class(NamePattern::One("::std::vector")))))
                .and(Matcher::InsideLoop)
                .bind("call"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        if reserved_earlier(ctx.tu(), call) {
            return;
        }
        let finding = ctx
            .compose(self.descriptor(), call)
            .message(
                "push_back/emplace_back inside a loop without reserve() causes repeated heap reallocations; call reserve() before the loop if the size is known or estimable",
                &[],
            )
            .note("each reallocation copies/moves all existing elements and invalidates iterators; pre-allocating avoids O(N log N) total copies")
            .note("if the final size is unknown, consider reserving an estimated upper bound, or use std::vector::resize() + index assignment")
            .finish();
        ctx.report(finding);
    }
}

/// Whether the vector `call` grows was `reserve`d earlier in the same
/// function.
fn reserved_earlier(tu: &TranslationUnit, call: NodeId) -> bool {
    let Some(target) = object_variable(tu, call) else {
        return false;
    };
    let Some(function) = tu
        .ancestors(call)
        .find(|&a| tu.tag(a) == NodeTag::FunctionDecl)
    else {
        return false;
    };
    tu.descendants(function)
        .take_while(|&n| n < call)
        .any(|n| method(tu, n) == Some("reserve") && object_variable(tu, n) == Some(target))
}

fn object_variable(tu: &TranslationUnit, call: NodeId) -> Option<&str> {
    let object = tu.skip_implicit(tu.child(call, 0)?);
    match tu.kind(object) {
        NodeKind::DeclRefExpr { name } => Some(name),
        _ => None,
    }
}

// ============================================================================
// AvoidDynamicCast
// ============================================================================

pub struct AvoidDynamicCast;

static AVOID_DYNAMIC_CAST: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-dynamic-cast",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "dynamic_cast needs RTTI and walks the class hierarchy at runtime",
);

impl Check for AvoidDynamicCast {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_DYNAMIC_CAST
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "dynamic-cast",
            kind(NodeTag::DynamicCastExpr).bind("cast"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(cast) = binding.get("cast") else {
            return;
        };
        let finding = ctx
            .compose(self.descriptor(), cast)
            .message(
                "dynamic_cast requires RTTI and performs O(depth) vtable traversal at runtime; avoid in performance-critical code",
                &[],
            )
            .note("use static_cast with a type-tag enum field for a zero-overhead alternative, or use the visitor pattern / std::variant for closed type hierarchies")
            .note("Chromium, LLVM, and most game engines build with -fno-rtti; consider CRTP for compile-time polymorphism")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidStdBind
// ============================================================================

pub struct AvoidStdBind;

static AVOID_STD_BIND: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-std-bind",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "std::bind and friends block inlining; lambdas do not",
);

impl Check for AvoidStdBind {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_STD_BIND
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "bind-call",
            call_to(&["::std::bind", "::std::bind_front", "::std::bind_back"]).bind("call"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let binder = callee(ctx.tu(), call).map(last_segment).unwrap_or("bind");
        let composer = ctx.compose(self.descriptor(), call);
        let finding = match binder {
            "bind_front" => composer
                .message(
                    "std::bind_front (C++20) is better than std::bind but lambdas are still preferred for inlining and clarity",
                    &[],
                )
                .note("replace with a lambda: [captured_args](auto&&... rest){ return fn(captured_args, std::forward<decltype(rest)>(rest)...); }"),
            "bind_back" => composer.message(
                "std::bind_back (C++23) is better than std::bind but lambdas are still preferred for inlining and clarity",
                &[],
            ),
            _ => composer
                .message(
                    "std::bind creates a type-erased wrapper that prevents inlining; use a lambda instead (banned in Chromium)",
                    &[],
                )
                .note("lambdas are zero-overhead, inlineable, and produce clearer error messages; prefer [captures](params){ body }")
                .note("std::bind also interacts poorly with overloaded functions and default arguments; lambdas handle both correctly"),
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferEmplace
// ============================================================================

pub struct PreferEmplace;

static PREFER_EMPLACE: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-emplace",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "inserting an explicitly constructed temporary; construct in place instead",
);

const QUERY_PUSH_BACK: &str = "push-back-temporary";

impl Check for PreferEmplace {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_EMPLACE
    }

    fn queries(&self) -> Vec<Query> {
        vec![
            Query::new(
                QUERY_PUSH_BACK,
                member_call(&["push_back"])
                    .and(argument(0, temporary()))
                    .bind("call"),
            ),
            Query::new(
                "insert-temporary",
                member_call(&["insert"])
                    .and(any_argument(temporary()))
                    .bind("call"),
            ),
        ]
    }

    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let (message, note) = if query == QUERY_PUSH_BACK {
            (
                "push_back with an explicit constructor creates an unnecessary temporary; use emplace_back for in-place construction",
                "emplace_back forwards arguments directly to the constructor, avoiding the temporary's construction + move + destruction",
            )
        } else {
            (
                "insert with an explicit constructor creates an unnecessary temporary; use emplace for in-place construction",
                "emplace forwards arguments directly to the constructor, avoiding the temporary object overhead",
            )
        };
        let finding = ctx
            .compose(self.descriptor(), call)
            .message(message, &[])
            .note(note)
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// PreferNoexceptMove
// ============================================================================

pub struct PreferNoexceptMove;

static PREFER_NOEXCEPT_MOVE: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.prefer-noexcept-move",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "user-written move operations should be noexcept",
);

impl Check for PreferNoexceptMove {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &PREFER_NOEXCEPT_MOVE
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "throwing-move",
            kind(NodeTag::FunctionDecl)
                .and(any_of([
                    function(FunctionPredicate::Special(SpecialMember::MoveConstructor)),
                    function(FunctionPredicate::Special(SpecialMember::MoveAssignment)),
                ]))
                .and(function(FunctionPredicate::Definition))
                .and(not(function(FunctionPredicate::Defaulted)))
                .and(not(function(FunctionPredicate::Deleted)))
                .and(not(function(FunctionPredicate::Noexcept)))
                .bind("function"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(function) = binding.get("function") else {
            return;
        };
        let is_constructor = matches!(
            ctx.tu().kind(function),
            NodeKind::FunctionDecl {
                special: SpecialMember::MoveConstructor,
                ..
            }
        );
        let composer = ctx.compose(self.descriptor(), function);
        let finding = if is_constructor {
            composer
                .message(
                    "move constructor is not noexcept; std::vector will COPY instead of MOVE elements during reallocation",
                    &[],
                )
                .note("add noexcept to enable move-based reallocation in std::vector, std::swap, and standard algorithms")
                .note("a missing noexcept turns O(N) reallocation into O(N * copy_cost), one of the most impactful C++ performance issues")
        } else {
            composer
                .message(
                    "move assignment operator is not noexcept; this disables move optimizations in standard containers and algorithms",
                    &[],
                )
                .note("add noexcept to enable efficient move operations; CppCoreGuidelines C.66 requires noexcept move operations")
        }
        .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidCoutCerr
// ============================================================================

pub struct AvoidCoutCerr;

static AVOID_COUT_CERR: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-cout-cerr",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "global iostreams synchronize through a process-wide lock",
);

impl Check for AvoidCoutCerr {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_COUT_CERR
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "global-stream",
            decl_ref(&["::std::cout", "::std::cerr", "::std::clog"]).bind("stream"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(stream) = binding.get("stream") else {
            return;
        };
        let name = match ctx.tu().kind(stream) {
            NodeKind::DeclRefExpr { name } => name.as_str(),
            _ => "std::cout",
        };
        let finding = ctx
            .compose(self.descriptor(), stream)
            .message(
                "{0} uses a global mutex (sync_with_stdio) causing contention in multi-threaded code; avoid in production services",
                &[&name],
            )
            .note("use a logging framework (spdlog, glog, or custom) that supports async logging, log levels, and structured output")
            .note("for non-logging output, consider fmt::print or std::format (C++20) with explicit file descriptor writes")
            .finish();
        ctx.report(finding);
    }
}

// ============================================================================
// AvoidVirtualInLoop
// ============================================================================

pub struct AvoidVirtualInLoop;

static AVOID_VIRTUAL_IN_LOOP: CheckDescriptor = CheckDescriptor::new(
    "baseline-performance.avoid-virtual-in-loop",
    CheckCategory::BaselinePerformance,
    CapabilityTier::Unknown,
    "virtual dispatch through a pointer or reference inside a loop",
);

impl Check for AvoidVirtualInLoop {
    fn descriptor(&self) -> &'static CheckDescriptor {
        &AVOID_VIRTUAL_IN_LOOP
    }

    fn queries(&self) -> Vec<Query> {
        vec![Query::new(
            "virtual-call-in-loop",
            kind(NodeTag::MemberCallExpr)
                .and(Matcher::VirtualCall)
                .and(object(typed(TypePredicate::Indirect)))
                .and(Matcher::InsideLoop)
                .bind("call"),
        )]
    }

    fn on_match(&self, _query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>) {
        let Some(call) = binding.get("call") else {
            return;
        };
        let name = method(ctx.tu(), call).unwrap_or_default();
        let finding = ctx
            .compose(self.descriptor(), call)
            .message(
                "virtual call to '{0}' inside a loop: indirect dispatch prevents inlining and causes branch predictor misses",
                &[&name],
            )
            .note("consider CRTP, std::variant + std::visit, or 'if constexpr' with type tags for compile-time dispatch")
            .note("if dynamic dispatch is required, cache the function pointer before the loop or batch-process by concrete type")
            .finish();
        ctx.report(finding);
    }
}
