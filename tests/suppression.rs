mod support;

use cxx_clippy::ast::{AstNode, Opcode, TranslationUnit};
use cxx_clippy::diagnostics::Finding;
use cxx_clippy::standard::CapabilityTier;
use support::ast_harness::*;

/// `std::cout << x << std::endl;` with both stream names ranged.
fn endl_statement(src: Source, n: usize) -> AstNode {
    operator_call(
        Opcode::Shl,
        operator_call(
            Opcode::Shl,
            decl_ref("std::cout").at(src.nth("std::cout", n)),
            decl_ref("x"),
        ),
        decl_ref("std::endl").at(src.nth("std::endl", n)),
    )
}

fn lines_unit(src: Source, statements: usize) -> TranslationUnit {
    unit(
        CapabilityTier::Baseline,
        src,
        vec![],
        vec![function("f").child(
            compound().with_children((0..statements).map(|n| endl_statement(src, n))),
        )],
    )
}

fn rows(tu: &TranslationUnit) -> Vec<(usize, &'static str)> {
    run_all(tu)
        .iter()
        .map(|f| (f.span.start.row, f.check.id))
        .collect()
}

#[test]
fn without_nolint_both_checks_fire() {
    let src = Source("std::cout << x << std::endl;\n");
    assert_eq!(
        rows(&lines_unit(src, 1)),
        [
            (1, "baseline-performance.avoid-cout-cerr"),
            (1, "baseline-performance.avoid-std-endl"),
        ]
    );
}

#[test]
fn nolint_suppresses_the_same_line() {
    let src = Source(
        "std::cout << x << std::endl; // NOLINT\n\
         std::cout << x << std::endl; // NOLINT(avoid-std-endl)\n",
    );
    assert_eq!(
        rows(&lines_unit(src, 2)),
        [(2, "baseline-performance.avoid-cout-cerr")]
    );
}

#[test]
fn nolintnextline_accepts_legacy_names_and_globs() {
    let src = Source(
        "// NOLINTNEXTLINE(hl-perf-avoid-cout-cerr)\n\
         std::cout << x << std::endl;\n\
         // NOLINTNEXTLINE(baseline-performance.*)\n\
         std::cout << x << std::endl;\n\
         // NOLINTNEXTLINE(standard-upgrade.*)\n\
         std::cout << x << std::endl;\n",
    );
    assert_eq!(
        rows(&lines_unit(src, 3)),
        [
            (2, "baseline-performance.avoid-std-endl"),
            (6, "baseline-performance.avoid-cout-cerr"),
            (6, "baseline-performance.avoid-std-endl"),
        ]
    );
}

#[test]
fn nolint_regions_cover_every_line_inside() {
    let src = Source(
        "// NOLINTBEGIN(avoid-std-endl)\n\
         std::cout << x << std::endl;\n\
         std::cout << x << std::endl;\n\
         // NOLINTEND(avoid-std-endl)\n\
         std::cout << x << std::endl;\n",
    );
    assert_eq!(
        rows(&lines_unit(src, 3)),
        [
            (2, "baseline-performance.avoid-cout-cerr"),
            (3, "baseline-performance.avoid-cout-cerr"),
            (5, "baseline-performance.avoid-cout-cerr"),
            (5, "baseline-performance.avoid-std-endl"),
        ]
    );
}

#[test]
fn suppressed_findings_are_counted() {
    let src = Source("std::cout << x << std::endl; // NOLINT\n");
    let tu = lines_unit(src, 1);
    let mut sink: Vec<Finding> = Vec::new();
    let summary = cxx_clippy::create_default_engine().analyze_into(&tu, &mut sink);
    assert!(sink.is_empty());
    assert_eq!(summary.emitted, 0);
    assert_eq!(summary.suppressed, 2);
}
