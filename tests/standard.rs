mod support;

use std::collections::BTreeSet;

use cxx_clippy::ast::{Opcode, TranslationUnit, TypeRef};
use cxx_clippy::catalog::catalog;
use cxx_clippy::diagnostics::Finding;
use cxx_clippy::standard::{CapabilityTier, LanguageFlags};
use support::ast_harness::*;

const TIERS: [CapabilityTier; 5] = [
    CapabilityTier::Unknown,
    CapabilityTier::Baseline,
    CapabilityTier::Tier20,
    CapabilityTier::Tier23,
    CapabilityTier::Tier26,
];

fn std_function_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("std::function<void()> g;");
    unit(
        tier,
        src,
        vec![],
        vec![global("g", TypeRef::named("std::function")).at(src.at("g;"))],
    )
}

fn list_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("std::list<int> items;");
    unit(
        tier,
        src,
        vec![],
        vec![global("items", TypeRef::named("std::list")).at(src.at("items"))],
    )
}

fn to_string_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("std::to_string(1);");
    unit(
        tier,
        src,
        vec![],
        vec![call("std::to_string").at(src.at("std::to_string(1)"))],
    )
}

fn stringstream_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("std::stringstream ss;");
    unit(
        tier,
        src,
        vec![],
        vec![local("ss", TypeRef::named("std::stringstream")).at(src.at("ss"))],
    )
}

fn npos_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("s.find(x) != std::string::npos;");
    unit(
        tier,
        src,
        string_records(),
        vec![binary(
            Opcode::Ne,
            member_call("find", "std::basic_string", decl_ref("s"))
                .child(decl_ref("x"))
                .at(src.at("s.find(x)")),
            decl_ref("std::string::npos"),
        )],
    )
}

fn map_unit(tier: CapabilityTier) -> TranslationUnit {
    let src = Source("std::map<int, int> m;");
    unit(
        tier,
        src,
        vec![],
        vec![global("m", TypeRef::named("std::map")).at(src.at("m;"))],
    )
}

fn alternatives(finding: &Finding) -> BTreeSet<&str> {
    finding
        .notes
        .iter()
        .filter_map(|n| n.alternative.as_deref())
        .collect()
}

/// Raising the tier keeps the same findings and never loses a note or an
/// alternative.
fn assert_ladder(check: &str, make: fn(CapabilityTier) -> TranslationUnit) {
    let min_tier = catalog()
        .find_by_name(check)
        .map(|d| d.min_tier)
        .unwrap_or_else(|| panic!("{check} not in catalog"));

    let mut previous: Option<(CapabilityTier, Vec<Finding>)> = None;
    for tier in TIERS.into_iter().filter(|t| t.at_least(min_tier)) {
        let findings = run_check(check, &make(tier));
        assert!(!findings.is_empty(), "{check} silent at {tier}");

        if let Some((prev_tier, prev)) = &previous {
            assert_eq!(prev.len(), findings.len(), "{check}: {prev_tier} -> {tier}");
            for (before, after) in prev.iter().zip(&findings) {
                assert_eq!(before.message, after.message, "{check}: {prev_tier} -> {tier}");
                assert!(
                    after.notes.len() >= before.notes.len(),
                    "{check}: notes shrank from {prev_tier} to {tier}"
                );
                assert!(
                    alternatives(after).is_superset(&alternatives(before)),
                    "{check}: alternatives dropped from {prev_tier} to {tier}"
                );
            }
        }
        previous = Some((tier, findings));
    }
}

#[test]
fn ladders_are_monotonic() {
    assert_ladder("avoid-std-function", std_function_unit);
    assert_ladder("prefer-vector", list_unit);
    assert_ladder("prefer-from-chars", to_string_unit);
    assert_ladder("prefer-format", stringstream_unit);
    assert_ladder("prefer-contains", npos_unit);
    assert_ladder("prefer-flat-containers", map_unit);
}

#[test]
fn replacement_note_becomes_advice_once_available() {
    let c17 = run_check("avoid-std-function", &std_function_unit(CapabilityTier::Baseline));
    let c23 = run_check("avoid-std-function", &std_function_unit(CapabilityTier::Tier23));

    let note_for = |f: &Finding, alt: &str| {
        f.notes
            .iter()
            .find(|n| n.alternative.as_deref() == Some(alt))
            .map(|n| n.message.clone())
            .unwrap_or_default()
    };
    assert!(note_for(&c17[0], "std::move_only_function").contains("requires C++23"));
    assert!(!note_for(&c23[0], "std::move_only_function").contains("requires"));
    assert!(note_for(&c23[0], "std::function_ref").contains("requires C++26; current standard is C++23"));
}

#[test]
fn c_units_get_no_findings() {
    let tu = std_function_unit(CapabilityTier::Tier26).with_language(LanguageFlags::c_only());
    assert!(run_all(&tu).is_empty());
}

#[test]
fn std_flags_parse_into_tiers() {
    let cases = [
        ("-std=c++17", CapabilityTier::Baseline),
        ("-std=gnu++20", CapabilityTier::Tier20),
        ("c++2b", CapabilityTier::Tier23),
        ("c++26", CapabilityTier::Tier26),
        ("c++14", CapabilityTier::Unknown),
    ];
    for (raw, expected) in cases {
        let flags: LanguageFlags = raw.parse().unwrap_or_else(|e| panic!("{raw}: {e}"));
        assert_eq!(CapabilityTier::detect(&flags), expected, "{raw}");
    }
}
