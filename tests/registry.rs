use std::collections::HashSet;

use cxx_clippy::catalog::catalog;
use cxx_clippy::lint::{
    CheckCategory, CheckOptions, CheckRegistry, is_check_alias, resolve_check_alias,
};
use cxx_clippy::standard::{CapabilityTier, LanguageFlags};

const TIERS: [CapabilityTier; 5] = [
    CapabilityTier::Unknown,
    CapabilityTier::Baseline,
    CapabilityTier::Tier20,
    CapabilityTier::Tier23,
    CapabilityTier::Tier26,
];

#[test]
fn default_registry_matches_catalog() {
    let registry = CheckRegistry::default_checks(&CheckOptions::default());
    let registered: Vec<_> = registry.descriptors().map(|d| d.id).collect();
    let cataloged: Vec<_> = catalog().descriptors().map(|d| d.id).collect();
    assert_eq!(registered, cataloged);
    assert_eq!(registered.len(), 31);
}

#[test]
fn eligibility_follows_min_tier() {
    let registry = CheckRegistry::default_checks(&CheckOptions::default());
    for tier in TIERS {
        let flags = LanguageFlags::for_tier(tier);
        let eligible: HashSet<_> = registry
            .eligible(&flags, tier)
            .into_iter()
            .map(|c| c.descriptor().id)
            .collect();
        for descriptor in registry.descriptors() {
            assert_eq!(
                eligible.contains(descriptor.id),
                tier >= descriptor.min_tier,
                "{} at {tier}",
                descriptor.id
            );
        }
    }
}

#[test]
fn eligible_counts_per_tier() {
    let registry = CheckRegistry::default_checks(&CheckOptions::default());
    let count = |tier| registry.eligible(&LanguageFlags::for_tier(tier), tier).len();

    let at_unknown = count(CapabilityTier::Unknown);
    assert!(at_unknown > 0);
    assert!(at_unknown < count(CapabilityTier::Baseline));
    assert_eq!(count(CapabilityTier::Tier26), 31);
}

#[test]
fn nothing_is_eligible_for_c() {
    let registry = CheckRegistry::default_checks(&CheckOptions::default());
    for tier in TIERS {
        assert!(registry.eligible(&LanguageFlags::c_only(), tier).is_empty());
    }
}

#[test]
fn unknown_names_are_rejected() {
    let err = CheckRegistry::default_checks_filtered(
        &["prefer-teleport".to_string()],
        &[],
        &[],
        &CheckOptions::default(),
    )
    .err()
    .map(|e| e.to_string());
    assert_eq!(err.as_deref(), Some("unknown check: prefer-teleport"));

    assert!(
        CheckRegistry::default_checks_filtered(
            &[],
            &[],
            &["standard-upgrade.nope".to_string()],
            &CheckOptions::default()
        )
        .is_err()
    );
}

#[test]
fn aliases_resolve_to_canonical_ids() {
    assert_eq!(
        resolve_check_alias("hl-perf-avoid-std-endl"),
        "baseline-performance.avoid-std-endl"
    );
    assert_eq!(
        resolve_check_alias("prefer-to-underlying"),
        "standard-upgrade.prefer-to-underlying"
    );
    assert_eq!(
        resolve_check_alias("standard-upgrade.prefer-hive"),
        "standard-upgrade.prefer-hive"
    );
    assert!(is_check_alias("hl-modernize-prefer-print"));
    assert!(!is_check_alias("baseline-performance.avoid-std-any"));

    for descriptor in catalog().descriptors() {
        assert_eq!(resolve_check_alias(&descriptor.legacy_name()), descriptor.id);
        assert_eq!(resolve_check_alias(descriptor.name()), descriptor.id);
    }
}

#[test]
fn only_and_skip_filter_the_registry() {
    let only = CheckRegistry::default_checks_filtered(
        &["hl-perf-avoid-std-regex".to_string(), "prefer-span".to_string()],
        &[],
        &[],
        &CheckOptions::default(),
    )
    .expect("known names");
    let ids: Vec<_> = only.descriptors().map(|d| d.id).collect();
    assert_eq!(
        ids,
        [
            "baseline-performance.avoid-std-regex",
            "standard-upgrade.prefer-span"
        ]
    );

    let skipped = CheckRegistry::default_checks_filtered(
        &[],
        &["avoid-std-endl".to_string()],
        &["prefer-hive".to_string()],
        &CheckOptions::default(),
    )
    .expect("known names");
    assert_eq!(skipped.len(), 29);
    assert!(skipped.find_descriptor("avoid-std-endl").is_none());
}

#[test]
fn categories_partition_the_catalog() {
    let registry = CheckRegistry::default_checks(&CheckOptions::default());
    for category in CheckCategory::ALL {
        let prefix = format!("{}.", category.as_str());
        for d in registry.descriptors().filter(|d| d.category == category) {
            assert!(d.id.starts_with(&prefix), "{}", d.id);
        }
    }
}
