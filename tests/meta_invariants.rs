use cxx_clippy::catalog::catalog;
use cxx_clippy::lint::{CHECK_ALIASES, CheckCategory};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn collect_rs_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_rs_files(&path, out)?;
            continue;
        }
        if file_type.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
    Ok(())
}

fn grep_checks(pattern: &Regex) -> Vec<String> {
    let checks_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("checks");

    let mut rs_files = Vec::new();
    collect_rs_files(&checks_dir, &mut rs_files).expect("should list src/checks/**/*.rs");
    rs_files.push(checks_dir.with_extension("rs"));
    rs_files.sort();

    let mut hits = Vec::new();
    for path in rs_files {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
        for (idx, line) in content.lines().enumerate() {
            if pattern.is_match(line) {
                hits.push(format!("{}:{}: {}", path.display(), idx + 1, line.trim()));
            }
        }
    }
    hits
}

#[test]
fn findings_are_only_built_by_the_composer() {
    let hits = grep_checks(&Regex::new(r"\bFinding\s*\{").expect("regex"));
    assert!(
        hits.is_empty(),
        "checks must build findings through CheckContext::compose:\n{}",
        hits.join("\n")
    );
}

#[test]
fn checks_do_not_bypass_suppression() {
    let hits = grep_checks(&Regex::new(r"\.emit\(|sink\b").expect("regex"));
    assert!(
        hits.is_empty(),
        "suppression bypass: checks must report through ctx.report:\n{}",
        hits.join("\n")
    );
}

#[test]
fn checks_do_not_compare_tiers_for_equality() {
    let hits = grep_checks(&Regex::new(r"tier\(\)\s*[=!]=").expect("regex"));
    assert!(hits.is_empty(), "use at_least for tier tests:\n{}", hits.join("\n"));
}

#[test]
fn check_ids_are_unique_and_category_prefixed() {
    let mut seen = HashSet::new();
    for descriptor in catalog().descriptors() {
        assert!(seen.insert(descriptor.id), "duplicate id {}", descriptor.id);
        let prefix = format!("{}.", descriptor.category.as_str());
        assert!(descriptor.id.starts_with(&prefix), "{}", descriptor.id);
        assert!(
            descriptor
                .name()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '-'),
            "{} is not kebab-case",
            descriptor.id
        );
        assert!(!descriptor.description.is_empty(), "{}", descriptor.id);
    }
}

#[test]
fn every_check_has_its_legacy_alias() {
    let aliases: HashSet<(&str, &str)> = CHECK_ALIASES.iter().copied().collect();
    for descriptor in catalog().descriptors() {
        let legacy = descriptor.legacy_name();
        assert!(
            aliases.contains(&(legacy.as_str(), descriptor.id)),
            "missing alias {legacy} -> {}",
            descriptor.id
        );
    }
    assert_eq!(CHECK_ALIASES.len(), catalog().descriptors().count());
}

#[test]
fn upgrade_checks_never_run_below_baseline_floor() {
    for descriptor in catalog().descriptors() {
        if descriptor.category == CheckCategory::StandardUpgrade {
            assert!(
                descriptor.min_tier >= cxx_clippy::standard::CapabilityTier::Baseline,
                "{}",
                descriptor.id
            );
        }
    }
}
