use crate::ast::{NodeId, TranslationUnit};
use crate::compose::Composer;
use crate::diagnostics::{DiagnosticSink, Finding};
use crate::level::LintLevel;
use crate::query::{MatchBinding, Query};
use crate::standard::{CapabilityTier, LanguageFlags};
use crate::suppression::Suppressions;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Fix Safety Classification
// ============================================================================

/// Safety classification for fix-it hints.
///
/// - `Safe` hints are lexical replacements that preserve behavior
/// - `Unsafe` hints describe a rewrite that needs human review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixSafety {
    #[default]
    Safe,
    Unsafe,
}

impl FixSafety {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixSafety::Safe => "safe",
            FixSafety::Unsafe => "unsafe",
        }
    }
}

/// Descriptor for the fix-it hint a check may attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescriptor {
    /// Whether the check ever attaches a fix-it.
    pub available: bool,
    pub safety: FixSafety,
    /// Human-readable description of the replacement.
    pub description: &'static str,
}

impl FixDescriptor {
    pub const fn safe(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Safe,
            description,
        }
    }

    pub const fn none() -> Self {
        Self {
            available: false,
            safety: FixSafety::Safe,
            description: "",
        }
    }
}

// ============================================================================
// Check Categories
// ============================================================================

/// Identifier namespace of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckCategory {
    /// Costs that exist regardless of the language standard in use.
    BaselinePerformance,
    /// Rewrites that a newer standard makes available.
    StandardUpgrade,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 2] = [
        CheckCategory::BaselinePerformance,
        CheckCategory::StandardUpgrade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::BaselinePerformance => "baseline-performance",
            CheckCategory::StandardUpgrade => "standard-upgrade",
        }
    }

    /// Prefix of the names this category's checks were first published
    /// under.
    pub fn legacy_prefix(&self) -> &'static str {
        match self {
            CheckCategory::BaselinePerformance => "hl-perf-",
            CheckCategory::StandardUpgrade => "hl-modernize-",
        }
    }
}

/// Static metadata describing a check.
#[derive(Debug)]
pub struct CheckDescriptor {
    /// Stable `category.check-name` identifier.
    pub id: &'static str,
    pub category: CheckCategory,
    pub description: &'static str,
    /// Lowest tier at which the check runs at all.
    pub min_tier: CapabilityTier,
    pub fix: FixDescriptor,
}

impl CheckDescriptor {
    pub const fn new(
        id: &'static str,
        category: CheckCategory,
        min_tier: CapabilityTier,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            category,
            description,
            min_tier,
            fix: FixDescriptor::none(),
        }
    }

    pub const fn with_fix(
        id: &'static str,
        category: CheckCategory,
        min_tier: CapabilityTier,
        description: &'static str,
        fix_description: &'static str,
    ) -> Self {
        Self {
            id,
            category,
            description,
            min_tier,
            fix: FixDescriptor::safe(fix_description),
        }
    }

    /// The id without its category prefix.
    pub fn name(&self) -> &'static str {
        match self.id.split_once('.') {
            Some((_, name)) => name,
            None => self.id,
        }
    }

    pub fn legacy_name(&self) -> String {
        format!("{}{}", self.category.legacy_prefix(), self.name())
    }

    pub fn is_eligible(&self, language: &LanguageFlags, tier: CapabilityTier) -> bool {
        language.is_cplusplus() && tier.at_least(self.min_tier)
    }
}

/// A single check: the queries it wants evaluated and the verdict it reaches
/// on each match.
pub trait Check: Send + Sync {
    fn descriptor(&self) -> &'static CheckDescriptor;
    fn queries(&self) -> Vec<Query>;
    fn on_match(&self, query: &str, binding: &MatchBinding, ctx: &mut CheckContext<'_>);
}

// ============================================================================
// Options and Settings
// ============================================================================

/// Typed per-check options, read from `[options]` in `cxx-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckOptions {
    pub prefer_inplace_vector: InplaceVectorOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InplaceVectorOptions {
    /// Largest literal capacity still worth a fixed in-place buffer.
    pub max_inplace_size: u64,
}

impl Default for InplaceVectorOptions {
    fn default() -> Self {
        Self {
            max_inplace_size: 64,
        }
    }
}

/// Per-check levels derived from `cxx-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSettings {
    levels: HashMap<String, LintLevel>,
}

impl CheckSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        for (name, level) in levels {
            let canonical = resolve_check_alias(&name);
            self.levels.insert(canonical.to_string(), level);
        }
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            let canonical = resolve_check_alias(&name);
            self.levels.insert(canonical.to_string(), LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, check_id: &str) -> LintLevel {
        if let Some(&level) = self.levels.get(check_id) {
            return level;
        }
        let canonical = resolve_check_alias(check_id);
        self.levels.get(canonical).copied().unwrap_or_default()
    }
}

// ============================================================================
// Check Context
// ============================================================================

/// Per-run state handed to [`Check::on_match`].
pub struct CheckContext<'run> {
    tu: &'run TranslationUnit,
    tier: CapabilityTier,
    settings: &'run CheckSettings,
    suppressions: &'run Suppressions,
    sink: &'run mut dyn DiagnosticSink,
    emitted: usize,
    suppressed: usize,
}

impl<'run> CheckContext<'run> {
    pub fn new(
        tu: &'run TranslationUnit,
        tier: CapabilityTier,
        settings: &'run CheckSettings,
        suppressions: &'run Suppressions,
        sink: &'run mut dyn DiagnosticSink,
    ) -> Self {
        Self {
            tu,
            tier,
            settings,
            suppressions,
            sink,
            emitted: 0,
            suppressed: 0,
        }
    }

    pub fn tu(&self) -> &'run TranslationUnit {
        self.tu
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Start a finding for `descriptor` anchored at `anchor`.
    pub fn compose(&self, descriptor: &'static CheckDescriptor, anchor: NodeId) -> Composer<'run> {
        Composer::new(self.tu, self.tier, descriptor, anchor)
    }

    /// Emit a composed finding unless its level is `allow` or a `NOLINT`
    /// comment covers its first line.
    pub fn report(&mut self, finding: Option<Finding>) {
        let Some(mut finding) = finding else {
            return;
        };
        let level = self.settings.level_for(finding.check.id);
        if level == LintLevel::Allow {
            return;
        }
        if self
            .suppressions
            .is_suppressed(finding.span.start.row, finding.check)
        {
            self.suppressed += 1;
            return;
        }

        finding.level = level;
        self.sink.emit(finding);
        self.emitted += 1;
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }
}

// ============================================================================
// Check Name Aliases (Backward Compatibility)
// ============================================================================

/// Names checks were published under before the `category.name` scheme.
///
/// Format: (old_name, canonical_id)
pub const CHECK_ALIASES: &[(&str, &str)] = &[
    ("hl-perf-avoid-std-function", "baseline-performance.avoid-std-function"),
    ("hl-perf-avoid-std-regex", "baseline-performance.avoid-std-regex"),
    ("hl-perf-avoid-std-endl", "baseline-performance.avoid-std-endl"),
    ("hl-perf-prefer-vector", "baseline-performance.prefer-vector"),
    ("hl-perf-prefer-string-view", "baseline-performance.prefer-string-view"),
    ("hl-perf-prefer-from-chars", "baseline-performance.prefer-from-chars"),
    ("hl-perf-avoid-std-any", "baseline-performance.avoid-std-any"),
    ("hl-perf-prefer-unique-ptr", "baseline-performance.prefer-unique-ptr"),
    ("hl-perf-prefer-reserve", "baseline-performance.prefer-reserve"),
    ("hl-perf-avoid-dynamic-cast", "baseline-performance.avoid-dynamic-cast"),
    ("hl-perf-avoid-std-bind", "baseline-performance.avoid-std-bind"),
    ("hl-perf-prefer-emplace", "baseline-performance.prefer-emplace"),
    ("hl-perf-prefer-noexcept-move", "baseline-performance.prefer-noexcept-move"),
    ("hl-perf-avoid-cout-cerr", "baseline-performance.avoid-cout-cerr"),
    ("hl-perf-avoid-virtual-in-loop", "baseline-performance.avoid-virtual-in-loop"),
    ("hl-modernize-prefer-jthread", "standard-upgrade.prefer-jthread"),
    ("hl-modernize-prefer-format", "standard-upgrade.prefer-format"),
    ("hl-modernize-prefer-span", "standard-upgrade.prefer-span"),
    ("hl-modernize-prefer-starts-ends-with", "standard-upgrade.prefer-starts-ends-with"),
    ("hl-modernize-prefer-contains", "standard-upgrade.prefer-contains"),
    ("hl-modernize-prefer-erase-if", "standard-upgrade.prefer-erase-if"),
    ("hl-modernize-prefer-flat-containers", "standard-upgrade.prefer-flat-containers"),
    ("hl-modernize-prefer-expected", "standard-upgrade.prefer-expected"),
    ("hl-modernize-prefer-move-only-function", "standard-upgrade.prefer-move-only-function"),
    ("hl-modernize-prefer-unreachable", "standard-upgrade.prefer-unreachable"),
    ("hl-modernize-prefer-to-underlying", "standard-upgrade.prefer-to-underlying"),
    ("hl-modernize-prefer-print", "standard-upgrade.prefer-print"),
    ("hl-modernize-prefer-function-ref", "standard-upgrade.prefer-function-ref"),
    ("hl-modernize-prefer-inplace-vector", "standard-upgrade.prefer-inplace-vector"),
    ("hl-modernize-prefer-copyable-function", "standard-upgrade.prefer-copyable-function"),
    ("hl-modernize-prefer-hive", "standard-upgrade.prefer-hive"),
];

/// Resolve a check name to its canonical id.
///
/// Accepts canonical ids, legacy names and bare names (`avoid-std-endl`).
/// Anything else is returned unchanged.
pub fn resolve_check_alias(name: &str) -> &str {
    if let Some((_, canonical)) = CHECK_ALIASES.iter().find(|(alias, _)| *alias == name) {
        return canonical;
    }
    if !name.contains('.')
        && let Some(descriptor) = crate::catalog::catalog().find_by_name(name)
    {
        return descriptor.id;
    }
    name
}

/// Check if a name is an alias (not the canonical id).
pub fn is_check_alias(name: &str) -> bool {
    resolve_check_alias(name) != name
}

pub fn all_known_checks() -> HashSet<&'static str> {
    crate::catalog::catalog().descriptors().map(|d| d.id).collect()
}

// ============================================================================
// Registry
// ============================================================================

/// A check together with its compiled queries.
pub struct RegisteredCheck {
    check: Box<dyn Check>,
    queries: Vec<Query>,
}

impl RegisteredCheck {
    pub fn descriptor(&self) -> &'static CheckDescriptor {
        self.check.descriptor()
    }

    pub fn check(&self) -> &dyn Check {
        self.check.as_ref()
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }
}

/// Ordered set of registered checks.
pub struct CheckRegistry {
    checks: Vec<RegisteredCheck>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    #[must_use]
    pub fn with_check(mut self, check: impl Check + 'static) -> Self {
        let queries = check.queries();
        self.checks.push(RegisteredCheck {
            check: Box::new(check),
            queries,
        });
        self
    }

    pub fn checks(&self) -> impl Iterator<Item = &RegisteredCheck> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static CheckDescriptor> + '_ {
        self.checks.iter().map(|c| c.descriptor())
    }

    pub fn find_descriptor(&self, name: &str) -> Option<&'static CheckDescriptor> {
        let canonical = resolve_check_alias(name);
        self.descriptors().find(|d| d.id == canonical)
    }

    #[must_use = "registry should be used to create an engine"]
    pub fn default_checks(options: &CheckOptions) -> Self {
        crate::catalog::build_registry(options)
    }

    /// # Errors
    ///
    /// Returns error if any check name in `only`, `skip`, or `disabled` is unknown.
    pub fn default_checks_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
        options: &CheckOptions,
    ) -> Result<Self> {
        let known = all_known_checks();
        for n in only.iter().chain(skip.iter()).chain(disabled.iter()) {
            if !known.contains(resolve_check_alias(n)) {
                return Err(anyhow!("unknown check: {n}"));
            }
        }

        let only_set: Option<HashSet<&str>> = if only.is_empty() {
            None
        } else {
            Some(only.iter().map(|s| resolve_check_alias(s)).collect())
        };
        let excluded: HashSet<&str> = skip
            .iter()
            .chain(disabled.iter())
            .map(|s| resolve_check_alias(s))
            .collect();

        let mut reg = Self::new();
        for check in Self::default_checks(options).checks {
            let id = check.descriptor().id;
            if let Some(ref only) = only_set
                && !only.contains(id)
            {
                continue;
            }
            if excluded.contains(id) {
                continue;
            }
            reg.checks.push(check);
        }

        Ok(reg)
    }

    /// Checks allowed to run on a unit with these flags at this tier, in
    /// registration order.
    pub fn eligible(&self, language: &LanguageFlags, tier: CapabilityTier) -> Vec<&RegisteredCheck> {
        let eligible: Vec<&RegisteredCheck> = self
            .checks
            .iter()
            .filter(|c| c.descriptor().is_eligible(language, tier))
            .collect();

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            tier = %tier,
            eligible = eligible.len(),
            registered = self.checks.len(),
            "eligibility gate"
        );

        eligible
    }
}
