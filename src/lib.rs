//! Core cxx-clippy engine and check registry.
//!
//! The crate analyzes one already-resolved C++ translation unit at a time
//! (an [`ast::AstDocument`] produced by an external dumper) and reports
//! performance and modernization findings whose remediation text is tailored
//! to the unit's language standard.

pub mod ast;
pub mod catalog;
pub mod checks;
pub mod cli;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod level;
pub mod lint;
pub mod query;
pub mod resolver;
pub mod standard;
pub mod suppression;
pub mod telemetry;
pub mod visitor;

use std::path::Path;

use crate::ast::{AstDocument, TranslationUnit};
use crate::diagnostics::{DiagnosticSink, Finding};
use crate::error::ClippyResult;
use crate::lint::{CheckContext, CheckOptions, CheckRegistry, CheckSettings};
use crate::standard::{CapabilityTier, LanguageFlags};
use crate::suppression::Suppressions;
use crate::visitor::walk_translation_unit;

/// Counters from one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub tier: CapabilityTier,
    pub eligible: usize,
    pub matches: usize,
    pub emitted: usize,
    pub suppressed: usize,
}

/// Engine orchestrates analysis by gating and running registered checks over
/// a translation unit.
pub struct CheckEngine {
    registry: CheckRegistry,
    settings: CheckSettings,
    fallback_language: LanguageFlags,
}

impl CheckEngine {
    /// Create a new engine with default check settings.
    pub fn new(registry: CheckRegistry) -> Self {
        Self::new_with_settings(registry, CheckSettings::default())
    }

    /// Create a new engine with explicit check settings (e.g. from config).
    pub fn new_with_settings(registry: CheckRegistry, settings: CheckSettings) -> Self {
        Self {
            registry,
            settings,
            fallback_language: LanguageFlags::for_tier(CapabilityTier::Unknown),
        }
    }

    /// Language flags assumed for documents that record none.
    #[must_use]
    pub fn with_fallback_language(mut self, language: LanguageFlags) -> Self {
        self.fallback_language = language;
        self
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &CheckSettings {
        &self.settings
    }

    /// Analyze one unit and collect its findings in traversal order.
    pub fn analyze(&self, tu: &TranslationUnit) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.analyze_into(tu, &mut findings);
        findings
    }

    /// Analyze one unit, emitting findings into `sink`.
    pub fn analyze_into(&self, tu: &TranslationUnit, sink: &mut dyn DiagnosticSink) -> RunSummary {
        crate::instrument_block!("analyze", {
            let tier = CapabilityTier::detect(tu.language());
            let eligible = self.registry.eligible(tu.language(), tier);
            let suppressions = Suppressions::parse(tu.source());

            let mut ctx = CheckContext::new(tu, tier, &self.settings, &suppressions, sink);
            let matches = walk_translation_unit(tu, &eligible, &mut ctx);

            let summary = RunSummary {
                tier,
                eligible: eligible.len(),
                matches,
                emitted: ctx.emitted(),
                suppressed: ctx.suppressed(),
            };

            #[cfg(feature = "telemetry")]
            tracing::debug!(
                file = tu.file(),
                tier = %summary.tier,
                eligible = summary.eligible,
                matches = summary.matches,
                emitted = summary.emitted,
                suppressed = summary.suppressed,
                "analysis finished"
            );

            summary
        })
    }

    /// Build the unit for `doc`, applying the fallback language when the
    /// document records none.
    pub fn translation_unit(&self, doc: AstDocument) -> TranslationUnit {
        TranslationUnit::from_document(doc, self.fallback_language)
    }

    pub fn analyze_document(&self, doc: AstDocument) -> Vec<Finding> {
        let tu = self.translation_unit(doc);
        self.analyze(&tu)
    }

    /// Load an AST document from disk and analyze it.
    pub fn analyze_path(&self, path: &Path) -> ClippyResult<Vec<Finding>> {
        let doc = AstDocument::load(path)?;
        Ok(self.analyze_document(doc))
    }
}

/// Construct a `CheckEngine` with every built-in check and default options.
pub fn create_default_engine() -> CheckEngine {
    CheckEngine::new(CheckRegistry::default_checks(&CheckOptions::default()))
}
