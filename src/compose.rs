//! Turns a check verdict into a [`Finding`].
//!
//! The composer owns the standard-aware remediation branching: a check states
//! which alternatives exist and from which tier, and the composer phrases each
//! one either as a recommendation or as a future upgrade path, depending on the
//! run's tier. Every ladder rung yields exactly one note at every tier, so
//! raising the tier never drops an alternative.

use std::fmt::Display;

use crate::ast::{NodeId, TranslationUnit};
use crate::diagnostics::{FixIt, Finding, Note, Span};
use crate::level::LintLevel;
use crate::lint::CheckDescriptor;
use crate::standard::CapabilityTier;

pub struct Composer<'run> {
    tu: &'run TranslationUnit,
    tier: CapabilityTier,
    descriptor: &'static CheckDescriptor,
    anchor: NodeId,
    message: String,
    notes: Vec<Note>,
    fixit: Option<FixIt>,
}

impl<'run> Composer<'run> {
    pub fn new(
        tu: &'run TranslationUnit,
        tier: CapabilityTier,
        descriptor: &'static CheckDescriptor,
        anchor: NodeId,
    ) -> Self {
        Self {
            tu,
            tier,
            descriptor,
            anchor,
            message: String::new(),
            notes: Vec::new(),
            fixit: None,
        }
    }

    /// Primary message; `{0}`, `{1}`, ... are replaced by `args`.
    #[must_use]
    pub fn message(mut self, template: &str, args: &[&dyn Display]) -> Self {
        self.message = render(template, args);
        self
    }

    #[must_use]
    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.notes.push(Note::plain(text));
        self
    }

    #[must_use]
    pub fn note_with(mut self, template: &str, args: &[&dyn Display]) -> Self {
        self.notes.push(Note::plain(render(template, args)));
        self
    }

    /// Additive note, silent below `required`.
    #[must_use]
    pub fn note_at_least(self, required: CapabilityTier, text: impl Into<String>) -> Self {
        if self.tier.at_least(required) {
            self.note(text)
        } else {
            self
        }
    }

    /// One rung of a remediation ladder: `advice` when the run's tier offers
    /// `alternative`, otherwise a note naming it as an upgrade path.
    #[must_use]
    pub fn upgrade(
        mut self,
        alternative: &str,
        since: CapabilityTier,
        advice: impl Into<String>,
    ) -> Self {
        let message = if self.tier.at_least(since) {
            advice.into()
        } else {
            replacement_note(alternative, since, self.tier)
        };
        self.notes.push(Note {
            message,
            alternative: Some(alternative.to_string()),
        });
        self
    }

    /// Propose replacing `node`'s source text. Dropped unless the text is
    /// available and non-empty.
    #[must_use]
    pub fn fixit(mut self, node: NodeId, replacement: impl Into<String>) -> Self {
        if let Some(range) = self.tu.main_file_range(node)
            && let Some(original) = self.tu.text(node)
            && !original.trim().is_empty()
        {
            self.fixit = Some(FixIt {
                range,
                original: original.to_string(),
                replacement: replacement.into(),
            });
        }
        self
    }

    /// `None` when the anchor has no location in the main file.
    pub fn finish(self) -> Option<Finding> {
        let range = self.tu.main_file_range(self.anchor)?;
        let span = Span {
            start: self.tu.position(range.begin),
            end: self.tu.position(range.end),
        };

        Some(Finding {
            check: self.descriptor,
            level: LintLevel::Warn,
            file: self.tu.file().to_string(),
            range,
            span,
            message: self.message,
            notes: self.notes,
            fixit: self.fixit,
        })
    }
}

/// Substitute positional `{N}` placeholders. Placeholders without a matching
/// argument are kept verbatim.
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let index = after[..digits].parse::<usize>().ok();

        match index {
            Some(i) if after[digits..].starts_with('}') && i < args.len() => {
                out.push_str(&args[i].to_string());
                rest = &after[digits + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// "X would be a better fit but requires C++NN; current standard is C++MM".
pub fn replacement_note(alternative: &str, since: CapabilityTier, current: CapabilityTier) -> String {
    format!(
        "{alternative} would be a better fit but requires {}; current standard is {}",
        since.label(),
        current.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_positions() {
        let name = "process";
        assert_eq!(
            render("virtual call to '{0}' in {1} loop", &[&name, &2]),
            "virtual call to 'process' in 2 loop"
        );
        assert_eq!(render("keep {5} and {x}", &[&1]), "keep {5} and {x}");
        assert_eq!(render("std::inplace_vector<T, {0}>", &[&10]), "std::inplace_vector<T, 10>");
    }

    #[test]
    fn replacement_note_names_both_standards() {
        assert_eq!(
            replacement_note(
                "std::move_only_function",
                CapabilityTier::Tier23,
                CapabilityTier::Baseline
            ),
            "std::move_only_function would be a better fit but requires C++23; current standard is C++17"
        );
    }
}
