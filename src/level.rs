use serde::{Deserialize, Serialize};

/// Reporting level of a check. There is no error level: findings advise and
/// never fail a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Allow,
    Warn,
}

impl LintLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintLevel::Allow => "allow",
            LintLevel::Warn => "warning",
        }
    }
}

impl Default for LintLevel {
    fn default() -> Self {
        Self::Warn
    }
}
