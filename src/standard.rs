//! Language-standard capability detection.
//!
//! A run's [`CapabilityTier`] is derived once from the translation unit's
//! [`LanguageFlags`] and is read-only afterwards. Comparisons always go through
//! the ordering (`at_least`), never equality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClippyError;

/// Language options reported by the front end, one flag per edition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageFlags {
    pub cplusplus: bool,
    pub cplusplus17: bool,
    pub cplusplus20: bool,
    pub cplusplus23: bool,
    pub cplusplus26: bool,
}

impl LanguageFlags {
    /// Flags for a given tier; every lower edition is implied.
    pub fn for_tier(tier: CapabilityTier) -> Self {
        Self {
            cplusplus: true,
            cplusplus17: tier.at_least(CapabilityTier::Baseline),
            cplusplus20: tier.at_least(CapabilityTier::Tier20),
            cplusplus23: tier.at_least(CapabilityTier::Tier23),
            cplusplus26: tier.at_least(CapabilityTier::Tier26),
        }
    }

    /// Plain C: no C++ flag at all.
    pub fn c_only() -> Self {
        Self::default()
    }

    pub fn is_cplusplus(&self) -> bool {
        self.cplusplus
    }
}

impl FromStr for LanguageFlags {
    type Err = ClippyError;

    /// Accepts `-std=` values such as `c++17`, `gnu++20`, `c++2b`, `c++2c`,
    /// with or without the `-std=` prefix. `c` / `c11` style values yield
    /// non-C++ flags.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().trim_start_matches("-std=").to_ascii_lowercase();
        let edition = value
            .strip_prefix("c++")
            .or_else(|| value.strip_prefix("gnu++"));

        let Some(edition) = edition else {
            if value.starts_with('c') || value.starts_with("gnu") {
                return Ok(Self::c_only());
            }
            return Err(ClippyError::InvalidStandard(raw.to_string()));
        };

        let tier = match edition {
            "98" | "03" | "11" | "14" | "0x" | "1y" => CapabilityTier::Unknown,
            "17" | "1z" => CapabilityTier::Baseline,
            "20" | "2a" => CapabilityTier::Tier20,
            "23" | "2b" => CapabilityTier::Tier23,
            "26" | "2c" => CapabilityTier::Tier26,
            _ => return Err(ClippyError::InvalidStandard(raw.to_string())),
        };
        Ok(Self::for_tier(tier))
    }
}

/// Ordered language-standard capability level.
///
/// `Unknown` is the lowest level: C++ older than C++17, or no edition flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    #[default]
    Unknown,
    /// C++17.
    Baseline,
    Tier20,
    Tier23,
    Tier26,
}

impl CapabilityTier {
    pub const ALL: [CapabilityTier; 5] = [
        CapabilityTier::Unknown,
        CapabilityTier::Baseline,
        CapabilityTier::Tier20,
        CapabilityTier::Tier23,
        CapabilityTier::Tier26,
    ];

    /// Highest tier whose flag is set, testing from the top down.
    pub fn detect(flags: &LanguageFlags) -> Self {
        if flags.cplusplus26 {
            CapabilityTier::Tier26
        } else if flags.cplusplus23 {
            CapabilityTier::Tier23
        } else if flags.cplusplus20 {
            CapabilityTier::Tier20
        } else if flags.cplusplus17 {
            CapabilityTier::Baseline
        } else {
            CapabilityTier::Unknown
        }
    }

    pub fn at_least(self, required: CapabilityTier) -> bool {
        self >= required
    }

    pub fn label(self) -> &'static str {
        match self {
            CapabilityTier::Unknown => "unknown",
            CapabilityTier::Baseline => "C++17",
            CapabilityTier::Tier20 => "C++20",
            CapabilityTier::Tier23 => "C++23",
            CapabilityTier::Tier26 => "C++26",
        }
    }

    /// Label used for a check's minimum requirement.
    pub fn requirement_label(self) -> &'static str {
        match self {
            CapabilityTier::Unknown => "any C++",
            other => other.label(),
        }
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
