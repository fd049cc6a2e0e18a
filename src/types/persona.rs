//! The two persona taxonomies.
//!
//! [`EnsemblePersona`] is what the trained classifiers vote on; [`SpenderPersona`]
//! comes from the rule-based ratio cascade. They are never converted into one
//! another.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Ensemble Persona
// ─────────────────────────────────────────────────────────────────

/// Label produced by the classifier ensemble.
///
/// The integer codes are the class labels the artifacts were trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsemblePersona {
    Moderate = 0,
    Stable = 1,
    Stressed = 2,
}

impl EnsemblePersona {
    /// Class code at the model boundary.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Decode a class code; anything outside {0, 1, 2} is rejected.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EnsemblePersona::Moderate),
            1 => Some(EnsemblePersona::Stable),
            2 => Some(EnsemblePersona::Stressed),
            _ => None,
        }
    }

    /// Slug used in CLI args and JSON.
    pub fn slug(&self) -> &'static str {
        match self {
            EnsemblePersona::Moderate => "moderate",
            EnsemblePersona::Stable => "stable",
            EnsemblePersona::Stressed => "stressed",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EnsemblePersona::Moderate => "Financially Moderate",
            EnsemblePersona::Stable => "Financially Stable",
            EnsemblePersona::Stressed => "Financially Stressed",
        }
    }

    /// All labels in code order.
    pub fn all() -> &'static [EnsemblePersona] {
        &[
            EnsemblePersona::Moderate,
            EnsemblePersona::Stable,
            EnsemblePersona::Stressed,
        ]
    }
}

impl fmt::Display for EnsemblePersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for EnsemblePersona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "moderate" | "financially moderate" => Ok(EnsemblePersona::Moderate),
            "1" | "stable" | "financially stable" => Ok(EnsemblePersona::Stable),
            "2" | "stressed" | "financially stressed" => Ok(EnsemblePersona::Stressed),
            _ => Err(format!(
                "Unknown ensemble persona '{}'. Valid: 0/moderate, 1/stable, 2/stressed",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Spender Persona
// ─────────────────────────────────────────────────────────────────

/// Label produced by the rule-based classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpenderPersona {
    DebtRisk,
    Overspender,
    Beginner,
    Balanced,
}

impl SpenderPersona {
    pub fn key(&self) -> &'static str {
        match self {
            SpenderPersona::DebtRisk => "debt_risk",
            SpenderPersona::Overspender => "overspender",
            SpenderPersona::Beginner => "beginner",
            SpenderPersona::Balanced => "balanced",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SpenderPersona::DebtRisk => "Debt-Risk",
            SpenderPersona::Overspender => "Overspender",
            SpenderPersona::Beginner => "Beginner",
            SpenderPersona::Balanced => "Balanced",
        }
    }

    pub fn long_message(&self) -> &'static str {
        match self {
            SpenderPersona::DebtRisk => {
                "Your current expenses and obligations may be placing pressure on your financial capacity. \
                 Prioritising essential spending, limiting non-essential outflow, and avoiding new commitments \
                 will help reduce financial strain. With focused steps, you can move toward a more secure position."
            }
            SpenderPersona::Overspender => {
                "Your discretionary spending is higher than recommended compared to your income and essentials. \
                 With a few adjustments, you can gradually redirect more towards savings and strengthen financial \
                 stability. Small, consistent changes will create a noticeable improvement over time."
            }
            SpenderPersona::Beginner => {
                "You are in the early stage of building financial structure and spending awareness. \
                 With better tracking habits and clearer allocation, you can steadily develop stronger \
                 control over your monthly finances. You\u{2019}re on the right path\u{2014}continued attention \
                 will accelerate progress."
            }
            SpenderPersona::Balanced => {
                "Your spending behaviour shows a healthy distribution between essential needs and discretionary choices. \
                 With a slight increase in savings and mindful monitoring, you can further enhance long-term \
                 financial resilience. Maintain this momentum to keep improving."
            }
        }
    }

    pub fn short_badge(&self) -> &'static str {
        match self {
            SpenderPersona::DebtRisk => {
                "Financial load is high \u{2014} reduce commitments to regain stability."
            }
            SpenderPersona::Overspender => {
                "Higher discretionary spending \u{2014} adjust gradually to improve balance."
            }
            SpenderPersona::Beginner => {
                "Early in financial tracking \u{2014} building good habits will strengthen control."
            }
            SpenderPersona::Balanced => {
                "Healthy spending pattern \u{2014} maintain discipline and grow savings."
            }
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            SpenderPersona::DebtRisk => "Stabilise expenses to protect financial health.",
            SpenderPersona::Overspender => "Shift spending to support savings growth.",
            SpenderPersona::Beginner => "Awareness is forming \u{2014} keep building consistency.",
            SpenderPersona::Balanced => "Strong foundation \u{2014} continue refining habits.",
        }
    }

    /// All labels in rule evaluation order.
    pub fn all() -> &'static [SpenderPersona] {
        &[
            SpenderPersona::DebtRisk,
            SpenderPersona::Overspender,
            SpenderPersona::Beginner,
            SpenderPersona::Balanced,
        ]
    }

    /// Flattened view with every content field, as rendered to clients.
    pub fn profile(&self) -> SpenderProfile {
        SpenderProfile {
            key: *self,
            title: self.title().to_string(),
            long_message: self.long_message().to_string(),
            short_badge: self.short_badge().to_string(),
            tagline: self.tagline().to_string(),
        }
    }
}

impl fmt::Display for SpenderPersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for SpenderPersona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debt_risk" | "debt-risk" | "debtrisk" => Ok(SpenderPersona::DebtRisk),
            "overspender" => Ok(SpenderPersona::Overspender),
            "beginner" => Ok(SpenderPersona::Beginner),
            "balanced" => Ok(SpenderPersona::Balanced),
            _ => Err(format!(
                "Unknown spender persona '{}'. Valid: debt_risk, overspender, beginner, balanced",
                s
            )),
        }
    }
}

/// Rule-based persona with its static content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpenderProfile {
    pub key: SpenderPersona,
    pub title: String,
    pub long_message: String,
    pub short_badge: String,
    pub tagline: String,
}
