//! Investment phases and the category/cap profile each one allocates by.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::EtfEngineError;
use crate::domain::etf::same_category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Growth,
    Transition,
    Paycheque,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Growth, Phase::Transition, Phase::Paycheque];

    /// Lower-case key used in config section names (`[phase.<key>]`).
    pub fn key(self) -> &'static str {
        match self {
            Phase::Growth => "growth",
            Phase::Transition => "transition",
            Phase::Paycheque => "paycheque",
        }
    }

    pub fn config_section(self) -> String {
        format!("phase.{}", self.key())
    }

    pub fn default_profile(self) -> PhaseProfile {
        let (categories, max_weight): (&[&str], f64) = match self {
            Phase::Growth => (&["Growth", "Broad Market"], 0.40),
            Phase::Transition => (&["Growth", "Broad Market", "Dividend", "Balanced"], 0.25),
            Phase::Paycheque => (&["Dividend", "Covered Call", "Fixed Income"], 0.30),
        };
        PhaseProfile {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            max_weight,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Growth => "Growth",
            Phase::Transition => "Transition",
            Phase::Paycheque => "Paycheque",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Phase {
    type Err = EtfEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "growth" => Ok(Phase::Growth),
            "transition" => Ok(Phase::Transition),
            // accept the US spelling too
            "paycheque" | "paycheck" => Ok(Phase::Paycheque),
            _ => Err(EtfEngineError::UnknownPhase(s.to_string())),
        }
    }
}

/// Target category set and per-holding weight cap for a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseProfile {
    pub categories: Vec<String>,
    pub max_weight: f64,
}

impl PhaseProfile {
    pub fn includes(&self, category: &str) -> bool {
        self.categories.iter().any(|c| same_category(c, category))
    }
}
