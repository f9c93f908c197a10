use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Diagnosis class derived once from the classifier's free-text label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    Healthy,
    EarlyBlight,
    LateBlight,
    /// Any other label. Treated as diseased with a broad brown/yellow heuristic.
    Diseased,
}

impl Diagnosis {
    /// Classify a label by case-insensitive substring match.
    ///
    /// "healthy" wins over everything else; "early"/"late" only count
    /// together with "blight".
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("healthy") {
            Diagnosis::Healthy
        } else if lower.contains("early") && lower.contains("blight") {
            Diagnosis::EarlyBlight
        } else if lower.contains("late") && lower.contains("blight") {
            Diagnosis::LateBlight
        } else {
            Diagnosis::Diseased
        }
    }

    pub fn is_healthy(self) -> bool {
        self == Diagnosis::Healthy
    }
}

impl FromStr for Diagnosis {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Diagnosis::from_label(s))
    }
}

impl From<&str> for Diagnosis {
    fn from(label: &str) -> Self {
        Diagnosis::from_label(label)
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Diagnosis::Healthy => "healthy",
            Diagnosis::EarlyBlight => "early_blight",
            Diagnosis::LateBlight => "late_blight",
            Diagnosis::Diseased => "diseased",
        };
        f.write_str(name)
    }
}
