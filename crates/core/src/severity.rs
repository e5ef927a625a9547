//! Severity tiers and classification results.

use serde::{Deserialize, Serialize};

/// Discrete health tier for a metric reading, in increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Good,
    Moderate,
    /// Unhealthy for sensitive groups.
    Sensitive,
    Unhealthy,
    /// Reserved for the catch-all tier above every bound.
    Hazardous,
}

impl SeverityLevel {
    /// Default display label for the tier.
    pub fn default_label(self) -> &'static str {
        match self {
            SeverityLevel::Good => "Good",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Sensitive => "Sensitive",
            SeverityLevel::Unhealthy => "Unhealthy",
            SeverityLevel::Hazardous => "Hazardous",
        }
    }

    /// Default color token (`#rrggbbaa`) for the tier.
    pub fn default_color(self) -> &'static str {
        match self {
            SeverityLevel::Good => "#15ff00ff",
            SeverityLevel::Moderate => "#ffe600ff",
            SeverityLevel::Sensitive => "#ff7700ff",
            SeverityLevel::Unhealthy => "#ff0000ff",
            SeverityLevel::Hazardous => "#6f00ffff",
        }
    }
}

/// Outcome of classifying one reading. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub level: SeverityLevel,
    pub label: String,
    pub color: String,
}

impl Classification {
    /// Classification using the tier's default label and color.
    pub fn standard(level: SeverityLevel) -> Self {
        Self {
            level,
            label: level.default_label().to_string(),
            color: level.default_color().to_string(),
        }
    }
}
