//! Data-driven threshold tables and the classifier built on them.
//!
//! Pure logic. Tables are validated once when a [`ThresholdSet`] is built;
//! after that, classification cannot fail for any kind in the closed set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metric::MetricKind;
use crate::severity::{Classification, SeverityLevel};

/// One bounded tier: readings `<= upper_bound` fall into it unless an earlier
/// tier already matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub upper_bound: f64,
    pub level: SeverityLevel,
    pub label: String,
    pub color: String,
}

/// The unbounded final tier. Always [`SeverityLevel::Hazardous`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchAll {
    pub label: String,
    pub color: String,
}

impl Default for CatchAll {
    fn default() -> Self {
        Self {
            label: SeverityLevel::Hazardous.default_label().to_string(),
            color: SeverityLevel::Hazardous.default_color().to_string(),
        }
    }
}

/// Ordered tiers for a single metric kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub tiers: Vec<Tier>,
    #[serde(default)]
    pub catch_all: CatchAll,
}

impl ThresholdTable {
    /// Table with the four standard bounded tiers (good through unhealthy)
    /// using default labels and colors.
    pub fn standard(bounds: [f64; 4]) -> Self {
        let levels = [
            SeverityLevel::Good,
            SeverityLevel::Moderate,
            SeverityLevel::Sensitive,
            SeverityLevel::Unhealthy,
        ];
        let tiers = levels
            .into_iter()
            .zip(bounds)
            .map(|(level, upper_bound)| Tier {
                upper_bound,
                level,
                label: level.default_label().to_string(),
                color: level.default_color().to_string(),
            })
            .collect();
        Self {
            tiers,
            catch_all: CatchAll::default(),
        }
    }

    /// Check the table's structural invariants.
    pub fn validate(&self, kind: MetricKind) -> Result<(), CoreError> {
        let invalid = |reason: String| CoreError::InvalidThresholdTable { kind, reason };

        if self.tiers.is_empty() {
            return Err(invalid("at least one bounded tier is required".into()));
        }

        let mut previous: Option<f64> = None;
        for tier in &self.tiers {
            if !tier.upper_bound.is_finite() {
                return Err(invalid(format!(
                    "upper bound {} is not finite",
                    tier.upper_bound
                )));
            }
            if tier.level == SeverityLevel::Hazardous {
                return Err(invalid(
                    "hazardous is reserved for the catch-all tier".into(),
                ));
            }
            if let Some(prev) = previous {
                if tier.upper_bound <= prev {
                    return Err(invalid(format!(
                        "upper bounds must strictly increase ({} after {prev})",
                        tier.upper_bound
                    )));
                }
            }
            previous = Some(tier.upper_bound);
        }

        Ok(())
    }

    /// Map a reading onto its tier.
    ///
    /// Bounds are inclusive. Values above every bound, and NaN, land in the
    /// catch-all hazardous tier.
    pub fn classify(&self, value: f64) -> Classification {
        match self.tiers.iter().find(|tier| value <= tier.upper_bound) {
            Some(tier) => Classification {
                level: tier.level,
                label: tier.label.clone(),
                color: tier.color.clone(),
            },
            None => Classification {
                level: SeverityLevel::Hazardous,
                label: self.catch_all.label.clone(),
                color: self.catch_all.color.clone(),
            },
        }
    }
}

/// Validated threshold tables covering every [`MetricKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    tables: BTreeMap<MetricKind, ThresholdTable>,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThresholdSet {
    /// The built-in tables for every metric kind.
    pub fn builtin() -> Self {
        let tables = MetricKind::ALL
            .into_iter()
            .map(|kind| (kind, builtin_table(kind)))
            .collect();
        Self { tables }
    }

    /// Build a set from explicit tables.
    ///
    /// Every table is validated and every kind in the closed set must be
    /// covered.
    pub fn from_tables(tables: BTreeMap<MetricKind, ThresholdTable>) -> Result<Self, CoreError> {
        for (kind, table) in &tables {
            table.validate(*kind)?;
        }
        if let Some(missing) = MetricKind::ALL
            .into_iter()
            .find(|kind| !tables.contains_key(kind))
        {
            return Err(CoreError::MissingThresholdTable { kind: missing });
        }
        Ok(Self { tables })
    }

    /// Replace built-in tables with the ones in a JSON override document.
    ///
    /// The document is an object keyed by metric wire key. Kinds not present
    /// keep their current table. An unrecognised key fails with
    /// [`CoreError::UnknownMetricKind`].
    pub fn with_overrides_json(mut self, json: &str) -> Result<Self, CoreError> {
        let raw: BTreeMap<String, ThresholdTable> = serde_json::from_str(json)
            .map_err(|e| CoreError::MalformedThresholdFile(e.to_string()))?;

        for (key, table) in raw {
            let kind: MetricKind = key.parse()?;
            table.validate(kind)?;
            tracing::debug!(%kind, tiers = table.tiers.len(), "Threshold table overridden");
            self.tables.insert(kind, table);
        }

        Ok(self)
    }

    pub fn table(&self, kind: MetricKind) -> Option<&ThresholdTable> {
        self.tables.get(&kind)
    }

    /// Classify one reading.
    ///
    /// Deterministic and side-effect free. Only fails if the set has no
    /// table for `kind`, which construction rules out.
    pub fn classify(&self, kind: MetricKind, value: f64) -> Result<Classification, CoreError> {
        self.tables
            .get(&kind)
            .map(|table| table.classify(value))
            .ok_or(CoreError::MissingThresholdTable { kind })
    }

    /// Classify a full set of readings.
    pub fn classify_all(
        &self,
        values: &BTreeMap<MetricKind, f64>,
    ) -> Result<BTreeMap<MetricKind, Classification>, CoreError> {
        values
            .iter()
            .map(|(kind, value)| Ok((*kind, self.classify(*kind, *value)?)))
            .collect()
    }
}

fn builtin_table(kind: MetricKind) -> ThresholdTable {
    let bounds = match kind {
        MetricKind::Temperature => [26.0, 30.0, 35.0, 40.0],
        MetricKind::Humidity => [60.0, 70.0, 80.0, 90.0],
        MetricKind::Co2 => [700.0, 1000.0, 1500.0, 2500.0],
        MetricKind::Pm25 => [12.0, 35.0, 55.0, 150.0],
        MetricKind::Ozone => [50.0, 100.0, 150.0, 200.0],
        MetricKind::Tvoc => [200.0, 400.0, 600.0, 800.0],
    };
    ThresholdTable::standard(bounds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
