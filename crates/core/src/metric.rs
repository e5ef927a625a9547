//! Metric kinds tracked by the agent and their display metadata.
//!
//! The set of kinds is closed: adding a metric means adding a variant here,
//! a descriptor, and a built-in threshold table in
//! [`crate::thresholds`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Wire key of the source-reported staleness field, in seconds since the
/// source itself last refreshed.
pub const FIELD_LAST_UPDATE: &str = "lastUpdate";

/// One tracked environmental measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Air temperature in degrees Celsius.
    #[serde(rename = "temp")]
    Temperature,
    /// Relative humidity percentage.
    #[serde(rename = "hum")]
    Humidity,
    /// Carbon dioxide concentration in ppm.
    #[serde(rename = "co2")]
    Co2,
    /// Fine particulate matter in μg/m³.
    #[serde(rename = "pm25")]
    Pm25,
    /// Ozone concentration in ppb.
    #[serde(rename = "o3")]
    Ozone,
    /// Total volatile organic compounds in ppb.
    #[serde(rename = "tvoc")]
    Tvoc,
}

/// Chart and label metadata for a metric kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDescriptor {
    /// Human-readable title, e.g. `"CO₂"`.
    pub label: &'static str,
    /// Unit suffix, e.g. `"ppm"`.
    pub unit: &'static str,
    /// Series color for time-series charts.
    pub chart_color: &'static str,
    /// Fixed lower bound of the chart y-axis, if any.
    pub y_min: Option<f64>,
    /// Fixed upper bound of the chart y-axis, if any.
    pub y_max: Option<f64>,
}

impl MetricKind {
    /// Every kind, in display order.
    pub const ALL: [MetricKind; 6] = [
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::Co2,
        MetricKind::Pm25,
        MetricKind::Ozone,
        MetricKind::Tvoc,
    ];

    /// Field name used by the data source JSON payload.
    pub fn wire_key(self) -> &'static str {
        match self {
            MetricKind::Temperature => "temp",
            MetricKind::Humidity => "hum",
            MetricKind::Co2 => "co2",
            MetricKind::Pm25 => "pm25",
            MetricKind::Ozone => "o3",
            MetricKind::Tvoc => "tvoc",
        }
    }

    pub fn descriptor(self) -> MetricDescriptor {
        match self {
            MetricKind::Temperature => MetricDescriptor {
                label: "Temperature",
                unit: "°C",
                chart_color: "rgb(75, 192, 192)",
                y_min: None,
                y_max: None,
            },
            MetricKind::Humidity => MetricDescriptor {
                label: "Humidity",
                unit: "%",
                chart_color: "rgb(54, 162, 235)",
                y_min: Some(0.0),
                y_max: Some(100.0),
            },
            MetricKind::Co2 => MetricDescriptor {
                label: "CO₂",
                unit: "ppm",
                chart_color: "rgb(255, 99, 132)",
                y_min: None,
                y_max: None,
            },
            MetricKind::Pm25 => MetricDescriptor {
                label: "PM2.5",
                unit: "μg/m³",
                chart_color: "rgb(255, 206, 86)",
                y_min: Some(0.0),
                y_max: None,
            },
            MetricKind::Ozone => MetricDescriptor {
                label: "Ozone",
                unit: "ppb",
                chart_color: "rgb(153, 102, 255)",
                y_min: Some(0.0),
                y_max: None,
            },
            MetricKind::Tvoc => MetricDescriptor {
                label: "TVOC",
                unit: "ppb",
                chart_color: "rgb(255, 159, 64)",
                y_min: Some(0.0),
                y_max: None,
            },
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

impl FromStr for MetricKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.wire_key() == s)
            .ok_or_else(|| CoreError::UnknownMetricKind(s.to_string()))
    }
}
