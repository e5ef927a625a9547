//! Renderer-neutral view model of the dashboard.
//!
//! [`DashboardFrame`] bundles what a UI needs to draw one refresh: a card
//! per metric with its value and status color, and a time series per metric
//! ready for a line chart. It serialises to JSON so it can be shipped to any
//! front end.

use std::collections::BTreeMap;

use serde::Serialize;

use airwatch_core::metric::MetricKind;
use airwatch_core::severity::SeverityLevel;
use airwatch_core::types::Timestamp;
use airwatch_core::window::Sample;

use crate::error::{IngestError, IngestErrorKind};
use crate::ingest::AppliedSnapshot;

/// Placeholder shown in place of a value when the last cycle failed.
pub const ERROR_VALUE: &str = "Error";

/// Current reading for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub kind: MetricKind,
    pub title: &'static str,
    pub unit: &'static str,
    /// Formatted reading, or [`ERROR_VALUE`].
    pub value: String,
    /// `None` when there is no valid current reading.
    pub level: Option<SeverityLevel>,
    pub status_label: Option<String>,
    pub color: Option<String>,
}

/// One `(time, value)` chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: Timestamp,
    pub y: f64,
}

/// Time series for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: MetricKind,
    pub title: &'static str,
    /// Axis label including the unit, e.g. `"CO₂ (ppm)"`.
    pub axis_label: String,
    pub color: &'static str,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub cards: Vec<MetricCard>,
    pub charts: Vec<ChartSeries>,
    /// When the source last refreshed, if known.
    pub last_update: Option<Timestamp>,
    pub error: Option<FrameError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameError {
    pub kind: IngestErrorKind,
    pub message: String,
}

impl DashboardFrame {
    /// Frame for a successfully applied snapshot.
    pub fn from_applied(
        applied: &AppliedSnapshot,
        windows: &BTreeMap<MetricKind, Vec<Sample>>,
    ) -> Self {
        let cards = MetricKind::ALL
            .into_iter()
            .map(|kind| {
                let descriptor = kind.descriptor();
                let classification = applied.classifications.get(&kind);
                let value = applied
                    .snapshot
                    .values
                    .get(&kind)
                    .map_or_else(|| ERROR_VALUE.to_string(), |v| v.to_string());
                MetricCard {
                    kind,
                    title: descriptor.label,
                    unit: descriptor.unit,
                    value,
                    level: classification.map(|c| c.level),
                    status_label: classification.map(|c| c.label.clone()),
                    color: classification.map(|c| c.color.clone()),
                }
            })
            .collect();

        Self {
            cards,
            charts: charts(windows),
            last_update: Some(applied.source_refreshed_at),
            error: None,
        }
    }

    /// Frame for a failed cycle: every card shows [`ERROR_VALUE`] while the
    /// retained history stays on the charts.
    pub fn from_error(error: &IngestError, windows: &BTreeMap<MetricKind, Vec<Sample>>) -> Self {
        let cards = MetricKind::ALL
            .into_iter()
            .map(|kind| {
                let descriptor = kind.descriptor();
                MetricCard {
                    kind,
                    title: descriptor.label,
                    unit: descriptor.unit,
                    value: ERROR_VALUE.to_string(),
                    level: None,
                    status_label: None,
                    color: None,
                }
            })
            .collect();

        Self {
            cards,
            charts: charts(windows),
            last_update: None,
            error: Some(FrameError {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }
}

fn charts(windows: &BTreeMap<MetricKind, Vec<Sample>>) -> Vec<ChartSeries> {
    MetricKind::ALL
        .into_iter()
        .map(|kind| {
            let descriptor = kind.descriptor();
            let points = windows
                .get(&kind)
                .map(|samples| {
                    samples
                        .iter()
                        .map(|s| ChartPoint {
                            x: s.timestamp,
                            y: s.value,
                        })
                        .collect()
                })
                .unwrap_or_default();
            ChartSeries {
                kind,
                title: descriptor.label,
                axis_label: format!("{} ({})", descriptor.label, descriptor.unit),
                color: descriptor.chart_color,
                y_min: descriptor.y_min,
                y_max: descriptor.y_max,
                points,
            }
        })
        .collect()
}
