//! Render adapter surface.
//!
//! The scheduler reports every cycle outcome through [`RenderAdapter`].
//! Window contents are passed as point-in-time copies, so an adapter may
//! hold on to them or hand them to another thread freely.

use std::collections::BTreeMap;
use std::sync::Arc;

use airwatch_core::metric::MetricKind;
use airwatch_core::window::Sample;

use crate::dashboard::DashboardFrame;
use crate::error::IngestError;
use crate::ingest::AppliedSnapshot;

/// Consumer of classification results and window contents.
pub trait RenderAdapter {
    /// A snapshot was applied. `windows` reflects the store after the append.
    fn on_snapshot_applied(
        &self,
        applied: &AppliedSnapshot,
        windows: &BTreeMap<MetricKind, Vec<Sample>>,
    );

    /// A cycle failed. Displays should show an explicit error indication.
    fn on_ingest_error(&self, error: &IngestError, windows: &BTreeMap<MetricKind, Vec<Sample>>);
}

impl<R: RenderAdapter + ?Sized> RenderAdapter for Arc<R> {
    fn on_snapshot_applied(
        &self,
        applied: &AppliedSnapshot,
        windows: &BTreeMap<MetricKind, Vec<Sample>>,
    ) {
        (**self).on_snapshot_applied(applied, windows);
    }

    fn on_ingest_error(&self, error: &IngestError, windows: &BTreeMap<MetricKind, Vec<Sample>>) {
        (**self).on_ingest_error(error, windows);
    }
}

/// Adapter that writes each frame to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl RenderAdapter for LogRenderer {
    fn on_snapshot_applied(
        &self,
        applied: &AppliedSnapshot,
        windows: &BTreeMap<MetricKind, Vec<Sample>>,
    ) {
        let frame = DashboardFrame::from_applied(applied, windows);

        for card in &frame.cards {
            tracing::info!(
                metric = card.title,
                value = %card.value,
                unit = card.unit,
                status = card.status_label.as_deref().unwrap_or("-"),
                "Reading",
            );
        }
        tracing::info!(
            last_update = %applied.source_refreshed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            "Source last refreshed",
        );

        match serde_json::to_string(&frame) {
            Ok(json) => tracing::debug!(frame = %json, "Dashboard frame"),
            Err(e) => tracing::warn!(error = %e, "Failed to serialise dashboard frame"),
        }
    }

    fn on_ingest_error(&self, error: &IngestError, windows: &BTreeMap<MetricKind, Vec<Sample>>) {
        let frame = DashboardFrame::from_error(error, windows);
        tracing::error!(
            kind = ?error.kind(),
            error = %error,
            metrics = frame.cards.len(),
            "Sensor data unavailable, displays show Error",
        );
    }
}
