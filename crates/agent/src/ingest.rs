//! Fetch, validate and apply one snapshot.
//!
//! [`Ingestor::fetch_and_apply`] is all-or-nothing with respect to the
//! payload: decoding completes before any window is touched, so a missing
//! or malformed field leaves every window unchanged. Once decoded, each
//! metric is appended independently; a per-metric rejection (out-of-order
//! timestamp) is reported in [`AppliedSnapshot::rejected`] without blocking
//! the other metrics.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use airwatch_core::clock::Clock;
use airwatch_core::error::CoreError;
use airwatch_core::metric::MetricKind;
use airwatch_core::severity::Classification;
use airwatch_core::thresholds::ThresholdSet;
use airwatch_core::types::Timestamp;
use airwatch_core::window::WindowStore;

use crate::error::IngestError;
use crate::snapshot::Snapshot;
use crate::source::SnapshotSource;

/// Result of a successful cycle, handed to the renderer as-is.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedSnapshot {
    /// Receipt time; every appended sample carries this timestamp.
    pub received_at: Timestamp,
    /// When the source itself last refreshed (`received_at - staleness`).
    pub source_refreshed_at: Timestamp,
    pub snapshot: Snapshot,
    pub classifications: BTreeMap<MetricKind, Classification>,
    /// Per-metric failures that did not abort the cycle.
    #[serde(skip)]
    pub rejected: Vec<CoreError>,
}

/// Orchestrates one fetch-decode-apply cycle against a [`SnapshotSource`].
pub struct Ingestor<S> {
    source: S,
    thresholds: Arc<ThresholdSet>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl<S: SnapshotSource> Ingestor<S> {
    pub fn new(
        source: S,
        thresholds: Arc<ThresholdSet>,
        clock: Arc<dyn Clock>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            thresholds,
            clock,
            fetch_timeout,
        }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Retrieve one snapshot and append it to `store`.
    ///
    /// A fetch exceeding the configured timeout fails with
    /// [`IngestError::Timeout`].
    pub async fn fetch_and_apply(
        &self,
        store: &mut WindowStore,
    ) -> Result<AppliedSnapshot, IngestError> {
        let body = tokio::time::timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| IngestError::Timeout(self.fetch_timeout))??;

        let snapshot = Snapshot::decode(&body)?;
        let received_at = self.clock.now();

        let mut rejected = Vec::new();
        let mut classifications = BTreeMap::new();

        for (&kind, &value) in &snapshot.values {
            if let Err(e) = store.append(kind, received_at, value) {
                tracing::warn!(%kind, error = %e, "Sample rejected");
                rejected.push(e);
            }

            match self.thresholds.classify(kind, value) {
                Ok(classification) => {
                    classifications.insert(kind, classification);
                }
                Err(e) => {
                    tracing::error!(%kind, error = %e, "Classification failed");
                    rejected.push(e);
                }
            }
        }

        let source_refreshed_at = chrono::Duration::from_std(snapshot.staleness)
            .ok()
            .and_then(|staleness| received_at.checked_sub_signed(staleness))
            .unwrap_or(received_at);

        tracing::debug!(
            %received_at,
            staleness_secs = snapshot.staleness.as_secs_f64(),
            rejected = rejected.len(),
            "Snapshot applied",
        );

        Ok(AppliedSnapshot {
            received_at,
            source_refreshed_at,
            snapshot,
            classifications,
            rejected,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
