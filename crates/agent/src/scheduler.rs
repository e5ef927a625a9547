//! Fixed-cadence poll loop.
//!
//! [`PollScheduler`] owns the [`WindowStore`] and drives the
//! [`Ingestor`] on a `tokio::time::interval`. Each cycle is awaited inline,
//! so at most one fetch is in flight; ticks that come due while a fetch is
//! still running are skipped rather than queued. A failed cycle is reported
//! to the renderer and polling carries on at the normal interval.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use airwatch_core::window::WindowStore;

use crate::ingest::Ingestor;
use crate::render::RenderAdapter;
use crate::source::SnapshotSource;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Lifecycle of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// A fetch-and-apply cycle is in flight.
    Fetching,
    /// The last cycle failed and was reported; waiting for the next tick.
    Backoff,
}

pub struct PollScheduler<S, R> {
    ingestor: Ingestor<S>,
    store: WindowStore,
    renderer: R,
    interval: Duration,
    state: SchedulerState,
}

impl<S, R> PollScheduler<S, R>
where
    S: SnapshotSource,
    R: RenderAdapter,
{
    pub fn new(ingestor: Ingestor<S>, store: WindowStore, renderer: R, interval: Duration) -> Self {
        Self {
            ingestor,
            store,
            renderer,
            interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn store(&self) -> &WindowStore {
        &self.store
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single cycle and notify the renderer of its outcome.
    ///
    /// Returns the state the scheduler settled in. `&mut self` rules out
    /// overlapping cycles, so a `Fetching` state on entry means the previous
    /// cycle's future was dropped before it finished; it applied nothing and
    /// is simply superseded.
    pub async fn poll_once(&mut self) -> SchedulerState {
        if self.state == SchedulerState::Fetching {
            tracing::warn!("Previous cycle was abandoned mid-fetch");
        }
        self.transition(SchedulerState::Fetching);

        match self.ingestor.fetch_and_apply(&mut self.store).await {
            Ok(applied) => {
                let windows = self.store.snapshot();
                tracing::info!(
                    received_at = %applied.received_at,
                    rejected = applied.rejected.len(),
                    "Snapshot ingested",
                );
                self.renderer.on_snapshot_applied(&applied, &windows);
                self.transition(SchedulerState::Idle);
            }
            Err(e) => {
                tracing::error!(kind = ?e.kind(), error = %e, "Ingestion cycle failed");
                let windows = self.store.snapshot();
                self.renderer.on_ingest_error(&e, &windows);
                self.transition(SchedulerState::Backoff);
            }
        }

        self.state
    }

    /// Poll on the configured interval until `cancel` is triggered.
    ///
    /// The first cycle runs immediately. Cancellation is honoured even while
    /// a fetch is in flight.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            interval = ?self.interval,
            retention = ?self.store.retention(),
            "Poll scheduler started",
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = self.poll_once() => {}
                    }
                }
            }
        }

        // An abandoned in-flight cycle applied nothing.
        if self.state == SchedulerState::Fetching {
            self.transition(SchedulerState::Idle);
        }
        tracing::info!("Poll scheduler stopping");
    }

    fn transition(&mut self, next: SchedulerState) {
        tracing::debug!(from = ?self.state, to = ?next, "Scheduler transition");
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
