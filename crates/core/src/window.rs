//! Rolling per-metric sample history.
//!
//! [`WindowStore`] keeps one time-ordered [`Window`] per metric kind and
//! evicts samples older than the retention horizon on every append. Every
//! retained sample lies in `[now - retention, now]`; the lower bound is
//! inclusive.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::clock::Clock;
use crate::error::CoreError;
use crate::metric::MetricKind;
use crate::types::Timestamp;

/// Default retention horizon: 24 hours.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// A single timestamped reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// Ordered history for one metric kind, oldest first.
#[derive(Debug, Default, Clone)]
struct Window {
    samples: VecDeque<Sample>,
    /// Newest timestamp ever accepted. Survives eviction so ordering is
    /// enforced even after the window empties.
    last_timestamp: Option<Timestamp>,
}

impl Window {
    fn push(&mut self, kind: MetricKind, sample: Sample) -> Result<(), CoreError> {
        if let Some(last) = self.last_timestamp {
            if sample.timestamp < last {
                return Err(CoreError::OutOfOrderSample {
                    kind,
                    timestamp: sample.timestamp,
                    last,
                });
            }
        }
        self.last_timestamp = Some(sample.timestamp);
        self.samples.push_back(sample);
        Ok(())
    }

    /// Drop samples strictly older than `cutoff`. Only the expired head is
    /// visited.
    fn prune(&mut self, cutoff: Timestamp) -> usize {
        let mut evicted = 0;
        while self
            .samples
            .front()
            .is_some_and(|sample| sample.timestamp < cutoff)
        {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }
}

/// Per-metric windows with a fixed retention horizon and an injected clock.
///
/// The kind set and horizon are fixed at construction.
#[derive(Debug)]
pub struct WindowStore {
    windows: BTreeMap<MetricKind, Window>,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl WindowStore {
    pub fn new(
        kinds: impl IntoIterator<Item = MetricKind>,
        retention: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let windows = kinds
            .into_iter()
            .map(|kind| (kind, Window::default()))
            .collect();
        Self {
            windows,
            retention,
            clock,
        }
    }

    /// Store tracking every [`MetricKind`].
    pub fn with_all_kinds(retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::new(MetricKind::ALL, retention, clock)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.windows.keys().copied()
    }

    /// Oldest timestamp still retained at `now`.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        chrono::Duration::from_std(self.retention)
            .ok()
            .and_then(|retention| now.checked_sub_signed(retention))
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC)
    }

    /// Append a sample to `kind`'s window, then evict expired samples from
    /// it.
    ///
    /// A timestamp older than the newest one already accepted is rejected
    /// with [`CoreError::OutOfOrderSample`], one later than the clock's `now`
    /// with [`CoreError::FutureSample`]. Either leaves the window untouched.
    pub fn append(
        &mut self,
        kind: MetricKind,
        timestamp: Timestamp,
        value: f64,
    ) -> Result<(), CoreError> {
        let now = self.clock.now();
        if timestamp > now {
            return Err(CoreError::FutureSample {
                kind,
                timestamp,
                now,
            });
        }
        let cutoff = self.cutoff(now);
        let window = self
            .windows
            .get_mut(&kind)
            .ok_or_else(|| CoreError::UnknownMetricKind(kind.to_string()))?;

        window.push(kind, Sample { timestamp, value })?;

        let evicted = window.prune(cutoff);
        if evicted > 0 {
            tracing::trace!(%kind, evicted, "Evicted expired samples");
        }
        Ok(())
    }

    /// Evict expired samples from every window. Returns the number evicted.
    pub fn prune(&mut self) -> usize {
        let cutoff = self.cutoff(self.clock.now());
        self.windows
            .values_mut()
            .map(|window| window.prune(cutoff))
            .sum()
    }

    /// Point-in-time copy of `kind`'s window, oldest first.
    pub fn samples_in_window(&self, kind: MetricKind) -> Result<Vec<Sample>, CoreError> {
        self.windows
            .get(&kind)
            .map(|window| window.samples.iter().copied().collect())
            .ok_or_else(|| CoreError::UnknownMetricKind(kind.to_string()))
    }

    /// Point-in-time copy of every window.
    pub fn snapshot(&self) -> BTreeMap<MetricKind, Vec<Sample>> {
        self.windows
            .iter()
            .map(|(kind, window)| (*kind, window.samples.iter().copied().collect()))
            .collect()
    }

    /// Number of samples currently held for `kind`.
    pub fn len(&self, kind: MetricKind) -> usize {
        self.windows
            .get(&kind)
            .map_or(0, |window| window.samples.len())
    }

    /// Whether every window is empty.
    pub fn is_empty(&self) -> bool {
        self.windows.values().all(|window| window.samples.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;

    const HOUR: Duration = Duration::from_secs(3600);

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn store(retention: Duration) -> (WindowStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = WindowStore::with_all_kinds(retention, clock.clone());
        (store, clock)
    }

    #[test]
    fn append_keeps_samples_in_order() {
        let (mut store, clock) = store(DEFAULT_RETENTION);
        for i in 0..5 {
            let now = clock.now();
            store.append(MetricKind::Co2, now, 600.0 + f64::from(i)).unwrap();
            clock.advance(chrono::Duration::seconds(30));
        }
        let samples = store.samples_in_window(MetricKind::Co2).unwrap();
        assert_eq!(samples.len(), 5);
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(samples[4].value, 604.0);
    }

    #[test]
    fn samples_older_than_horizon_are_evicted_on_append() {
        let (mut store, clock) = store(HOUR);
        store.append(MetricKind::Pm25, clock.now(), 5.0).unwrap();
        clock.advance(chrono::Duration::minutes(30));
        store.append(MetricKind::Pm25, clock.now(), 6.0).unwrap();
        clock.advance(chrono::Duration::minutes(31));
        store.append(MetricKind::Pm25, clock.now(), 7.0).unwrap();

        let values: Vec<f64> = store
            .samples_in_window(MetricKind::Pm25)
            .unwrap()
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![6.0, 7.0]);
    }

    #[test]
    fn sample_exactly_at_cutoff_is_retained() {
        let (mut store, clock) = store(HOUR);
        store.append(MetricKind::Ozone, clock.now(), 10.0).unwrap();
        clock.advance(chrono::Duration::hours(1));
        store.append(MetricKind::Ozone, clock.now(), 11.0).unwrap();
        assert_eq!(store.len(MetricKind::Ozone), 2);

        clock.advance(chrono::Duration::nanoseconds(1));
        store.prune();
        assert_eq!(store.len(MetricKind::Ozone), 1);
    }

    #[test]
    fn window_matches_horizon_after_every_append() {
        let (mut store, clock) = store(HOUR);
        let mut appended: Vec<Timestamp> = Vec::new();
        // Irregular, non-decreasing cadence including duplicates.
        let steps = [0, 10, 10, 0, 25, 40, 5, 70, 0, 15, 30];
        for minutes in steps {
            clock.advance(chrono::Duration::minutes(minutes));
            let now = clock.now();
            store.append(MetricKind::Tvoc, now, 1.0).unwrap();
            appended.push(now);

            let cutoff = store.cutoff(now);
            let expected: Vec<Timestamp> =
                appended.iter().copied().filter(|t| *t >= cutoff).collect();
            let actual: Vec<Timestamp> = store
                .samples_in_window(MetricKind::Tvoc)
                .unwrap()
                .iter()
                .map(|s| s.timestamp)
                .collect();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prune_is_idempotent() {
        let (mut store, clock) = store(HOUR);
        for _ in 0..4 {
            store.append(MetricKind::Humidity, clock.now(), 40.0).unwrap();
            clock.advance(chrono::Duration::minutes(25));
        }
        let first = store.prune();
        let after_first = store.snapshot();
        let second = store.prune();
        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(store.snapshot(), after_first);
    }

    #[test]
    fn out_of_order_append_is_rejected_without_mutation() {
        let (mut store, clock) = store(HOUR);
        let now = clock.now();
        store.append(MetricKind::Co2, now, 500.0).unwrap();
        let before = store.samples_in_window(MetricKind::Co2).unwrap();

        let earlier = now - chrono::Duration::seconds(1);
        assert_matches!(
            store.append(MetricKind::Co2, earlier, 510.0),
            Err(CoreError::OutOfOrderSample { kind: MetricKind::Co2, .. })
        );
        assert_eq!(store.samples_in_window(MetricKind::Co2).unwrap(), before);
    }

    #[test]
    fn sample_ahead_of_clock_is_rejected() {
        let (mut store, clock) = store(HOUR);
        let ahead = clock.now() + chrono::Duration::seconds(1);
        assert_matches!(
            store.append(MetricKind::Co2, ahead, 500.0),
            Err(CoreError::FutureSample { kind: MetricKind::Co2, .. })
        );
        assert!(store.is_empty());

        // Rejection does not advance the ordering watermark.
        store.append(MetricKind::Co2, clock.now(), 500.0).unwrap();
        assert_eq!(store.len(MetricKind::Co2), 1);
    }

    #[test]
    fn ordering_survives_an_emptied_window() {
        let (mut store, clock) = store(HOUR);
        let first = clock.now();
        store.append(MetricKind::Co2, first, 500.0).unwrap();
        clock.advance(chrono::Duration::hours(3));
        store.prune();
        assert_eq!(store.len(MetricKind::Co2), 0);

        let stale = first - chrono::Duration::seconds(1);
        assert!(store.append(MetricKind::Co2, stale, 1.0).is_err());
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let (mut store, clock) = store(HOUR);
        let now = clock.now();
        store.append(MetricKind::Co2, now, 1.0).unwrap();
        store.append(MetricKind::Co2, now, 2.0).unwrap();
        assert_eq!(store.len(MetricKind::Co2), 2);
    }

    #[test]
    fn windows_are_independent() {
        let (mut store, clock) = store(HOUR);
        store.append(MetricKind::Co2, clock.now(), 1.0).unwrap();
        assert_eq!(store.len(MetricKind::Co2), 1);
        assert_eq!(store.len(MetricKind::Pm25), 0);
    }

    #[test]
    fn untracked_kind_is_unknown() {
        let clock = Arc::new(ManualClock::new(start()));
        let mut store = WindowStore::new([MetricKind::Co2], HOUR, clock.clone());
        assert_matches!(
            store.append(MetricKind::Ozone, clock.now(), 1.0),
            Err(CoreError::UnknownMetricKind(_))
        );
        assert!(store.samples_in_window(MetricKind::Ozone).is_err());
    }

    #[test]
    fn returned_samples_are_detached_copies() {
        let (mut store, clock) = store(HOUR);
        store.append(MetricKind::Co2, clock.now(), 1.0).unwrap();
        let mut view = store.samples_in_window(MetricKind::Co2).unwrap();
        view[0].value = 99.0;
        view.clear();
        assert_eq!(store.samples_in_window(MetricKind::Co2).unwrap()[0].value, 1.0);
    }

    #[test]
    fn huge_retention_does_not_overflow() {
        let (mut store, clock) = store(Duration::MAX);
        store.append(MetricKind::Co2, clock.now(), 1.0).unwrap();
        assert_eq!(store.len(MetricKind::Co2), 1);
    }
}
