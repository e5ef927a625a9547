use crate::metric::MetricKind;
use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown metric kind: {0}")]
    UnknownMetricKind(String),

    #[error("Out-of-order sample for {kind}: {timestamp} precedes last sample at {last}")]
    OutOfOrderSample {
        kind: MetricKind,
        timestamp: Timestamp,
        last: Timestamp,
    },

    #[error("Sample for {kind} at {timestamp} is ahead of the clock ({now})")]
    FutureSample {
        kind: MetricKind,
        timestamp: Timestamp,
        now: Timestamp,
    },

    #[error("Invalid threshold table for {kind}: {reason}")]
    InvalidThresholdTable { kind: MetricKind, reason: String },

    #[error("No threshold table configured for {kind}")]
    MissingThresholdTable { kind: MetricKind },

    #[error("Malformed threshold file: {0}")]
    MalformedThresholdFile(String),
}
