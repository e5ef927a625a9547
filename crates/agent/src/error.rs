//! Ingestion error taxonomy.

use std::time::Duration;

use serde::Serialize;

/// Coarse category of an ingestion failure, as reported to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestErrorKind {
    /// Transport failure, timeout, or non-success HTTP status.
    Network,
    /// Body is not the expected JSON structure.
    Decode,
    /// A required metric or staleness field is absent.
    MissingField,
}

/// A failed fetch-and-apply cycle. No window is mutated when one of these is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The underlying HTTP request failed (network, DNS, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The source returned a non-2xx status code.
    #[error("Source returned HTTP {0}")]
    HttpStatus(u16),

    /// The fetch did not complete within the allotted time.
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed snapshot: {0}")]
    Decode(String),

    #[error("Snapshot is missing field `{0}`")]
    MissingField(String),
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::Request(_) | IngestError::HttpStatus(_) | IngestError::Timeout(_) => {
                IngestErrorKind::Network
            }
            IngestError::Decode(_) => IngestErrorKind::Decode,
            IngestError::MissingField(_) => IngestErrorKind::MissingField,
        }
    }
}
