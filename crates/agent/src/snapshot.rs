//! Decoding of raw source payloads into validated snapshots.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use airwatch_core::metric::{MetricKind, FIELD_LAST_UPDATE};

use crate::error::IngestError;

/// One cycle's validated reading: a value for every metric kind plus the
/// source-reported staleness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub values: BTreeMap<MetricKind, f64>,
    /// Time since the source itself last refreshed.
    pub staleness: Duration,
}

impl Snapshot {
    /// Parse and validate a JSON payload.
    ///
    /// Every metric kind and `lastUpdate` must be present and numeric.
    /// `null` counts as absent. Unknown fields are ignored.
    pub fn decode(body: &str) -> Result<Self, IngestError> {
        let payload: Value =
            serde_json::from_str(body).map_err(|e| IngestError::Decode(e.to_string()))?;
        let object = payload
            .as_object()
            .ok_or_else(|| IngestError::Decode("expected a JSON object".into()))?;

        let values = MetricKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, numeric_field(object, kind.wire_key())?)))
            .collect::<Result<BTreeMap<_, _>, IngestError>>()?;

        let seconds = numeric_field(object, FIELD_LAST_UPDATE)?;
        let staleness = Duration::try_from_secs_f64(seconds).map_err(|_| {
            IngestError::Decode(format!(
                "field `{FIELD_LAST_UPDATE}` must be a non-negative number of seconds, got {seconds}"
            ))
        })?;

        Ok(Self { values, staleness })
    }
}

fn numeric_field(object: &Map<String, Value>, key: &str) -> Result<f64, IngestError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(IngestError::MissingField(key.to_string())),
        Some(value) => value
            .as_f64()
            .ok_or_else(|| IngestError::Decode(format!("field `{key}` is not numeric: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const FULL: &str =
        r#"{"temp":22.1,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5}"#;

    #[test]
    fn decodes_complete_payload() {
        let snapshot = Snapshot::decode(FULL).unwrap();
        assert_eq!(snapshot.values.len(), 6);
        assert_eq!(snapshot.values[&MetricKind::Temperature], 22.1);
        assert_eq!(snapshot.values[&MetricKind::Co2], 650.0);
        assert_eq!(snapshot.staleness, Duration::from_secs(5));
    }

    #[test]
    fn missing_metric_is_reported_by_wire_key() {
        let body = r#"{"temp":22.1,"hum":45,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5}"#;
        assert_matches!(
            Snapshot::decode(body),
            Err(IngestError::MissingField(field)) if field == "co2"
        );
    }

    #[test]
    fn missing_staleness_is_reported() {
        let body = r#"{"temp":22.1,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150}"#;
        assert_matches!(
            Snapshot::decode(body),
            Err(IngestError::MissingField(field)) if field == "lastUpdate"
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let body = r#"{"temp":null,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5}"#;
        assert_matches!(Snapshot::decode(body), Err(IngestError::MissingField(_)));
    }

    #[test]
    fn non_numeric_value_is_decode_error() {
        let body = r#"{"temp":"warm","hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5}"#;
        assert_matches!(Snapshot::decode(body), Err(IngestError::Decode(_)));
    }

    #[test]
    fn negative_staleness_is_decode_error() {
        let body = r#"{"temp":22,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":-3}"#;
        assert_matches!(Snapshot::decode(body), Err(IngestError::Decode(_)));
    }

    #[test]
    fn non_object_and_garbage_are_decode_errors() {
        assert_matches!(Snapshot::decode("[1,2,3]"), Err(IngestError::Decode(_)));
        assert_matches!(Snapshot::decode("<html>"), Err(IngestError::Decode(_)));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let body = r#"{"temp":22.1,"hum":45,"co2":650,"pm25":8,"o3":20,"tvoc":150,"lastUpdate":5,"battery":97}"#;
        assert!(Snapshot::decode(body).is_ok());
    }
}
