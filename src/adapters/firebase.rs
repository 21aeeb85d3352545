//! Flattens Firebase-style snapshots (objects keyed by push id) into ordered
//! records with an explicit key, decoding each record on its own so one bad
//! entry is reported instead of failing the whole snapshot.

use crate::domain::model::{ExerciseSet, Prescription, Rep, SessionRecord, StoredInstant};
use crate::utils::error::DataError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<DataError>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// {id: record} 依 key 排序（push id 本身按時間遞增）；
/// 陣列以原始索引當 key，略過 null 但不重新編號
pub fn flatten(snapshot: Value) -> Result<Vec<(String, Value)>, DataError> {
    match snapshot {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(entries)
        }
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(index, v)| (index.to_string(), v))
            .collect()),
        other => Err(DataError::new(
            "snapshot",
            format!("expected an object or array, got {}", type_name(&other)),
        )),
    }
}

pub fn decode_prescriptions(snapshot: Value) -> Result<Decoded<Prescription>, DataError> {
    decode(snapshot, |key, mut prescription: Prescription| {
        if prescription.key.is_none() {
            prescription.key = Some(key);
        }
        prescription
    })
}

pub fn decode_sessions(snapshot: Value) -> Result<Decoded<SessionRecord>, DataError> {
    decode(snapshot, |key, stored: StoredSession| stored.into_record(Some(key)))
}

fn decode<R, T, F>(snapshot: Value, convert: F) -> Result<Decoded<T>, DataError>
where
    R: DeserializeOwned,
    F: Fn(String, R) -> T,
{
    let mut decoded = Decoded::default();

    for (key, value) in flatten(snapshot)? {
        match serde_json::from_value::<R>(value) {
            Ok(raw) => decoded.records.push(convert(key, raw)),
            Err(e) => {
                tracing::warn!("⚠️ Rejected record {}: {}", key, e);
                decoded.rejected.push(DataError::new(key, e.to_string()));
            }
        }
    }

    Ok(decoded)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// 儲存格式：sets[].reps[].repData.pt.{successRateLeft, successRateRight}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(rename = "userID", alias = "userId", alias = "patientId")]
    user_id: String,
    exercise_name: String,
    #[serde(default)]
    timestamp: Option<StoredInstant>,
    #[serde(default)]
    sets: Vec<StoredSet>,
}

#[derive(Debug, Deserialize)]
struct StoredSet {
    #[serde(default)]
    reps: Vec<StoredRep>,
}

#[derive(Debug, Deserialize)]
struct StoredRep {
    #[serde(default, rename = "repData")]
    rep_data: Option<StoredRepData>,
}

#[derive(Debug, Deserialize)]
struct StoredRepData {
    #[serde(default)]
    pt: Option<Rep>,
}

impl StoredSession {
    fn into_record(self, key: Option<String>) -> SessionRecord {
        SessionRecord {
            key,
            patient_id: self.user_id,
            exercise_name: self.exercise_name,
            timestamp: self.timestamp,
            sets: self
                .sets
                .into_iter()
                .map(|set| ExerciseSet {
                    reps: set
                        .reps
                        .into_iter()
                        .map(|rep| rep.rep_data.and_then(|d| d.pt).unwrap_or_default())
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_object_keeps_keys_in_order() {
        let flat = flatten(json!({"-b": {"x": 2}, "-a": {"x": 1}})).unwrap();
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["-a", "-b"]);
    }

    #[test]
    fn test_flatten_array_and_null() {
        let flat = flatten(json!([null, {"x": 1}, null, {"x": 3}])).unwrap();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].0, "1");
        assert_eq!(flat[1].0, "3");
        assert!(flatten(Value::Null).unwrap().is_empty());
        assert!(flatten(json!("oops")).is_err());
    }

    #[test]
    fn test_decode_sessions_reads_nested_rep_data() {
        let snapshot = json!({
            "-Nabc": {
                "userID": "p1",
                "exerciseName": "\"Squat\"",
                "timestamp": {"seconds": 1704067200, "nanoseconds": 0},
                "sets": [
                    {"reps": [
                        {"repData": {"pt": {"successRateLeft": 0.8, "successRateRight": 0.6}}},
                        {"repData": {"pt": {"successRateLeft": 0.9}}},
                        {}
                    ]}
                ]
            }
        });

        let decoded = decode_sessions(snapshot).unwrap();
        assert!(decoded.rejected.is_empty());
        let record = &decoded.records[0];
        assert_eq!(record.key.as_deref(), Some("-Nabc"));
        assert_eq!(record.patient_id, "p1");
        assert_eq!(record.sets[0].reps.len(), 3);
        assert_eq!(record.sets[0].reps[1].success_rate_right, None);
        assert_eq!(record.sets[0].reps[2], Rep::default());
    }

    #[test]
    fn test_decode_sessions_keeps_missing_timestamp_for_aggregation() {
        let snapshot = json!({"-a": {"userID": "p1", "exerciseName": "Squat", "sets": []}});
        let decoded = decode_sessions(snapshot).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].timestamp, None);
    }

    #[test]
    fn test_decode_array_snapshot_keys_by_index() {
        let snapshot = json!([
            null,
            {"userID": "p1", "exerciseName": "Squat", "timestamp": {"seconds": 1, "nanoseconds": 0}},
            {"userID": "p1", "exerciseName": "Bridge", "timestamp": "yesterday"},
            {"userID": "p1", "exerciseName": "Squat"}
        ]);

        let decoded = decode_sessions(snapshot).unwrap();
        let keys: Vec<_> = decoded.records.iter().map(|r| r.key.as_deref()).collect();
        assert_eq!(keys, vec![Some("1"), Some("3")]);
        assert_eq!(decoded.rejected[0].record, "2");
    }

    #[test]
    fn test_decode_rejects_malformed_record_only() {
        let snapshot = json!({
            "-a": {"userID": "p1", "exerciseName": "Squat", "timestamp": "yesterday"},
            "-b": {"userID": "p1", "exerciseName": "Squat", "timestamp": {"seconds": 1, "nanoseconds": 0}}
        });

        let decoded = decode_sessions(snapshot).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.rejected.len(), 1);
        assert_eq!(decoded.rejected[0].record, "-a");
    }

    #[test]
    fn test_decode_prescriptions_assigns_key() {
        let snapshot = json!({
            "-Rx1": {
                "patientId": "p1",
                "ptId": "t1",
                "exerciseName": "Bridge",
                "sets": "3",
                "reps": "10",
                "holdTime": "5",
                "startDate": "2024-01-01",
                "endDate": "2024-01-14",
                "daysOfWeek": ["Every Monday"],
                "dates": ["2024-01-01", "2024-01-08"]
            },
            "-Rx2": {"patientId": "p1"}
        });

        let decoded = decode_prescriptions(snapshot).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].key.as_deref(), Some("-Rx1"));
        assert_eq!(decoded.records[0].hold_time_seconds, 5);
        assert_eq!(decoded.rejected[0].record, "-Rx2");
    }
}
