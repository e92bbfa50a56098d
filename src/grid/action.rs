// src/grid/action.rs
//! Row records and the payloads grid cell controls emit to their host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column carrying the job identifier in every grid row
pub const JOB_ID_FIELD: &str = "Job Id";

/// Column id sent with a details request
pub const DETAILS_COLUMN: &str = "details";

/// The data backing one grid row: column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord(Map<String, Value>);

impl RowRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Job identifier as it would be interpolated into a URL.
    ///
    /// A missing or null identifier yields an empty string; numbers and other
    /// non-string values are rendered as their JSON text.
    pub fn job_id(&self) -> String {
        match self.0.get(JOB_ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for RowRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// User intent relayed from a grid cell to the hosting page.
///
/// Serialized in the two shapes the host consumes:
/// `{"jobId", "timestamp"}` and `{"colId": "details", "data", "timestamp"}`.
/// Timestamps are milliseconds since the epoch and let the host tell
/// repeated identical actions apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WirePayload", try_from = "WirePayload")]
pub enum GridAction {
    Navigate { job_id: String, timestamp: i64 },
    ShowDetails { row: RowRecord, timestamp: i64 },
}

impl GridAction {
    pub fn timestamp(&self) -> i64 {
        match self {
            GridAction::Navigate { timestamp, .. } | GridAction::ShowDetails { timestamp, .. } => {
                *timestamp
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GridAction::Navigate { .. } => "navigate",
            GridAction::ShowDetails { .. } => "show_details",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Navigate {
        #[serde(rename = "jobId")]
        job_id: String,
        timestamp: i64,
    },
    Column {
        #[serde(rename = "colId")]
        col_id: String,
        data: RowRecord,
        timestamp: i64,
    },
}

impl From<GridAction> for WirePayload {
    fn from(action: GridAction) -> Self {
        match action {
            GridAction::Navigate { job_id, timestamp } => WirePayload::Navigate { job_id, timestamp },
            GridAction::ShowDetails { row, timestamp } => WirePayload::Column {
                col_id: DETAILS_COLUMN.to_string(),
                data: row,
                timestamp,
            },
        }
    }
}

impl TryFrom<WirePayload> for GridAction {
    type Error = String;

    fn try_from(payload: WirePayload) -> Result<Self, Self::Error> {
        match payload {
            WirePayload::Navigate { job_id, timestamp } => {
                Ok(GridAction::Navigate { job_id, timestamp })
            }
            WirePayload::Column {
                col_id,
                data,
                timestamp,
            } if col_id == DETAILS_COLUMN => Ok(GridAction::ShowDetails {
                row: data,
                timestamp,
            }),
            WirePayload::Column { col_id, .. } => {
                Err(format!("unsupported column action: {}", col_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn navigate_serializes_to_job_id_shape() {
        let action = GridAction::Navigate {
            job_id: "12345".to_string(),
            timestamp: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"jobId": "12345", "timestamp": 1_700_000_000_000i64})
        );
    }

    #[test]
    fn show_details_serializes_with_details_column() {
        let row = RowRecord::new()
            .with("Job Id", "999")
            .with("Title", "Engineer");
        let action = GridAction::ShowDetails {
            row,
            timestamp: 42,
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "colId": "details",
                "data": {"Job Id": "999", "Title": "Engineer"},
                "timestamp": 42
            })
        );
    }

    #[test]
    fn payloads_are_told_apart_by_shape() {
        let navigate: GridAction =
            serde_json::from_value(json!({"jobId": "1", "timestamp": 5})).unwrap();
        assert_eq!(navigate.kind(), "navigate");

        let details: GridAction = serde_json::from_value(
            json!({"colId": "details", "data": {"Job Id": "1"}, "timestamp": 6}),
        )
        .unwrap();
        assert_eq!(details.kind(), "show_details");
        assert_eq!(details.timestamp(), 6);
    }

    #[test]
    fn unknown_column_payload_is_rejected() {
        let result: Result<GridAction, _> =
            serde_json::from_value(json!({"colId": "salary", "data": {}, "timestamp": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn job_id_rendering_is_permissive() {
        assert_eq!(RowRecord::new().with("Job Id", "77").job_id(), "77");
        assert_eq!(RowRecord::new().with("Job Id", 77).job_id(), "77");
        assert_eq!(RowRecord::new().with("Title", "x").job_id(), "");
        assert_eq!(RowRecord::new().with("Job Id", Value::Null).job_id(), "");
    }
}
