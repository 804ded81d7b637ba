// src/models/record.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Room id used when a request does not name one.
pub const DEFAULT_ROOM_ID: &str = "default";

/// The two kinds of record kept per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Quiz,
    Students,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Quiz => "quiz",
            RecordType::Students => "students",
        }
    }

    /// Value returned for a room that has nothing stored yet.
    pub fn empty_value(&self) -> serde_json::Value {
        match self {
            RecordType::Quiz => serde_json::Value::Null,
            RecordType::Students => serde_json::Value::Array(Vec::new()),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(RecordType::Quiz),
            "students" => Ok(RecordType::Students),
            other => Err(format!(
                "Invalid type: {}. Expected 'quiz' or 'students'",
                other
            )),
        }
    }
}

/// Query string of the store endpoint: `?type=quiz&quizId=...`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub quiz_id: Option<String>,
}

impl StoreQuery {
    pub fn room_id(&self) -> &str {
        self.quiz_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_ROOM_ID)
    }
}

/// Body returned by a successful write.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub quiz_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub count: Option<usize>,
}
