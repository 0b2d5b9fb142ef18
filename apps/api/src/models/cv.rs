use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an uploaded CV. Stored as text in `cvs.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvStatus {
    Processing,
    Branded,
}

impl CvStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CvStatus::Processing => "Processing",
            CvStatus::Branded => "Branded",
        }
    }
}

impl fmt::Display for CvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CvStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processing" => Ok(CvStatus::Processing),
            "branded" => Ok(CvStatus::Branded),
            other => Err(format!("Unknown CV status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: String,
    /// Object-storage key of the raw upload.
    pub storage_key: String,
    pub status: String,
    /// `StructuredResume` as JSON; `NULL` when extraction or structuring failed.
    pub parsed_data: Option<Value>,
    pub parse_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
