//! Break data model: a pause nested inside exactly one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_BREAK_REASON: &str = "Personal";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BreakStatus {
    Active,
    Completed,
}

impl BreakStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakStatus::Active => "Active",
            BreakStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    pub id: String,
    pub session_id: String,
    /// Denormalized owner id so the active-break lookup never joins.
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: BreakStatus,
    /// Whole seconds, set on close.
    pub duration_seconds: Option<u64>,
    pub reason: String,
    pub notes: Option<String>,
}

impl Break {
    pub fn open(
        session_id: String,
        user_id: String,
        now: DateTime<Utc>,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            user_id,
            started_at: now,
            ended_at: None,
            status: BreakStatus::Active,
            duration_seconds: None,
            reason: reason.unwrap_or_else(|| DEFAULT_BREAK_REASON.to_string()),
            notes,
        }
    }

    pub fn close(mut self, now: DateTime<Utc>, duration_seconds: u64) -> Self {
        self.ended_at = Some(now);
        self.status = BreakStatus::Completed;
        self.duration_seconds = Some(duration_seconds);
        self
    }
}
