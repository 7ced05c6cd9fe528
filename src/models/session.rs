//! Work session data model.
//!
//! A session is one continuous login-to-logout work period for a user.
//! Rows are append-only: sessions are opened, closed, and never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::overtime::ShiftBreakdown;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Ongoing,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Ongoing => "Ongoing",
            SessionStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    /// Business date the session belongs to. Assigned at creation and kept
    /// stable even when the session runs past midnight.
    pub calendar_date: NaiveDate,
    /// 1-based ordinal among the user's sessions for `calendar_date`.
    pub sequence_number: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Date at which the session was closed; differs from `calendar_date`
    /// when the session spans midnight.
    pub logout_date: Option<NaiveDate>,
    pub status: SessionStatus,
    pub break_count: i64,
    /// Sum of durations of all breaks completed under this session.
    pub break_seconds: u64,
    pub total_seconds: u64,
    pub worked_seconds: u64,
    pub regular_seconds: u64,
    pub early_overtime_seconds: u64,
    pub late_overtime_seconds: u64,
    pub undertime_seconds: u64,
    pub overtime_seconds: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a new ongoing session. Derived buckets stay zero until close.
    pub fn open(
        user_id: String,
        calendar_date: NaiveDate,
        sequence_number: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            calendar_date,
            sequence_number,
            started_at: now,
            ended_at: None,
            logout_date: None,
            status: SessionStatus::Ongoing,
            break_count: 0,
            break_seconds: 0,
            total_seconds: 0,
            worked_seconds: 0,
            regular_seconds: 0,
            early_overtime_seconds: 0,
            late_overtime_seconds: 0,
            undertime_seconds: 0,
            overtime_seconds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Close the session, filling in every derived bucket.
    pub fn close(
        mut self,
        now: DateTime<Utc>,
        total_seconds: u64,
        worked_seconds: u64,
        breakdown: &ShiftBreakdown,
    ) -> Self {
        self.ended_at = Some(now);
        self.logout_date = Some(now.date_naive());
        self.status = SessionStatus::Completed;
        self.total_seconds = total_seconds;
        self.worked_seconds = worked_seconds;
        self.regular_seconds = breakdown.regular_seconds;
        self.early_overtime_seconds = breakdown.early_overtime_seconds;
        self.late_overtime_seconds = breakdown.late_overtime_seconds;
        self.undertime_seconds = breakdown.undertime_seconds;
        self.overtime_seconds = breakdown.overtime_seconds;
        self.updated_at = now;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let now = "2025-09-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let session = Session::open("u-1".into(), now.date_naive(), 1, now);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["sequenceNumber"], 1);
        assert_eq!(json["status"], "ongoing");
        assert!(json["endedAt"].is_null());
    }
}
