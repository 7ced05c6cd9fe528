//! Per-user-per-day aggregate consumed by reporting dashboards.
//!
//! One row per (user, calendar date), upserted on every attendance
//! transition and never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PresenceStatus {
    LoggedOut,
    LoggedIn,
    OnBreak,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::LoggedOut => "LoggedOut",
            PresenceStatus::LoggedIn => "LoggedIn",
            PresenceStatus::OnBreak => "OnBreak",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRollup {
    pub user_id: String,
    pub calendar_date: NaiveDate,
    /// Mirrors the most recent session/break transition.
    pub status: PresenceStatus,
    pub login_count: i64,
    pub total_break_seconds: u64,
    pub total_session_seconds: u64,
    pub total_worked_seconds: u64,
    pub total_regular_seconds: u64,
    pub total_early_overtime_seconds: u64,
    pub total_late_overtime_seconds: u64,
    pub total_undertime_seconds: u64,
    pub total_overtime_seconds: u64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_logout_at: Option<DateTime<Utc>>,
    pub last_break_start_at: Option<DateTime<Utc>>,
    pub last_break_end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
