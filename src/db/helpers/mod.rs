use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::{BreakStatus, PresenceStatus, SessionStatus};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        Some(raw) => parse_date(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_time_of_day(value: &str, field: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_session_status(value: &str) -> Result<SessionStatus> {
    match value {
        "Ongoing" => Ok(SessionStatus::Ongoing),
        "Completed" => Ok(SessionStatus::Completed),
        other => Err(anyhow!("unknown session status {other}")),
    }
}

pub fn parse_break_status(value: &str) -> Result<BreakStatus> {
    match value {
        "Active" => Ok(BreakStatus::Active),
        "Completed" => Ok(BreakStatus::Completed),
        other => Err(anyhow!("unknown break status {other}")),
    }
}

pub fn parse_presence_status(value: &str) -> Result<PresenceStatus> {
    match value {
        "LoggedOut" => Ok(PresenceStatus::LoggedOut),
        "LoggedIn" => Ok(PresenceStatus::LoggedIn),
        "OnBreak" => Ok(PresenceStatus::OnBreak),
        other => Err(anyhow!("unknown presence status {other}")),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
