//! Daily rollup upserts, one per attendance transition.
//!
//! Each function runs inside the same transaction as the state change that
//! triggers it, so the rollup can never drift from the activity log.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{
        format_date, parse_date, parse_datetime, parse_optional_datetime, parse_presence_status,
        to_i64, to_u64,
    },
    Database,
};
use crate::models::{DailyRollup, Session};

fn row_to_rollup(row: &Row) -> Result<DailyRollup> {
    let calendar_date: String = row.get("calendar_date")?;
    let status: String = row.get("status")?;
    let last_login_at: Option<String> = row.get("last_login_at")?;
    let last_logout_at: Option<String> = row.get("last_logout_at")?;
    let last_break_start_at: Option<String> = row.get("last_break_start_at")?;
    let last_break_end_at: Option<String> = row.get("last_break_end_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(DailyRollup {
        user_id: row.get("user_id")?,
        calendar_date: parse_date(&calendar_date, "calendar_date")?,
        status: parse_presence_status(&status)?,
        login_count: row.get("login_count")?,
        total_break_seconds: to_u64(row.get("total_break_seconds")?, "total_break_seconds")?,
        total_session_seconds: to_u64(
            row.get("total_session_seconds")?,
            "total_session_seconds",
        )?,
        total_worked_seconds: to_u64(row.get("total_worked_seconds")?, "total_worked_seconds")?,
        total_regular_seconds: to_u64(
            row.get("total_regular_seconds")?,
            "total_regular_seconds",
        )?,
        total_early_overtime_seconds: to_u64(
            row.get("total_early_overtime_seconds")?,
            "total_early_overtime_seconds",
        )?,
        total_late_overtime_seconds: to_u64(
            row.get("total_late_overtime_seconds")?,
            "total_late_overtime_seconds",
        )?,
        total_undertime_seconds: to_u64(
            row.get("total_undertime_seconds")?,
            "total_undertime_seconds",
        )?,
        total_overtime_seconds: to_u64(
            row.get("total_overtime_seconds")?,
            "total_overtime_seconds",
        )?,
        last_login_at: parse_optional_datetime(last_login_at, "last_login_at")?,
        last_logout_at: parse_optional_datetime(last_logout_at, "last_logout_at")?,
        last_break_start_at: parse_optional_datetime(last_break_start_at, "last_break_start_at")?,
        last_break_end_at: parse_optional_datetime(last_break_end_at, "last_break_end_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

/// New session opened: create the day's row if absent, count the login.
pub(crate) fn record_login(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_rollups (user_id, calendar_date, status, login_count,
             last_login_at, created_at, updated_at)
         VALUES (?1, ?2, 'LoggedIn', 1, ?3, ?3, ?3)
         ON CONFLICT (user_id, calendar_date) DO UPDATE SET
             status = excluded.status,
             login_count = login_count + 1,
             last_login_at = excluded.last_login_at,
             updated_at = excluded.updated_at",
        params![user_id, format_date(date), now.to_rfc3339()],
    )?;
    Ok(())
}

/// Session closed: fold the session's derived buckets into the cumulative
/// counters of its original calendar date.
pub(crate) fn record_logout(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
    session: &Session,
) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_rollups (user_id, calendar_date, status, total_session_seconds,
             total_worked_seconds, total_regular_seconds, total_early_overtime_seconds,
             total_late_overtime_seconds, total_undertime_seconds, total_overtime_seconds,
             last_logout_at, created_at, updated_at)
         VALUES (?1, ?2, 'LoggedOut', ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?10)
         ON CONFLICT (user_id, calendar_date) DO UPDATE SET
             status = excluded.status,
             total_session_seconds = total_session_seconds + excluded.total_session_seconds,
             total_worked_seconds = total_worked_seconds + excluded.total_worked_seconds,
             total_regular_seconds = total_regular_seconds + excluded.total_regular_seconds,
             total_early_overtime_seconds
                 = total_early_overtime_seconds + excluded.total_early_overtime_seconds,
             total_late_overtime_seconds
                 = total_late_overtime_seconds + excluded.total_late_overtime_seconds,
             total_undertime_seconds = total_undertime_seconds + excluded.total_undertime_seconds,
             total_overtime_seconds = total_overtime_seconds + excluded.total_overtime_seconds,
             last_logout_at = excluded.last_logout_at,
             updated_at = excluded.updated_at",
        params![
            user_id,
            format_date(date),
            to_i64(session.total_seconds)?,
            to_i64(session.worked_seconds)?,
            to_i64(session.regular_seconds)?,
            to_i64(session.early_overtime_seconds)?,
            to_i64(session.late_overtime_seconds)?,
            to_i64(session.undertime_seconds)?,
            to_i64(session.overtime_seconds)?,
            now.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(crate) fn record_break_start(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_rollups (user_id, calendar_date, status, last_break_start_at,
             created_at, updated_at)
         VALUES (?1, ?2, 'OnBreak', ?3, ?3, ?3)
         ON CONFLICT (user_id, calendar_date) DO UPDATE SET
             status = excluded.status,
             last_break_start_at = excluded.last_break_start_at,
             updated_at = excluded.updated_at",
        params![user_id, format_date(date), now.to_rfc3339()],
    )?;
    Ok(())
}

pub(crate) fn record_break_end(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
    duration_seconds: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_rollups (user_id, calendar_date, status, total_break_seconds,
             last_break_end_at, created_at, updated_at)
         VALUES (?1, ?2, 'LoggedIn', ?3, ?4, ?4, ?4)
         ON CONFLICT (user_id, calendar_date) DO UPDATE SET
             status = excluded.status,
             total_break_seconds = total_break_seconds + excluded.total_break_seconds,
             last_break_end_at = excluded.last_break_end_at,
             updated_at = excluded.updated_at",
        params![
            user_id,
            format_date(date),
            to_i64(duration_seconds)?,
            now.to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl Database {
    /// The rollup row consumed by reporting dashboards.
    pub async fn daily_rollup(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyRollup>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, calendar_date, status, login_count, total_break_seconds,
                     total_session_seconds, total_worked_seconds, total_regular_seconds,
                     total_early_overtime_seconds, total_late_overtime_seconds,
                     total_undertime_seconds, total_overtime_seconds, last_login_at,
                     last_logout_at, last_break_start_at, last_break_end_at, created_at,
                     updated_at
                 FROM daily_rollups
                 WHERE user_id = ?1 AND calendar_date = ?2",
            )?;

            let mut rows = stmt.query(params![user_id, format_date(date)])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_rollup(row)?)),
                None => Ok(None),
            }
        })
        .await
    }
}
