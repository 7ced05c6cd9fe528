//! Session ledger: durable create/read/update of session rows.
//!
//! The free functions operate on a borrowed connection so the service can
//! compose them inside one transaction together with rollup updates; the
//! `impl Database` methods are the standalone snapshot reads.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{
        format_date, parse_date, parse_datetime, parse_optional_date, parse_optional_datetime,
        parse_session_status, to_i64, to_u64,
    },
    Database,
};
use crate::models::Session;

const SESSION_COLUMNS: &str = "id, user_id, calendar_date, sequence_number, started_at, ended_at, \
     logout_date, status, break_count, break_seconds, total_seconds, worked_seconds, \
     regular_seconds, early_overtime_seconds, late_overtime_seconds, undertime_seconds, \
     overtime_seconds, created_at, updated_at";

fn row_to_session(row: &Row) -> Result<Session> {
    let calendar_date: String = row.get("calendar_date")?;
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let logout_date: Option<String> = row.get("logout_date")?;
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Session {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        calendar_date: parse_date(&calendar_date, "calendar_date")?,
        sequence_number: row.get("sequence_number")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        logout_date: parse_optional_date(logout_date, "logout_date")?,
        status: parse_session_status(&status)?,
        break_count: row.get("break_count")?,
        break_seconds: to_u64(row.get("break_seconds")?, "break_seconds")?,
        total_seconds: to_u64(row.get("total_seconds")?, "total_seconds")?,
        worked_seconds: to_u64(row.get("worked_seconds")?, "worked_seconds")?,
        regular_seconds: to_u64(row.get("regular_seconds")?, "regular_seconds")?,
        early_overtime_seconds: to_u64(
            row.get("early_overtime_seconds")?,
            "early_overtime_seconds",
        )?,
        late_overtime_seconds: to_u64(row.get("late_overtime_seconds")?, "late_overtime_seconds")?,
        undertime_seconds: to_u64(row.get("undertime_seconds")?, "undertime_seconds")?,
        overtime_seconds: to_u64(row.get("overtime_seconds")?, "overtime_seconds")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

/// The user's ongoing session, if any. The partial unique index guarantees
/// at most one row can match.
pub(crate) fn find_ongoing(conn: &Connection, user_id: &str) -> Result<Option<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = ?1 AND status = 'Ongoing' LIMIT 1"
    ))?;

    let mut rows = stmt.query(params![user_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_session(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn get(conn: &Connection, session_id: &str) -> Result<Session> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
    ))?;

    let mut rows = stmt.query(params![session_id])?;
    match rows.next()? {
        Some(row) => row_to_session(row),
        None => Err(anyhow!("session {session_id} not found")),
    }
}

pub(crate) fn count_for_date(conn: &Connection, user_id: &str, date: NaiveDate) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sessions WHERE user_id = ?1 AND calendar_date = ?2",
        params![user_id, format_date(date)],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub(crate) fn insert(conn: &Connection, session: &Session) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, user_id, calendar_date, sequence_number, started_at, ended_at,
             logout_date, status, break_count, break_seconds, total_seconds, worked_seconds,
             regular_seconds, early_overtime_seconds, late_overtime_seconds, undertime_seconds,
             overtime_seconds, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            session.id,
            session.user_id,
            format_date(session.calendar_date),
            session.sequence_number,
            session.started_at.to_rfc3339(),
            session.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
            session.logout_date.map(format_date),
            session.status.as_str(),
            session.break_count,
            to_i64(session.break_seconds)?,
            to_i64(session.total_seconds)?,
            to_i64(session.worked_seconds)?,
            to_i64(session.regular_seconds)?,
            to_i64(session.early_overtime_seconds)?,
            to_i64(session.late_overtime_seconds)?,
            to_i64(session.undertime_seconds)?,
            to_i64(session.overtime_seconds)?,
            session.created_at.to_rfc3339(),
            session.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Persist the closed session with all of its derived buckets.
pub(crate) fn finalize(conn: &Connection, session: &Session) -> Result<()> {
    let ended_at = session
        .ended_at
        .ok_or_else(|| anyhow!("finalize called on a session without ended_at"))?;

    conn.execute(
        "UPDATE sessions
         SET ended_at = ?1,
             logout_date = ?2,
             status = ?3,
             total_seconds = ?4,
             worked_seconds = ?5,
             regular_seconds = ?6,
             early_overtime_seconds = ?7,
             late_overtime_seconds = ?8,
             undertime_seconds = ?9,
             overtime_seconds = ?10,
             updated_at = ?11
         WHERE id = ?12",
        params![
            ended_at.to_rfc3339(),
            session.logout_date.map(format_date),
            session.status.as_str(),
            to_i64(session.total_seconds)?,
            to_i64(session.worked_seconds)?,
            to_i64(session.regular_seconds)?,
            to_i64(session.early_overtime_seconds)?,
            to_i64(session.late_overtime_seconds)?,
            to_i64(session.undertime_seconds)?,
            to_i64(session.overtime_seconds)?,
            session.updated_at.to_rfc3339(),
            session.id,
        ],
    )?;
    Ok(())
}

/// Completed sessions for one business date, in sequence order.
pub(crate) fn completed_for_date(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions
         WHERE user_id = ?1 AND calendar_date = ?2 AND status = 'Completed'
         ORDER BY sequence_number ASC"
    ))?;

    let mut rows = stmt.query(params![user_id, format_date(date)])?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next()? {
        sessions.push(row_to_session(row)?);
    }

    Ok(sessions)
}

/// Fold a completed break into its parent session.
pub(crate) fn apply_break(
    conn: &Connection,
    session_id: &str,
    duration_seconds: u64,
    now: DateTime<Utc>,
) -> Result<()> {
    let rows_affected = conn.execute(
        "UPDATE sessions
         SET break_count = break_count + 1,
             break_seconds = break_seconds + ?1,
             updated_at = ?2
         WHERE id = ?3",
        params![to_i64(duration_seconds)?, now.to_rfc3339(), session_id],
    )?;

    if rows_affected == 0 {
        return Err(anyhow!("session {session_id} not found"));
    }

    Ok(())
}

impl Database {
    pub async fn ongoing_session_for(&self, user_id: &str) -> Result<Option<Session>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| find_ongoing(conn, &user_id)).await
    }

    pub async fn completed_sessions_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Session>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| completed_for_date(conn, &user_id, date))
            .await
    }

    /// The day's full activity list, ongoing session included.
    pub async fn sessions_for_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Session>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ?1 AND calendar_date = ?2
                 ORDER BY sequence_number ASC"
            ))?;

            let mut rows = stmt.query(params![user_id, format_date(date)])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }

            Ok(sessions)
        })
        .await
    }
}
