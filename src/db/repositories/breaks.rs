//! Break ledger: lifecycle rows for pauses nested inside a session.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use crate::db::{
    helpers::{parse_break_status, parse_datetime, parse_optional_datetime, to_i64, to_u64},
    Database,
};
use crate::models::Break;

const BREAK_COLUMNS: &str =
    "id, session_id, user_id, started_at, ended_at, status, duration_seconds, reason, notes";

fn row_to_break(row: &Row) -> Result<Break> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let status: String = row.get("status")?;
    let duration_seconds: Option<i64> = row.get("duration_seconds")?;

    Ok(Break {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        user_id: row.get("user_id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        status: parse_break_status(&status)?,
        duration_seconds: duration_seconds
            .map(|secs| to_u64(secs, "duration_seconds"))
            .transpose()?,
        reason: row.get("reason")?,
        notes: row.get("notes")?,
    })
}

/// The user's active break, if any. The partial unique index guarantees at
/// most one row can match.
pub(crate) fn find_active(conn: &Connection, user_id: &str) -> Result<Option<Break>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BREAK_COLUMNS} FROM breaks WHERE user_id = ?1 AND status = 'Active' LIMIT 1"
    ))?;

    let mut rows = stmt.query(params![user_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_break(row)?)),
        None => Ok(None),
    }
}

pub(crate) fn insert(conn: &Connection, brk: &Break) -> Result<()> {
    conn.execute(
        "INSERT INTO breaks (id, session_id, user_id, started_at, ended_at, status,
             duration_seconds, reason, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            brk.id,
            brk.session_id,
            brk.user_id,
            brk.started_at.to_rfc3339(),
            brk.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
            brk.status.as_str(),
            brk.duration_seconds.map(to_i64).transpose()?,
            brk.reason,
            brk.notes,
        ],
    )?;
    Ok(())
}

pub(crate) fn finalize(conn: &Connection, brk: &Break) -> Result<()> {
    conn.execute(
        "UPDATE breaks
         SET ended_at = ?1,
             status = ?2,
             duration_seconds = ?3
         WHERE id = ?4",
        params![
            brk.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
            brk.status.as_str(),
            brk.duration_seconds.map(to_i64).transpose()?,
            brk.id,
        ],
    )?;
    Ok(())
}

impl Database {
    pub async fn active_break_for(&self, user_id: &str) -> Result<Option<Break>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| find_active(conn, &user_id)).await
    }

    pub async fn breaks_for_session(&self, session_id: &str) -> Result<Vec<Break>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BREAK_COLUMNS} FROM breaks
                 WHERE session_id = ?1
                 ORDER BY started_at ASC"
            ))?;

            let mut rows = stmt.query(params![session_id])?;
            let mut breaks = Vec::new();
            while let Some(row) = rows.next()? {
                breaks.push(row_to_break(row)?);
            }

            Ok(breaks)
        })
        .await
    }
}
