//! Attendance state machine: the five operations external callers touch.
//!
//! Per user the machine is `NoSession -> SessionOpen -> NoSession`, with a
//! nested `NoBreak -> BreakOpen -> NoBreak` valid only while a session is
//! open. Every mutating operation executes its precondition check and its
//! writes as one transaction on the database worker thread, so two
//! concurrent calls for the same user resolve to exactly one winner; the
//! partial unique indexes back the same invariants at the schema level.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::repositories::{breaks, rollups, schedules, sessions};
use crate::db::Database;
use crate::models::{Break, Session};

use super::error::AttendanceError;
use super::overtime;

pub type Result<T> = std::result::Result<T, AttendanceError>;

/// Derived breakdown returned when a session closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClosure {
    pub session_id: String,
    pub total_seconds: u64,
    pub break_seconds: u64,
    pub worked_seconds: u64,
    pub regular_seconds: u64,
    pub early_overtime_seconds: u64,
    pub late_overtime_seconds: u64,
    pub undertime_seconds: u64,
    pub overtime_seconds: u64,
}

impl From<Session> for SessionClosure {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            total_seconds: session.total_seconds,
            break_seconds: session.break_seconds,
            worked_seconds: session.worked_seconds,
            regular_seconds: session.regular_seconds,
            early_overtime_seconds: session.early_overtime_seconds,
            late_overtime_seconds: session.late_overtime_seconds,
            undertime_seconds: session.undertime_seconds,
            overtime_seconds: session.overtime_seconds,
        }
    }
}

/// Read-only probe result. Absence of state is `None`/empty, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSnapshot {
    pub session: Option<Session>,
    pub active_break: Option<Break>,
    pub completed_today: Vec<Session>,
}

#[derive(Clone)]
pub struct AttendanceService {
    db: Database,
}

impl AttendanceService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn start_session(&self, user_id: &str) -> Result<Session> {
        self.start_session_at(user_id, Utc::now()).await
    }

    /// Open a new session. "Now" is sampled exactly once per operation; the
    /// `_at` variants take that instant explicitly for callers with their
    /// own clock.
    pub async fn start_session_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Session> {
        let user = user_id.to_string();
        let session = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;

                if let Some(open) = sessions::find_ongoing(&tx, &user)? {
                    return Err(AttendanceError::SessionAlreadyActive {
                        existing_session_id: open.id,
                    }
                    .into());
                }

                let calendar_date = now.date_naive();
                let sequence_number = 1 + sessions::count_for_date(&tx, &user, calendar_date)?;
                let session = Session::open(user.clone(), calendar_date, sequence_number, now);

                sessions::insert(&tx, &session)?;
                rollups::record_login(&tx, &user, calendar_date, now)?;

                tx.commit()?;
                Ok(session)
            })
            .await
            .map_err(AttendanceError::from_db)?;

        info!(
            "user {} opened session {} (#{} for {})",
            session.user_id, session.id, session.sequence_number, session.calendar_date
        );

        Ok(session)
    }

    pub async fn end_session(&self, user_id: &str) -> Result<SessionClosure> {
        self.end_session_at(user_id, Utc::now()).await
    }

    /// Close the ongoing session and derive its work-time buckets. An
    /// active break is left untouched; ending it later still folds its
    /// duration into the completed row, but the buckets derived here are
    /// not recomputed.
    pub async fn end_session_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClosure> {
        let user = user_id.to_string();
        let closed = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;

                let Some(open) = sessions::find_ongoing(&tx, &user)? else {
                    return Err(AttendanceError::NoActiveSession.into());
                };

                let total_seconds = (now - open.started_at).num_seconds().max(0) as u64;
                let worked_seconds = total_seconds.saturating_sub(open.break_seconds);

                let schedule = schedules::load(&tx, &user)?;
                let breakdown =
                    overtime::categorize(open.started_at, now, schedule.as_ref(), worked_seconds);

                let original_date = open.calendar_date;
                let closed = open.close(now, total_seconds, worked_seconds, &breakdown);

                sessions::finalize(&tx, &closed)?;
                rollups::record_logout(&tx, &user, original_date, now, &closed)?;

                tx.commit()?;
                Ok(closed)
            })
            .await
            .map_err(AttendanceError::from_db)?;

        info!(
            "user {} closed session {} (worked {}s, overtime {}s, undertime {}s)",
            closed.user_id,
            closed.id,
            closed.worked_seconds,
            closed.overtime_seconds,
            closed.undertime_seconds
        );

        Ok(SessionClosure::from(closed))
    }

    pub async fn start_break(
        &self,
        user_id: &str,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<Break> {
        self.start_break_at(user_id, reason, notes, Utc::now())
            .await
    }

    pub async fn start_break_at(
        &self,
        user_id: &str,
        reason: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Break> {
        let user = user_id.to_string();
        let brk = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;

                let Some(open) = sessions::find_ongoing(&tx, &user)? else {
                    return Err(AttendanceError::NoActiveSession.into());
                };

                if let Some(active) = breaks::find_active(&tx, &user)? {
                    return Err(AttendanceError::BreakAlreadyActive {
                        existing_break_id: active.id,
                    }
                    .into());
                }

                let brk = Break::open(open.id.clone(), user.clone(), now, reason, notes);

                breaks::insert(&tx, &brk)?;
                rollups::record_break_start(&tx, &user, open.calendar_date, now)?;

                tx.commit()?;
                Ok(brk)
            })
            .await
            .map_err(AttendanceError::from_db)?;

        info!(
            "user {} started break {} under session {}",
            brk.user_id, brk.id, brk.session_id
        );

        Ok(brk)
    }

    pub async fn end_break(&self, user_id: &str) -> Result<Break> {
        self.end_break_at(user_id, Utc::now()).await
    }

    pub async fn end_break_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Break> {
        let user = user_id.to_string();
        let brk = self
            .db
            .execute(move |conn| {
                let tx = conn.transaction()?;

                let Some(active) = breaks::find_active(&tx, &user)? else {
                    return Err(AttendanceError::NoActiveBreak.into());
                };

                let duration_seconds = (now - active.started_at).num_seconds().max(0) as u64;
                let parent = sessions::get(&tx, &active.session_id)?;
                let completed = active.close(now, duration_seconds);

                breaks::finalize(&tx, &completed)?;
                sessions::apply_break(&tx, &completed.session_id, duration_seconds, now)?;
                rollups::record_break_end(&tx, &user, parent.calendar_date, now, duration_seconds)?;

                tx.commit()?;
                Ok(completed)
            })
            .await
            .map_err(AttendanceError::from_db)?;

        info!(
            "user {} ended break {} ({}s)",
            brk.user_id,
            brk.id,
            brk.duration_seconds.unwrap_or(0)
        );

        Ok(brk)
    }

    pub async fn get_status(&self, user_id: &str) -> Result<AttendanceSnapshot> {
        self.get_status_at(user_id, Utc::now()).await
    }

    /// Snapshot read: never mutates, never blocks on a transition, and may
    /// observe a stale-but-consistent state.
    pub async fn get_status_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceSnapshot> {
        let user = user_id.to_string();
        let today = now.date_naive();
        self.db
            .execute(move |conn| {
                Ok(AttendanceSnapshot {
                    session: sessions::find_ongoing(conn, &user)?,
                    active_break: breaks::find_active(conn, &user)?,
                    completed_today: sessions::completed_for_date(conn, &user, today)?,
                })
            })
            .await
            .map_err(AttendanceError::from_db)
    }
}
