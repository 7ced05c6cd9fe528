//! Schedule resolver: read-only access to configured shift windows.
//!
//! Schedule rows belong to the external profile service; this core never
//! writes them. Either boundary missing means "unconfigured", and the
//! overtime calculator then treats all worked time as regular shift time.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::db::{helpers::parse_time_of_day, Database};
use crate::models::ShiftSchedule;

pub(crate) fn load(conn: &Connection, user_id: &str) -> Result<Option<ShiftSchedule>> {
    let mut stmt = conn.prepare(
        "SELECT check_in_time, check_out_time FROM shift_schedules WHERE user_id = ?1",
    )?;

    let mut rows = stmt.query(params![user_id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let check_in: Option<String> = row.get(0)?;
    let check_out: Option<String> = row.get(1)?;

    match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => Ok(Some(ShiftSchedule::new(
            parse_time_of_day(&check_in, "check_in_time")?,
            parse_time_of_day(&check_out, "check_out_time")?,
        ))),
        _ => Ok(None),
    }
}

impl Database {
    pub async fn shift_schedule_for(&self, user_id: &str) -> Result<Option<ShiftSchedule>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| load(conn, &user_id)).await
    }
}
