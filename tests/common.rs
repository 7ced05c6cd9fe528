#![allow(dead_code)]

use std::{env, fs, path::PathBuf};

use chrono::{DateTime, Utc};
use shiftledger::{AttendanceService, Database};

/// Create a unique test DB path inside the system temp dir and remove any
/// leftover file (WAL sidecars included) from a previous run.
pub fn setup_test_db(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{name}_shiftledger.sqlite"));

    for suffix in ["", "-wal", "-shm"] {
        let mut sidecar = path.clone().into_os_string();
        sidecar.push(suffix);
        let _ = fs::remove_file(PathBuf::from(sidecar));
    }

    path
}

/// Fresh service + store pair for one test.
pub fn service(name: &str) -> (AttendanceService, Database) {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = Database::new(setup_test_db(name)).expect("open test database");
    (AttendanceService::new(db.clone()), db)
}

pub fn at(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("valid RFC3339 instant")
}

/// Seed a shift window the way the external profile service would: through
/// its own connection against the same file. The attendance core only ever
/// reads these rows.
pub fn set_schedule(db: &Database, user_id: &str, check_in: &str, check_out: &str) {
    upsert_schedule(db, user_id, Some(check_in), Some(check_out));
}

pub fn upsert_schedule(
    db: &Database,
    user_id: &str,
    check_in: Option<&str>,
    check_out: Option<&str>,
) {
    let conn = rusqlite::Connection::open(db.path()).expect("open schedule connection");
    conn.execute(
        "INSERT INTO shift_schedules (user_id, check_in_time, check_out_time, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (user_id) DO UPDATE SET
             check_in_time = excluded.check_in_time,
             check_out_time = excluded.check_out_time,
             updated_at = excluded.updated_at",
        rusqlite::params![user_id, check_in, check_out, Utc::now().to_rfc3339()],
    )
    .expect("seed shift schedule");
}
