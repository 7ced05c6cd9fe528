use shiftledger::{AttendanceError, BreakStatus, PresenceStatus, SessionStatus};

mod common;
use common::{at, service, set_schedule, upsert_schedule};

const USER: &str = "user-1";

#[tokio::test]
async fn full_day_without_schedule() {
    let (svc, db) = service("full_day_without_schedule");

    let session = svc
        .start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    assert_eq!(session.status, SessionStatus::Ongoing);
    assert_eq!(session.sequence_number, 1);

    let brk = svc
        .start_break_at(USER, None, None, at("2025-09-01T10:00:00Z"))
        .await
        .unwrap();
    assert_eq!(brk.reason, "Personal");
    assert_eq!(brk.session_id, session.id);

    let brk = svc
        .end_break_at(USER, at("2025-09-01T10:15:00Z"))
        .await
        .unwrap();
    assert_eq!(brk.status, BreakStatus::Completed);
    assert_eq!(brk.duration_seconds, Some(900));

    let closure = svc
        .end_session_at(USER, at("2025-09-01T12:00:00Z"))
        .await
        .unwrap();
    assert_eq!(closure.session_id, session.id);
    assert_eq!(closure.total_seconds, 10_800);
    assert_eq!(closure.break_seconds, 900);
    assert_eq!(closure.worked_seconds, 9_900);
    assert_eq!(closure.regular_seconds, 9_900);
    assert_eq!(closure.early_overtime_seconds, 0);
    assert_eq!(closure.late_overtime_seconds, 0);
    assert_eq!(closure.undertime_seconds, 0);
    assert_eq!(closure.overtime_seconds, 0);

    let rollup = db
        .daily_rollup(USER, at("2025-09-01T12:00:00Z").date_naive())
        .await
        .unwrap()
        .expect("rollup row exists");
    assert_eq!(rollup.status, PresenceStatus::LoggedOut);
    assert_eq!(rollup.login_count, 1);
    assert_eq!(rollup.total_break_seconds, 900);
    assert_eq!(rollup.total_session_seconds, 10_800);
    assert_eq!(rollup.total_worked_seconds, 9_900);
    assert_eq!(rollup.total_regular_seconds, 9_900);
    assert_eq!(rollup.total_overtime_seconds, 0);
    assert_eq!(rollup.last_login_at, Some(at("2025-09-01T09:00:00Z")));
    assert_eq!(rollup.last_logout_at, Some(at("2025-09-01T12:00:00Z")));
    assert_eq!(rollup.last_break_end_at, Some(at("2025-09-01T10:15:00Z")));
}

#[tokio::test]
async fn overtime_buckets_derive_from_schedule() {
    let (svc, db) = service("overtime_buckets_derive_from_schedule");
    set_schedule(&db, USER, "09:00:00", "17:00:00");

    let resolved = db
        .shift_schedule_for(USER)
        .await
        .unwrap()
        .expect("schedule resolves");
    assert_eq!(resolved.shift_seconds(), 28_800);

    svc.start_session_at(USER, at("2025-09-01T08:30:00Z"))
        .await
        .unwrap();
    let closure = svc
        .end_session_at(USER, at("2025-09-01T17:00:00Z"))
        .await
        .unwrap();

    assert_eq!(closure.worked_seconds, 30_600);
    assert_eq!(closure.early_overtime_seconds, 1_800);
    assert_eq!(closure.late_overtime_seconds, 0);
    assert_eq!(closure.regular_seconds, 28_800);
    assert_eq!(closure.undertime_seconds, 0);
    assert_eq!(closure.overtime_seconds, 1_800);

    let rollup = db
        .daily_rollup(USER, at("2025-09-01T17:00:00Z").date_naive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rollup.total_early_overtime_seconds, 1_800);
    assert_eq!(rollup.total_regular_seconds, 28_800);
}

#[tokio::test]
async fn partial_schedule_counts_as_unconfigured() {
    let (svc, db) = service("partial_schedule_counts_as_unconfigured");
    upsert_schedule(&db, USER, Some("09:00:00"), None);

    svc.start_session_at(USER, at("2025-09-01T08:00:00Z"))
        .await
        .unwrap();
    let closure = svc
        .end_session_at(USER, at("2025-09-01T12:00:00Z"))
        .await
        .unwrap();

    assert_eq!(closure.regular_seconds, 14_400);
    assert_eq!(closure.early_overtime_seconds, 0);
    assert_eq!(closure.undertime_seconds, 0);
}

#[tokio::test]
async fn second_start_conflicts_with_existing_session() {
    let (svc, _db) = service("second_start_conflicts_with_existing_session");

    let first = svc
        .start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();

    let err = svc
        .start_session_at(USER, at("2025-09-01T09:05:00Z"))
        .await
        .unwrap_err();
    match err {
        AttendanceError::SessionAlreadyActive {
            existing_session_id,
        } => assert_eq!(existing_session_id, first.id),
        other => panic!("expected session conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_starts_yield_one_winner() {
    let (svc, _db) = service("concurrent_starts_yield_one_winner");
    let now = at("2025-09-01T09:00:00Z");

    let (a, b) = tokio::join!(
        svc.start_session_at(USER, now),
        svc.start_session_at(USER, now)
    );

    let (winner, loser) = match (a, b) {
        (Ok(session), Err(err)) => (session, err),
        (Err(err), Ok(session)) => (session, err),
        (Ok(_), Ok(_)) => panic!("both concurrent starts succeeded"),
        (Err(_), Err(_)) => panic!("both concurrent starts failed"),
    };

    match loser {
        AttendanceError::SessionAlreadyActive {
            existing_session_id,
        } => assert_eq!(existing_session_id, winner.id),
        other => panic!("expected session conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn end_without_session_is_not_found() {
    let (svc, _db) = service("end_without_session_is_not_found");

    let err = svc
        .end_session_at(USER, at("2025-09-01T17:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::NoActiveSession));
}

#[tokio::test]
async fn break_requires_open_session() {
    let (svc, _db) = service("break_requires_open_session");

    let err = svc
        .start_break_at(USER, None, None, at("2025-09-01T10:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::NoActiveSession));

    let err = svc
        .end_break_at(USER, at("2025-09-01T10:05:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::NoActiveBreak));
}

#[tokio::test]
async fn second_break_conflicts_with_active_break() {
    let (svc, _db) = service("second_break_conflicts_with_active_break");

    svc.start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    let first = svc
        .start_break_at(
            USER,
            Some("Coffee".to_string()),
            None,
            at("2025-09-01T10:00:00Z"),
        )
        .await
        .unwrap();
    assert_eq!(first.reason, "Coffee");

    let err = svc
        .start_break_at(USER, None, None, at("2025-09-01T10:01:00Z"))
        .await
        .unwrap_err();
    match err {
        AttendanceError::BreakAlreadyActive { existing_break_id } => {
            assert_eq!(existing_break_id, first.id)
        }
        other => panic!("expected break conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn sequence_numbers_are_dense_per_day() {
    let (svc, db) = service("sequence_numbers_are_dense_per_day");

    for (start, end) in [
        ("2025-09-01T08:00:00Z", "2025-09-01T10:00:00Z"),
        ("2025-09-01T11:00:00Z", "2025-09-01T13:00:00Z"),
        ("2025-09-01T14:00:00Z", "2025-09-01T16:00:00Z"),
    ] {
        svc.start_session_at(USER, at(start)).await.unwrap();
        svc.end_session_at(USER, at(end)).await.unwrap();
    }

    let snapshot = svc
        .get_status_at(USER, at("2025-09-01T17:00:00Z"))
        .await
        .unwrap();
    assert!(snapshot.session.is_none());
    let sequences: Vec<i64> = snapshot
        .completed_today
        .iter()
        .map(|s| s.sequence_number)
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);

    // A new day restarts numbering.
    let next_day = svc
        .start_session_at(USER, at("2025-09-02T08:00:00Z"))
        .await
        .unwrap();
    assert_eq!(next_day.sequence_number, 1);

    let day_two = db
        .sessions_for_date(USER, at("2025-09-02T08:00:00Z").date_naive())
        .await
        .unwrap();
    assert_eq!(day_two.len(), 1);
    assert_eq!(day_two[0].status, SessionStatus::Ongoing);
}

#[tokio::test]
async fn rollup_accumulates_across_sessions() {
    let (svc, db) = service("rollup_accumulates_across_sessions");

    svc.start_session_at(USER, at("2025-09-01T08:00:00Z"))
        .await
        .unwrap();
    svc.end_session_at(USER, at("2025-09-01T10:00:00Z"))
        .await
        .unwrap();

    svc.start_session_at(USER, at("2025-09-01T11:00:00Z"))
        .await
        .unwrap();
    svc.start_break_at(USER, None, None, at("2025-09-01T11:30:00Z"))
        .await
        .unwrap();
    svc.end_break_at(USER, at("2025-09-01T11:40:00Z"))
        .await
        .unwrap();
    svc.end_session_at(USER, at("2025-09-01T13:00:00Z"))
        .await
        .unwrap();

    let rollup = db
        .daily_rollup(USER, at("2025-09-01T13:00:00Z").date_naive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rollup.login_count, 2);
    assert_eq!(rollup.total_session_seconds, 7_200 + 7_200);
    assert_eq!(rollup.total_break_seconds, 600);
    assert_eq!(rollup.total_worked_seconds, 7_200 + 6_600);
    assert_eq!(rollup.status, PresenceStatus::LoggedOut);
}

#[tokio::test]
async fn session_crossing_midnight_keeps_original_date() {
    let (svc, db) = service("session_crossing_midnight_keeps_original_date");

    let session = svc
        .start_session_at(USER, at("2025-09-01T23:00:00Z"))
        .await
        .unwrap();
    svc.end_session_at(USER, at("2025-09-02T01:00:00Z"))
        .await
        .unwrap();

    let day_one = at("2025-09-01T23:00:00Z").date_naive();
    let day_two = at("2025-09-02T01:00:00Z").date_naive();

    let completed = db.completed_sessions_for_date(USER, day_one).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, session.id);
    assert_eq!(completed[0].calendar_date, day_one);
    assert_eq!(completed[0].logout_date, Some(day_two));
    assert_eq!(completed[0].total_seconds, 7_200);

    // The totals land on the session's original date, not the logout date.
    let rollup = db.daily_rollup(USER, day_one).await.unwrap().unwrap();
    assert_eq!(rollup.total_session_seconds, 7_200);
    assert!(db.daily_rollup(USER, day_two).await.unwrap().is_none());
}

#[tokio::test]
async fn status_probe_is_idempotent() {
    let (svc, _db) = service("status_probe_is_idempotent");

    svc.start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    svc.start_break_at(USER, None, Some("standup".to_string()), at("2025-09-01T09:30:00Z"))
        .await
        .unwrap();

    let now = at("2025-09-01T09:45:00Z");
    let first = svc.get_status_at(USER, now).await.unwrap();
    let second = svc.get_status_at(USER, now).await.unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert!(first.session.is_some());
    assert!(first.active_break.is_some());
    assert!(first.completed_today.is_empty());
}

#[tokio::test]
async fn end_session_leaves_active_break_open() {
    let (svc, db) = service("end_session_leaves_active_break_open");

    let session = svc
        .start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    svc.start_break_at(USER, None, None, at("2025-09-01T11:00:00Z"))
        .await
        .unwrap();

    // Closing the session does not require (nor perform) closing the break.
    let closure = svc
        .end_session_at(USER, at("2025-09-01T12:00:00Z"))
        .await
        .unwrap();
    assert_eq!(closure.break_seconds, 0);
    assert_eq!(closure.worked_seconds, 10_800);

    assert!(db.ongoing_session_for(USER).await.unwrap().is_none());
    let dangling = db
        .active_break_for(USER)
        .await
        .unwrap()
        .expect("break still active");

    // Ending it afterwards still folds the duration into the completed row
    // and the rollup; the session's derived buckets stay as closed.
    let brk = svc
        .end_break_at(USER, at("2025-09-01T12:30:00Z"))
        .await
        .unwrap();
    assert_eq!(brk.id, dangling.id);
    assert_eq!(brk.duration_seconds, Some(5_400));

    let completed = db
        .completed_sessions_for_date(USER, at("2025-09-01T12:00:00Z").date_naive())
        .await
        .unwrap();
    assert_eq!(completed[0].id, session.id);
    assert_eq!(completed[0].break_count, 1);
    assert_eq!(completed[0].break_seconds, 5_400);
    assert_eq!(completed[0].worked_seconds, 10_800);

    let rollup = db
        .daily_rollup(USER, at("2025-09-01T12:00:00Z").date_naive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rollup.total_break_seconds, 5_400);
    assert_eq!(rollup.status, PresenceStatus::LoggedIn);
}

#[tokio::test]
async fn clock_skew_floors_durations_at_zero() {
    let (svc, _db) = service("clock_skew_floors_durations_at_zero");

    svc.start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    let closure = svc
        .end_session_at(USER, at("2025-09-01T08:00:00Z"))
        .await
        .unwrap();

    assert_eq!(closure.total_seconds, 0);
    assert_eq!(closure.worked_seconds, 0);
    assert_eq!(closure.regular_seconds, 0);
}

#[tokio::test]
async fn break_history_is_recorded_per_session() {
    let (svc, db) = service("break_history_is_recorded_per_session");

    let session = svc
        .start_session_at(USER, at("2025-09-01T09:00:00Z"))
        .await
        .unwrap();
    for (start, end, reason) in [
        ("2025-09-01T10:00:00Z", "2025-09-01T10:10:00Z", "Coffee"),
        ("2025-09-01T12:00:00Z", "2025-09-01T12:45:00Z", "Lunch"),
    ] {
        svc.start_break_at(USER, Some(reason.to_string()), None, at(start))
            .await
            .unwrap();
        svc.end_break_at(USER, at(end)).await.unwrap();
    }
    svc.end_session_at(USER, at("2025-09-01T17:00:00Z"))
        .await
        .unwrap();

    let history = db.breaks_for_session(&session.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reason, "Coffee");
    assert_eq!(history[0].duration_seconds, Some(600));
    assert_eq!(history[1].reason, "Lunch");
    assert_eq!(history[1].duration_seconds, Some(2_700));

    let completed = db
        .completed_sessions_for_date(USER, at("2025-09-01T17:00:00Z").date_naive())
        .await
        .unwrap();
    assert_eq!(completed[0].break_count, 2);
    assert_eq!(completed[0].break_seconds, 3_300);
    assert_eq!(completed[0].worked_seconds, 28_800 - 3_300);
}
