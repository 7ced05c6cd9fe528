//! Categorization of worked time against a configured shift window.
//!
//! Pure time-of-day arithmetic in whole seconds. Both instants reduce to
//! seconds-since-midnight of their own clock day; a session that itself
//! crosses midnight is not detected here — only the schedule's
//! overnight-ness is consulted.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ShiftSchedule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBreakdown {
    pub regular_seconds: u64,
    pub early_overtime_seconds: u64,
    pub late_overtime_seconds: u64,
    pub undertime_seconds: u64,
    pub overtime_seconds: u64,
}

/// Split `worked_seconds` (already break-deducted) into regular, overtime
/// and undertime buckets. Without a configured schedule everything counts
/// as regular shift time.
pub fn categorize(
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    schedule: Option<&ShiftSchedule>,
    worked_seconds: u64,
) -> ShiftBreakdown {
    let Some(schedule) = schedule else {
        return ShiftBreakdown {
            regular_seconds: worked_seconds,
            ..Default::default()
        };
    };

    let check_in = schedule.check_in_seconds() as i64;
    let check_out = schedule.check_out_seconds() as i64;
    let shift_seconds = schedule.shift_seconds() as i64;

    let start_secs = i64::from(started_at.time().num_seconds_from_midnight());
    let end_secs = i64::from(ended_at.time().num_seconds_from_midnight());
    let worked = worked_seconds as i64;

    let early = if start_secs < check_in {
        worked.min(check_in - start_secs)
    } else {
        0
    };

    // Late overtime is never measured against an overnight window.
    let late = if !schedule.is_overnight() && end_secs > check_out {
        worked.min(end_secs - check_out)
    } else {
        0
    };

    let regular = (worked - early - late).max(0);
    let undertime = (shift_seconds - regular).max(0);

    ShiftBreakdown {
        regular_seconds: regular as u64,
        early_overtime_seconds: early as u64,
        late_overtime_seconds: late as u64,
        undertime_seconds: undertime as u64,
        overtime_seconds: (early + late) as u64,
    }
}
