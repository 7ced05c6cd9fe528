//! Configured shift window for a user.
//!
//! Time-of-day only; the window carries no date component. A user without
//! both boundaries on file counts as unconfigured, and all worked time is
//! categorized as regular shift time.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSchedule {
    pub check_in: NaiveTime,
    pub check_out: NaiveTime,
}

impl ShiftSchedule {
    pub fn new(check_in: NaiveTime, check_out: NaiveTime) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// An overnight window ends on the clock-day after it starts
    /// (e.g. 22:00 -> 06:00).
    pub fn is_overnight(&self) -> bool {
        self.check_out < self.check_in
    }

    pub fn check_in_seconds(&self) -> u64 {
        u64::from(self.check_in.num_seconds_from_midnight())
    }

    pub fn check_out_seconds(&self) -> u64 {
        u64::from(self.check_out.num_seconds_from_midnight())
    }

    /// Configured shift length in whole seconds, wrapping across midnight
    /// for overnight windows.
    pub fn shift_seconds(&self) -> u64 {
        if self.is_overnight() {
            (SECONDS_PER_DAY - self.check_in_seconds()) + self.check_out_seconds()
        } else {
            self.check_out_seconds() - self.check_in_seconds()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn day_shift_duration() {
        let schedule = ShiftSchedule::new(t(9, 0), t(17, 0));
        assert!(!schedule.is_overnight());
        assert_eq!(schedule.shift_seconds(), 8 * 3600);
    }

    #[test]
    fn overnight_shift_duration_wraps_midnight() {
        let schedule = ShiftSchedule::new(t(22, 0), t(6, 0));
        assert!(schedule.is_overnight());
        assert_eq!(schedule.shift_seconds(), 8 * 3600);
    }
}
