pub mod attendance;
pub mod db;
pub mod models;

pub use attendance::{
    AttendanceError, AttendanceService, AttendanceSnapshot, SessionClosure, ShiftBreakdown,
};
pub use db::Database;
pub use models::{
    Break, BreakStatus, DailyRollup, PresenceStatus, Session, SessionStatus, ShiftSchedule,
};
