pub mod error;
pub mod overtime;
pub mod service;

pub use error::AttendanceError;
pub use overtime::ShiftBreakdown;
pub use service::{AttendanceService, AttendanceSnapshot, SessionClosure};
