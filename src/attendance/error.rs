use thiserror::Error;

/// Terminal outcomes of an attendance operation. The crate never retries
/// internally; conflict variants carry the existing resource id so the
/// caller can reconcile instead of duplicating state.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("session already active")]
    SessionAlreadyActive { existing_session_id: String },

    #[error("break already active")]
    BreakAlreadyActive { existing_break_id: String },

    #[error("no active session")]
    NoActiveSession,

    #[error("no active break")]
    NoActiveBreak,

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl AttendanceError {
    /// Recover a domain error that traveled through the store's `anyhow`
    /// boundary; anything else is a persistence failure.
    pub(crate) fn from_db(err: anyhow::Error) -> Self {
        match err.downcast::<AttendanceError>() {
            Ok(domain) => domain,
            Err(other) => AttendanceError::Persistence(other),
        }
    }
}
