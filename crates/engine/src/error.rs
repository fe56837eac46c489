use busline_core::error::{CoreError, ErrorKind};

/// Name of the partial unique index guaranteeing one live link per seat.
pub const ACTIVE_SEAT_LINK_INDEX: &str = "uq_booking_seats_active_trip_seat";

/// Error returned by every engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `busline_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Classify the error. Database failures are internal, except a
    /// violation of the live-seat-link index, which means another
    /// booking won the seat.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Core(core) => core.kind(),
            EngineError::Database(err) if is_seat_ownership_violation(err) => ErrorKind::Conflict,
            EngineError::Database(_) => ErrorKind::Internal,
        }
    }
}

/// `true` for a PostgreSQL unique violation (23505) on the live-seat-link
/// index.
pub fn is_seat_ownership_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(ACTIVE_SEAT_LINK_INDEX)
        }
        _ => false,
    }
}

pub(crate) fn not_found(entity: &'static str, id: busline_core::types::DbId) -> EngineError {
    EngineError::Core(CoreError::NotFound { entity, id })
}

pub(crate) fn conflict(msg: impl Into<String>) -> EngineError {
    EngineError::Core(CoreError::Conflict(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_kind_passes_through() {
        let err = EngineError::from(CoreError::Rejected("departed".into()));
        assert_eq!(err.kind(), ErrorKind::Rejected);

        let err = not_found("Trip", 9);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("Trip with id 9"));
    }

    #[test]
    fn plain_database_errors_are_internal() {
        let err = EngineError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!is_seat_ownership_violation(&sqlx::Error::PoolTimedOut));
    }
}
