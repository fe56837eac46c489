use crate::types::DbId;

/// Coarse classification of a [`CoreError`], used by callers to branch on
/// the failure without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Rejected,
    State,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} with reference {reference}")]
    ReferenceNotFound {
        entity: &'static str,
        reference: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A business rule refused the operation (trip not bookable, departed, ...).
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } | CoreError::ReferenceNotFound { .. } => {
                ErrorKind::NotFound
            }
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::Rejected(_) => ErrorKind::Rejected,
            CoreError::InvalidTransition { .. } => ErrorKind::State,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}
