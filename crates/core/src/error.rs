#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid request: {field}: {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// A terminal run record was written to a second time. Logged by the
    /// caller, never surfaced to the end user.
    #[error("Run {0} is already in a terminal state")]
    TerminalConflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a field validation failure.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }
}
