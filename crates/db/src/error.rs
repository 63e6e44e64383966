/// Errors surfaced by the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("run {0} not found")]
    RunNotFound(String),

    /// A second finalize raced against a terminal run. Signals a programming
    /// error; callers log it and drop the write.
    #[error("run {0} is already in a terminal state")]
    TerminalConflict(String),
}
