use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollocationError {
    /// Aggregated configuration problem: one comma-separated message naming
    /// every offending field, collected in a single validation pass.
    #[error("{0}")]
    Validation(String),
}

impl CollocationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type EngineResult<T> = Result<T, CollocationError>;
