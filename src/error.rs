use thiserror::Error;

/// Failures this crate can report. Every variant is scoped to the action
/// that triggered it; nothing here is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Local input problem. Blocks submission before any store call.
    #[error("{0}")]
    Validation(String),

    /// The remote store rejected or failed the request. The message is the
    /// store's own, surfaced verbatim; callers must not retry automatically.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration is missing or unusable.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
