//! Common error types.

use thiserror::Error;

/// Main error type for the browser shell.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Invalid input: {0}")]
    UserInput(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Coarse classification of a [`ShellError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    Engine,
    Network,
    Crypto,
    State,
    Config,
    Io,
}

impl ShellError {
    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserInput(_) => ErrorKind::UserInput,
            Self::Engine(_) => ErrorKind::Engine,
            Self::Network(_) => ErrorKind::Network,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::State(_) => ErrorKind::State,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(ShellError::user_input("empty").kind(), ErrorKind::UserInput);
        assert_eq!(ShellError::crypto("bad tag").kind(), ErrorKind::Crypto);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(ShellError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_display() {
        let err = ShellError::network("timed out");
        assert_eq!(err.to_string(), "Network error: timed out");
        assert_eq!(ShellError::config("bad").to_string(), "Configuration error: bad");
    }
}
