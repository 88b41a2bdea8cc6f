//! One-shot user notices.

use common::{ErrorKind, ShellError};

/// Notice severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A non-blocking message for the user. Shown once, then discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    /// Error classification for error notices.
    pub kind: Option<ErrorKind>,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
            kind: None,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
            kind: None,
        }
    }

    /// Error notice for a failed operation.
    pub fn from_error(title: impl Into<String>, err: &ShellError) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: err.to_string(),
            kind: Some(err.kind()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
