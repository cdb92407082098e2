use std::fmt;

use thiserror::Error;

/// High-level error type shared across Lessonport components.
#[derive(Debug, Error)]
pub enum LessonportError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("content error: {0}")]
    Content(String),
    #[error("remote error: {0}")]
    Remote(String),
    #[error("remote returned status {status}: {message}")]
    RemoteStatus { status: u16, message: String },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LessonportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for LessonportError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}

impl LessonportError {
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            LessonportError::Config(msg) => LessonportError::Config(format!("{ctx}: {msg}")),
            LessonportError::Content(msg) => LessonportError::Content(format!("{ctx}: {msg}")),
            LessonportError::Remote(msg) => LessonportError::Remote(format!("{ctx}: {msg}")),
            LessonportError::RemoteStatus { status, message } => LessonportError::RemoteStatus {
                status,
                message: format!("{ctx}: {message}"),
            },
            LessonportError::Serialization(msg) => {
                LessonportError::Serialization(format!("{ctx}: {msg}"))
            }
            LessonportError::Io(err) => LessonportError::Io(err),
        }
    }
}
