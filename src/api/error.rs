//! Error types for the REST wrapper.

use thiserror::Error;

/// REST wrapper error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend answered with a non-success status.
    ///
    /// Displays exactly `message`: the backend's `message` field when it sent
    /// one, otherwise `HTTP <status>`.
    #[error("{message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Message surfaced to the caller.
        message: String,
    },

    /// The request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body serialization or success-body deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Status code of a failed response, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Json(_) => None,
        }
    }
}

/// Result type alias for REST wrapper calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_displays_message_only() {
        let err = Error::Request {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.status(), Some(404));
    }
}
