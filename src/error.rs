//! Error types for relaychat.
//!
//! Every failure a chat turn can run into is represented here, from input that
//! never leaves the client to a relay that answers with a non-2xx status.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Message shown to the user when the relay gave no `detail` of its own.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Sorry, something went wrong reaching the assistant. Please try again.";

/// The coarse classification of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was rejected locally; nothing was sent.
    Validation,
    /// The request could not be completed or its response could not be read.
    Transport,
    /// The relay answered with a non-2xx status.
    Backend,
}

/// The main error type for relaychat.
#[derive(Clone, Debug)]
pub enum Error {
    /// Input failed validation.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field that failed validation.
        param: Option<String>,
    },

    /// The relay answered with a non-2xx status.
    Backend {
        /// HTTP status code.
        status_code: u16,
        /// The `detail` field of the error body, when the relay sent one.
        detail: Option<String>,
    },

    /// The request timed out.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new backend error.
    pub fn backend(status_code: u16, detail: Option<String>) -> Self {
        Error::Backend {
            status_code,
            detail,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Backend { .. } => ErrorKind::Backend,
            Error::Timeout { .. }
            | Error::Connection { .. }
            | Error::HttpClient { .. }
            | Error::Serialization { .. }
            | Error::Url { .. }
            | Error::Io { .. } => ErrorKind::Transport,
        }
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns true if this error came back from the relay.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend { .. })
    }

    /// Returns true if this error happened in transit.
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Backend { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the relay-provided detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Backend { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The text to show the user in the conversation view.
    ///
    /// The relay's `detail` is surfaced verbatim; every other failure collapses
    /// to [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> &str {
        match self.detail() {
            Some(detail) if !detail.trim().is_empty() => detail,
            _ => FALLBACK_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Backend {
                status_code,
                detail,
            } => {
                if let Some(detail) = detail {
                    write!(f, "Backend error ({status_code}): {detail}")
                } else {
                    write!(f, "Backend error ({status_code})")
                }
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for relaychat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_detail_is_shown_verbatim() {
        let err = Error::backend(500, Some("model unavailable".to_string()));
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.user_message(), "model unavailable");
    }

    #[test]
    fn missing_detail_falls_back() {
        let err = Error::backend(502, None);
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        let err = Error::backend(500, Some("   ".to_string()));
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn transport_errors_fall_back() {
        let err = Error::connection("connection refused", None);
        assert!(err.is_transport());
        assert!(err.is_connection());
        assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);

        let err = Error::timeout("took too long", Some(60.0));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Timeout error: took too long (60 seconds)");
    }

    #[test]
    fn json_errors_are_transport_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn validation_display() {
        let err = Error::validation("message is empty", Some("text".to_string()));
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation error: message is empty (parameter: text)"
        );
    }
}
