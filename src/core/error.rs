//! Core error types.

use std::fmt;

/// Errors raised by dispatch, rendering, and serialization.
#[derive(Debug)]
pub enum Error {
    /// View rendering error (missing file, undefined variable).
    View(String),

    /// Controller resolution or invocation error.
    Resolve(String),

    /// JSON serialization error.
    Serialize(serde_json::Error),

    /// I/O error.
    Io(std::io::Error),

    /// Custom error with message.
    Custom(String),
}

impl Error {
    /// Render the error together with its source chain.
    ///
    /// Used by the debug failure report in place of a backtrace.
    pub fn detail(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::View(msg) => write!(f, "view error: {}", msg),
            Error::Resolve(msg) => write!(f, "controller error: {}", msg),
            Error::Serialize(e) => write!(f, "serialization error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Serialize(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e)
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Custom(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Custom(msg.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::View("template gone".to_string());
        assert_eq!(err.to_string(), "view error: template gone");

        let err = Error::Resolve("no such action".to_string());
        assert_eq!(err.to_string(), "controller error: no such action");

        let err = Error::Custom("something went wrong".to_string());
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "custom error".into();
        assert!(matches!(err, Error::Custom(_)));
        assert_eq!(err.to_string(), "custom error");
    }

    #[test]
    fn test_detail_includes_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();

        let detail = err.detail();
        assert!(detail.starts_with("I/O error"));
        assert!(detail.contains("caused by: denied"));
    }
}
