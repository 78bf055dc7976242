//! Control-flow signals.
//!
//! Controllers short-circuit normal return flow by returning a [`Signal`]
//! as the `Err` arm of their result. Abort and redirect signals are intent,
//! not failures: the dispatcher converts them into responses. Ordinary
//! failures travel in their own variant and take the error-route recovery
//! path; the two are never conflated.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde_json::{json, Value};

use crate::core::Error;

/// An HTTP error outcome: status, optional message, header overlay,
/// application error code.
#[derive(Clone, Debug)]
pub struct HttpError {
    status: StatusCode,
    message: Option<String>,
    headers: HeaderMap,
    error_code: u32,
}

impl HttpError {
    /// Create an error outcome for a status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
            headers: HeaderMap::new(),
            error_code: 0,
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a header overlaid onto the recovered response. Invalid
    /// input is ignored.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Attach an application error code.
    pub fn with_code(mut self, code: u32) -> Self {
        self.error_code = code;
        self
    }

    /// The HTTP status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message, if any.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Headers overlaid onto the recovered response.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The application error code.
    #[inline]
    pub fn code(&self) -> u32 {
        self.error_code
    }

    /// Value form passed to error-route controllers as their first
    /// forced argument.
    pub fn as_value(&self) -> Value {
        json!({
            "status": self.status.as_u16(),
            "message": self.message,
            "code": self.error_code,
            "detail": self.message,
        })
    }
}

/// Non-local exit raised by controller or dispatch code.
#[derive(Debug)]
pub enum Signal {
    /// HTTP error outcome; recovered through the error route.
    Abort(HttpError),
    /// Redirect outcome; converted directly into a redirect response.
    Redirect {
        /// Target URL.
        url: String,
        /// Redirect status, 302 by default.
        status: StatusCode,
    },
    /// Ordinary failure; recovered once through the error route, then
    /// propagated.
    Failure(Error),
}

impl Signal {
    /// Abort with a status and message.
    pub fn abort(status: StatusCode, message: impl Into<String>) -> Self {
        Signal::Abort(HttpError::new(status).with_message(message))
    }

    /// Redirect with the default 302 status.
    pub fn redirect(url: impl Into<String>) -> Self {
        Signal::Redirect {
            url: url.into(),
            status: StatusCode::FOUND,
        }
    }

    /// Redirect with an explicit status.
    pub fn redirect_with(url: impl Into<String>, status: StatusCode) -> Self {
        Signal::Redirect {
            url: url.into(),
            status,
        }
    }

    /// Not-found abort used by dispatch internals.
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Signal::abort(StatusCode::NOT_FOUND, message)
    }
}

impl From<HttpError> for Signal {
    fn from(err: HttpError) -> Self {
        Signal::Abort(err)
    }
}

impl From<Error> for Signal {
    fn from(err: Error) -> Self {
        Signal::Failure(err)
    }
}

impl From<std::io::Error> for Signal {
    fn from(err: std::io::Error) -> Self {
        Signal::Failure(err.into())
    }
}

impl From<serde_json::Error> for Signal {
    fn from(err: serde_json::Error) -> Self {
        Signal::Failure(err.into())
    }
}

/// Value form of an ordinary failure, for forced error-route arguments.
pub(crate) fn failure_value(err: &Error) -> Value {
    json!({
        "status": 500,
        "message": err.to_string(),
        "code": 0,
        "detail": err.detail(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_builder() {
        let err = HttpError::new(StatusCode::NOT_FOUND)
            .with_message("missing")
            .with_header("x-reason", "gone")
            .with_code(123);

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), Some("missing"));
        assert_eq!(err.headers().get("x-reason").unwrap(), "gone");
        assert_eq!(err.code(), 123);
    }

    #[test]
    fn test_http_error_as_value() {
        let err = HttpError::new(StatusCode::NOT_FOUND)
            .with_message("missing")
            .with_code(123);

        let value = err.as_value();
        assert_eq!(value["status"], 404);
        assert_eq!(value["message"], "missing");
        assert_eq!(value["code"], 123);
    }

    #[test]
    fn test_signal_redirect_default_status() {
        match Signal::redirect("/next") {
            Signal::Redirect { url, status } => {
                assert_eq!(url, "/next");
                assert_eq!(status, StatusCode::FOUND);
            }
            other => panic!("unexpected signal: {:?}", other),
        }
    }

    #[test]
    fn test_signal_from_error_is_failure() {
        let signal: Signal = Error::Custom("boom".into()).into();
        assert!(matches!(signal, Signal::Failure(_)));
    }

    #[test]
    fn test_failure_value_carries_detail() {
        let err = Error::Custom("boom".into());
        let value = failure_value(&err);

        assert_eq!(value["status"], 500);
        assert_eq!(value["message"], "boom");
        assert_eq!(value["detail"], "boom");
    }
}
