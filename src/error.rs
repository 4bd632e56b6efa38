//! Error taxonomy for the HTTP client engine.

use std::io;
use thiserror::Error;

/// Errors that can be produced while building, sending or redirecting a request.
#[derive(Error, Debug)]
pub enum HttpError {
    /// The given URL could not be parsed into a [`crate::request::Request`].
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Human readable reason, e.g. `"Invalid scheme"` or `"Invalid port"`.
        reason: &'static str,
    },

    /// The wire-level status line, headers or chunk framing could not be parsed.
    #[error("http parser error at {0}")]
    HttpParser(&'static str),

    /// The redirect budget was exhausted before a non-3xx response was received.
    #[error("too many redirects")]
    TooManyRedirects,

    /// [`crate::simple_http`] received a final, non-2xx status code.
    #[error("unexpected status code {status_code}")]
    StatusCode {
        /// Final HTTP status code.
        status_code: u16,
        /// Collected response body.
        body: Vec<u8>,
    },

    /// Propagated as-is from the transport (socket/TLS) layer.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl HttpError {
    pub(crate) fn invalid_url(url: impl Into<String>, reason: &'static str) -> Self {
        HttpError::InvalidUrl {
            url: url.into(),
            reason,
        }
    }

    /// Converts an [`io::Error`] back into an [`HttpError`], recovering the
    /// [`HttpError::HttpParser`] variant if `err` was produced by
    /// [`parser_error`] rather than by the transport layer.
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.get_ref().and_then(|inner| inner.downcast_ref::<ParserMarker>()) {
            Some(marker) => HttpError::HttpParser(marker.0),
            None => HttpError::Io(err),
        }
    }
}

impl From<HttpError> for io::Error {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}

/// Tags an [`io::Error`] produced by a wire-parsing routine (chunk framing,
/// status line, headers) so [`HttpError::from_io`] can recover the
/// [`HttpError::HttpParser`] variant across a `Read`/`Write` boundary, which
/// only deals in `io::Error`.
#[derive(Debug)]
pub(crate) struct ParserMarker(pub &'static str);

impl std::fmt::Display for ParserMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http parser error at {}", self.0)
    }
}

impl std::error::Error for ParserMarker {}

pub(crate) fn parser_error(where_: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, ParserMarker(where_))
}

pub type Result<T> = std::result::Result<T, HttpError>;
