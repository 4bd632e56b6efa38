//! Response value and the default "collect-to-bytes" consumer.

use crate::headers::Headers;
use std::io::{self, Read};

/// `(statusCode, responseHeaders, responseBody)` as produced by the default
/// consumer. Streaming callers never materialize this; they supply their own
/// consumer closure instead.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    /// Case-insensitive lookup of a response header. Returns `None` rather
    /// than panicking on a missing header: unlike a request header name,
    /// which is programmer-supplied, response headers are server-controlled
    /// and absence is routine.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Signature every consumer closure passed to [`crate::driver::http`] must
/// satisfy: receive the status code, response headers and a byte stream, and
/// produce an arbitrary value.
pub trait Consumer<T> {
    fn consume(self, status_code: u16, headers: &Headers, body: &mut dyn Read) -> io::Result<T>;
}

impl<F, T> Consumer<T> for F
where
    F: FnOnce(u16, &Headers, &mut dyn Read) -> io::Result<T>,
{
    fn consume(self, status_code: u16, headers: &Headers, body: &mut dyn Read) -> io::Result<T> {
        self(status_code, headers, body)
    }
}

/// The only consumer that materializes the full body in memory. Used by
/// [`crate::driver::http_lbs`] and [`crate::simple_http`].
pub fn collect_to_bytes(status_code: u16, headers: &Headers, body: &mut dyn Read) -> io::Result<Response> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)?;
    Ok(Response {
        status_code,
        headers: headers.clone(),
        body: buf,
    })
}
