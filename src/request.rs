//! Immutable request value and request body model.

use crate::headers::Headers;
use std::io::Read;
use std::sync::Arc;

/// A restartable byte producer for the [`RequestBody::Stream`] variant.
///
/// Restartability is a contract the caller promises: the redirect driver may
/// invoke this factory more than once to replay the same body against a new
/// request target.
pub type BodyProducer = Arc<dyn Fn() -> Box<dyn Read + Send> + Send + Sync>;

/// The request body: either a fully materialized byte sequence, or a
/// declared-length, replayable producer.
#[derive(Clone)]
pub enum RequestBody {
    /// A finite byte sequence whose length is known.
    Bytes(Vec<u8>),
    /// A declared content length plus a restartable byte producer.
    Stream {
        /// Declared `Content-Length`.
        content_length: u64,
        /// Factory invoked once per send attempt (including redirect replays).
        producer: BodyProducer,
    },
}

impl Default for RequestBody {
    fn default() -> Self {
        RequestBody::Bytes(Vec::new())
    }
}

impl RequestBody {
    /// Length of the body as it will be declared in `Content-Length`.
    pub fn content_length(&self) -> u64 {
        match self {
            RequestBody::Bytes(bytes) => bytes.len() as u64,
            RequestBody::Stream { content_length, .. } => *content_length,
        }
    }

    /// Produces a fresh reader over the body bytes, suitable for a single
    /// send attempt.
    pub fn reader(&self) -> Box<dyn Read + Send> {
        match self {
            RequestBody::Bytes(bytes) => Box::new(std::io::Cursor::new(bytes.clone())),
            RequestBody::Stream { producer, .. } => producer(),
        }
    }
}

/// A certificate-chain verification predicate, invoked only when
/// [`Request::secure`] is set. Accepts all by default.
pub type CertCheck = Arc<dyn Fn(&[Vec<u8>]) -> bool + Send + Sync>;

fn accept_all_certs() -> CertCheck {
    Arc::new(|_| true)
}

/// An immutable request value. Constructed via [`crate::url::parse_url`] or
/// [`Request::new`], then refined with the `with_*` builders.
#[derive(Clone)]
pub struct Request {
    method: String,
    secure: bool,
    host: String,
    port: u16,
    path: String,
    query_string: Vec<(String, Option<String>)>,
    headers: Headers,
    check_certs: CertCheck,
    body: RequestBody,
}

impl Request {
    /// Creates a request with engine defaults: `GET /`, no headers, empty
    /// body, accept-all certificate check.
    pub fn new(host: impl Into<String>, port: u16, secure: bool) -> Self {
        Self {
            method: "GET".to_string(),
            secure,
            host: host.into(),
            port,
            path: "/".to_string(),
            query_string: Vec::new(),
            headers: Headers::new(),
            check_certs: accept_all_certs(),
            body: RequestBody::default(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_query(mut self, query_string: Vec<(String, Option<String>)>) -> Self {
        self.query_string = query_string;
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_check_certs(mut self, check_certs: CertCheck) -> Self {
        self.check_certs = check_certs;
        self
    }

    /// Rebinds the connection target, used by the redirect driver when a
    /// `Location` points at a different host/port/scheme.
    pub fn with_host_port_secure(mut self, host: impl Into<String>, port: u16, secure: bool) -> Self {
        self.host = host.into();
        self.port = port;
        self.secure = secure;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &[(String, Option<String>)] {
        &self.query_string
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn check_certs(&self) -> &CertCheck {
        &self.check_certs
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Default `Host` header value: `host` alone if `port` is the default
    /// for the scheme (80 plaintext, 443 secure), otherwise `host:port`.
    pub fn host_header(&self) -> String {
        let is_default_port = (!self.secure && self.port == 80) || (self.secure && self.port == 443);
        if is_default_port {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compute_default_host_header() {
        assert_eq!("example.com", Request::new("example.com", 80, false).host_header());
        assert_eq!("example.com", Request::new("example.com", 443, true).host_header());
        assert_eq!(
            "example.com:8443",
            Request::new("example.com", 8443, true).host_header()
        );
        assert_eq!("example.com:81", Request::new("example.com", 81, false).host_header());
    }
}
