//! Redirect Driver (C8): repeats C7 across a bounded chain of 3xx responses.

use crate::driver::http;
use crate::error::{HttpError, Result};
use crate::headers::Headers;
use crate::pool::Manager;
use crate::request::{Request, RequestBody};
use crate::response::{Consumer, Response, collect_to_bytes};
use crate::url::parse_url;
use std::io::{self, Read};

/// Default redirect budget: 10 redirects (11 total requests including the original).
pub const DEFAULT_REDIRECT_BUDGET: u32 = 10;

/// [`http`] wrapped with redirect-following: on a 3xx response carrying a
/// `Location` header, rewrites the request and recurses, up to
/// [`DEFAULT_REDIRECT_BUDGET`] hops.
pub fn http_redirect<T>(request: &Request, manager: &Manager, consumer: impl Consumer<T> + Clone) -> Result<T> {
    http_redirect_with_budget(request, manager, consumer, DEFAULT_REDIRECT_BUDGET)
}

/// [`http_redirect`] with the default "collect-to-bytes" consumer.
pub fn http_lbs_redirect(request: &Request, manager: &Manager) -> Result<Response> {
    http_redirect_with_budget(request, manager, collect_to_bytes, DEFAULT_REDIRECT_BUDGET)
}

fn http_redirect_with_budget<T>(
    request: &Request,
    manager: &Manager,
    consumer: impl Consumer<T> + Clone,
    budget: u32,
) -> Result<T> {
    let outcome = http(request, manager, RedirectProbe { inner: consumer.clone() })?;

    match outcome {
        ProbeOutcome::Final(value) => Ok(value),
        ProbeOutcome::Redirect { status_code, location } => {
            if budget == 0 {
                return Err(HttpError::TooManyRedirects);
            }
            let next_request = rewrite_request(request, status_code, &location)?;
            log::debug!(
                "following {status_code} redirect to {}://{}:{}{} ({budget} hop(s) left)",
                if next_request.secure() { "https" } else { "http" },
                next_request.host(),
                next_request.port(),
                next_request.path(),
            );
            http_redirect_with_budget(&next_request, manager, consumer, budget - 1)
        }
    }
}

enum ProbeOutcome<T> {
    Final(T),
    Redirect { status_code: u16, location: String },
}

/// Wraps the caller's consumer so the redirect driver can inspect the status
/// and headers before deciding whether to deliver the body to the caller or
/// to follow a `Location`.
struct RedirectProbe<C> {
    inner: C,
}

impl<C, T> Consumer<ProbeOutcome<T>> for RedirectProbe<C>
where
    C: Consumer<T>,
{
    fn consume(self, status_code: u16, headers: &Headers, body: &mut dyn Read) -> io::Result<ProbeOutcome<T>> {
        if (300..400).contains(&status_code) {
            if let Some(location) = headers.get("Location") {
                let location = location.to_string();
                // The caller never sees a redirect's body; drain it so the
                // connection stays at a clean boundary for the next borrower.
                io::copy(body, &mut io::sink())?;
                return Ok(ProbeOutcome::Redirect { status_code, location });
            }
        }
        self.inner.consume(status_code, headers, body).map(ProbeOutcome::Final)
    }
}

/// Builds the follow-up request: absolutizes a root-relative `Location`
/// against the current request's scheme/host/port, parses it through the URL
/// parser, then carries over the original request's headers/body/checkCerts,
/// coercing the method to `GET` on a 303.
fn rewrite_request(original: &Request, status_code: u16, location: &str) -> Result<Request> {
    let absolute = if location.starts_with('/') {
        let scheme = if original.secure() { "https" } else { "http" };
        format!("{scheme}://{}:{}{}", original.host(), original.port(), location)
    } else {
        location.to_string()
    };

    let parsed = parse_url(&absolute)?;

    let method = if status_code == 303 { "GET" } else { original.method() };

    let mut rewritten = original
        .clone()
        .with_method(method)
        .with_path(parsed.path().to_string())
        .with_query(parsed.query_string().to_vec())
        // parse_url only knows host/port/secure of the redirected-to URL itself.
        .with_host_port_secure(parsed.host(), parsed.port(), parsed.secure());

    if status_code == 303 {
        // A 303 follow-up carries neither the original method nor its body
        // (spec.md §4.6/§8 scenario 5): drop any request body and the
        // Content-Type that described it.
        rewritten = rewritten.with_body(RequestBody::Bytes(Vec::new()));
        rewritten.headers_mut().remove("Content-Type");
    }

    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_absolutize_relative_location() {
        let original = Request::new("example.com", 80, false);
        let rewritten = rewrite_request(&original, 302, "/new/path?x=1").unwrap();

        assert_eq!("example.com", rewritten.host());
        assert_eq!(80, rewritten.port());
        assert_eq!("/new/path", rewritten.path());
        assert_eq!("GET", rewritten.method());
    }

    #[test]
    fn should_follow_absolute_location_to_new_host() {
        let original = Request::new("example.com", 80, false).with_method("POST");
        let rewritten = rewrite_request(&original, 307, "https://other.example:8443/next").unwrap();

        assert_eq!("other.example", rewritten.host());
        assert_eq!(8443, rewritten.port());
        assert!(rewritten.secure());
        assert_eq!("POST", rewritten.method());
    }

    #[test]
    fn should_coerce_method_to_get_on_303() {
        let original = Request::new("example.com", 80, false).with_method("POST");
        let rewritten = rewrite_request(&original, 303, "/done").unwrap();
        assert_eq!("GET", rewritten.method());
    }

    #[test]
    fn should_drop_body_and_content_type_on_303() {
        let mut original = Request::new("example.com", 80, false)
            .with_method("POST")
            .with_body(RequestBody::Bytes(b"payload".to_vec()));
        original.headers_mut().insert("Content-Type", "text/plain");

        let rewritten = rewrite_request(&original, 303, "/done").unwrap();

        assert_eq!(0, rewritten.body().content_length());
        assert!(!rewritten.headers().contains("Content-Type"));
    }

    #[test]
    fn should_preserve_body_on_non_303_redirect() {
        let original = Request::new("example.com", 80, false)
            .with_method("POST")
            .with_body(RequestBody::Bytes(b"payload".to_vec()));

        let rewritten = rewrite_request(&original, 307, "/done").unwrap();

        assert_eq!(7, rewritten.body().content_length());
    }
}
