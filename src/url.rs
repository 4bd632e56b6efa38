//! URL parsing (C9) and RFC 3986-ish percent-encoding.
//!
//! The percent-encoding table intentionally matches the legacy
//! "form encoding" behaviour of the system this engine was modeled on: space
//! becomes `+` rather than `%20`. This bleeds into path and query encoding
//! everywhere in this crate — see spec.md §9 for the rationale and the
//! compatibility tradeoff.

use crate::error::HttpError;
use crate::request::Request;

/// Characters that never need percent-encoding.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

/// Percent-encodes every byte outside the unreserved set, encoding space as
/// `+` (legacy form-style encoding, see module docs).
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b' ' => out.push('+'),
            _ if is_unreserved(b) => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Same as [`percent_encode`] but leaves `/` untouched, for encoding paths.
pub fn percent_encode_path(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b' ' => out.push('+'),
            b'/' => out.push('/'),
            _ if is_unreserved(b) => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Renders an ordered query-string sequence, percent-encoding every
/// name/value, in insertion order.
pub fn render_query_string(pairs: &[(String, Option<String>)]) -> String {
    let mut out = String::new();
    for (i, (name, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(&percent_encode(name));
        if let Some(value) = value {
            out.push('=');
            out.push_str(&percent_encode(value));
        }
    }
    out
}

/// Parses an ASCII URL string into a [`Request`] with engine defaults
/// (`GET`, no headers, empty body, accept-all certificate check).
pub fn parse_url(url: &str) -> Result<Request, HttpError> {
    let secure = if let Some(rest) = url.strip_prefix("https://") {
        let _ = rest;
        true
    } else if url.starts_with("http://") {
        false
    } else {
        return Err(HttpError::invalid_url(url, "Invalid scheme"));
    };

    let scheme_len = if secure { 8 } else { 7 };
    // Re-interpret the remainder byte-for-byte as UTF-8 input to the structural
    // split, accepting IRIs without a dedicated IRI grammar (spec.md §4.7).
    let rest = &url[scheme_len..];

    let (authority, path_and_query) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let (host, port) = match authority.find(':') {
        Some(idx) => {
            let host = &authority[..idx];
            let port_str = &authority[idx + 1..];
            let port: u16 = port_str
                .parse()
                .map_err(|_| HttpError::invalid_url(url, "Invalid port"))?;
            (host, port)
        }
        None => (authority, if secure { 443 } else { 80 }),
    };

    if host.is_empty() {
        return Err(HttpError::invalid_url(url, "Invalid port"));
    }

    // Split off the fragment first, then the query, leaving the raw path.
    let without_fragment = match path_and_query.find('#') {
        Some(idx) => &path_and_query[..idx],
        None => path_and_query,
    };
    let (raw_path, raw_query) = match without_fragment.find('?') {
        Some(idx) => (&without_fragment[..idx], Some(&without_fragment[idx + 1..])),
        None => (without_fragment, None),
    };

    let path = if raw_path.is_empty() {
        "/".to_string()
    } else {
        percent_encode_path(raw_path)
    };

    let query_string = match raw_query {
        Some(q) if !q.is_empty() => parse_query_string(q),
        _ => Vec::new(),
    };

    Ok(Request::new(host, port, secure).with_path(path).with_query(query_string))
}

fn parse_query_string(query: &str) -> Vec<(String, Option<String>)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.find('=') {
            Some(idx) => (pair[..idx].to_string(), Some(pair[idx + 1..].to_string())),
            None => (pair.to_string(), None),
        })
        .collect()
}
