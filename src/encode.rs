//! Request Encoder (C6): serializes a [`Request`] onto an outgoing byte
//! stream.
//!
//! Grounded on `boomnet::http::HttpRequest::new`'s direct `write_all`
//! sequencing of status line / headers / body, generalized to also render
//! `queryString` and to drive the `Stream` body variant without buffering it.

use crate::request::{Request, RequestBody};
use crate::url::render_query_string;
use std::io::{self, Write};

/// Writes the request line, auto headers (`Host`, `Content-Length`,
/// `Accept-Encoding`), user headers, and body onto `out`, in that order. Does
/// not flush; callers decide when to flush the underlying connection.
pub fn encode_request(request: &Request, out: &mut impl Write) -> io::Result<()> {
    let path = if request.path().starts_with('/') {
        request.path().to_string()
    } else {
        format!("/{}", request.path())
    };

    let request_target = if request.query_string().is_empty() {
        path
    } else {
        format!("{path}?{}", render_query_string(request.query_string()))
    };

    write!(out, "{} {} HTTP/1.1\r\n", request.method(), request_target)?;

    write!(out, "Host: {}\r\n", request.host_header())?;
    out.write_all(b"Content-Length: ")?;
    let mut buf = itoa::Buffer::new();
    out.write_all(buf.format(request.body().content_length()).as_bytes())?;
    out.write_all(b"\r\n")?;
    out.write_all(b"Accept-Encoding: gzip\r\n")?;

    for (name, value) in request.headers().iter() {
        write!(out, "{name}: {value}\r\n")?;
    }
    out.write_all(b"\r\n")?;

    match request.body() {
        RequestBody::Bytes(bytes) => out.write_all(bytes)?,
        RequestBody::Stream { .. } => {
            let mut reader = request.body().reader();
            io::copy(&mut reader, out)?;
        }
    }

    Ok(())
}
