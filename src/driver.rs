//! Request Driver: borrow → encode → parse → decode → consume → return.
//!
//! Grounded on the teacher's `http::Connection::poll` header-then-body state
//! progression, collapsed from a non-blocking poll loop into a single
//! blocking pass since the transport underneath is itself blocking.

use crate::decode::{ChunkedDecoder, GzipDecoder, TakeExact};
use crate::encode::encode_request;
use crate::error::{HttpError, Result};
use crate::headers::Headers;
use crate::pool::{ConnKey, Manager};
use crate::request::Request;
use crate::response::{Consumer, Response, collect_to_bytes};
use crate::stream::{Conn, ConnectionInfo};
use std::io::{self, Cursor, Read};

const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Read-buffer granularity used while scanning for the end of the response
/// headers, mirroring the teacher's `DEFAULT_CHUNK_SIZE` role as a tunable
/// constant rather than a magic number buried in the loop.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8192;

/// Runs `request` against `manager`, delivering the response to `consumer`.
///
/// Borrows (or opens) a connection, writes the request,
/// parses the status line and headers, wires up the transfer-decoding chain,
/// drives `consumer`, then either returns the connection to `manager` (clean
/// completion) or drops it (any error).
pub fn http<T>(request: &Request, manager: &Manager, consumer: impl Consumer<T>) -> Result<T> {
    let key = ConnKey::new(request.host(), request.port(), request.secure());

    let mut conn = match manager.take(&key) {
        Some(conn) => conn,
        None => {
            let info = ConnectionInfo::new(request.host(), request.port());
            Conn::open(&info, request.secure(), request.check_certs())?
        }
    };

    match run_request(request, &mut conn, consumer) {
        Ok(value) => {
            manager.put(key, conn);
            Ok(value)
        }
        Err(err) => {
            let _ = conn.close();
            Err(err)
        }
    }
}

/// [`http`] with the default "collect-to-bytes" consumer.
pub fn http_lbs(request: &Request, manager: &Manager) -> Result<Response> {
    http(request, manager, collect_to_bytes)
}

fn run_request<T>(request: &Request, conn: &mut Conn, consumer: impl Consumer<T>) -> Result<T> {
    encode_request(request, conn).map_err(HttpError::from_io)?;
    conn.flush().map_err(HttpError::from_io)?;

    let (status_code, headers, leftover) = read_headers(conn).map_err(HttpError::from_io)?;

    if request.method().eq_ignore_ascii_case("HEAD") {
        return consumer.consume(status_code, &headers, &mut io::empty()).map_err(HttpError::from_io);
    }

    let base = Cursor::new(leftover).chain(&mut *conn);

    let chunked = headers.has_value("Transfer-Encoding", "chunked");
    let content_length = headers.get("Content-Length").and_then(|v| v.parse::<usize>().ok());
    let gzip = headers.has_value("Content-Encoding", "gzip");

    // Chunked framing takes precedence over Content-Length when both headers are present.
    let mut framed: Box<dyn Read + '_> = if chunked {
        Box::new(ChunkedDecoder::new(base))
    } else if let Some(len) = content_length {
        Box::new(TakeExact::new(base, len))
    } else {
        Box::new(base)
    };

    let mut piped: Box<dyn Read + '_> = if gzip {
        Box::new(GzipDecoder::new(&mut framed))
    } else {
        framed
    };

    let value = consumer.consume(status_code, &headers, &mut piped).map_err(HttpError::from_io)?;

    // Drain whatever the consumer left unread so the connection resumes at a
    // clean response boundary before it goes back to the pool; any failure
    // here means the connection is unfit for reuse.
    io::copy(&mut piped, &mut io::sink()).map_err(HttpError::from_io)?;

    Ok(value)
}

fn read_headers(conn: &mut Conn) -> io::Result<(u16, Headers, Vec<u8>)> {
    let mut buf = Vec::with_capacity(DEFAULT_READ_CHUNK_SIZE);
    let mut chunk = [0u8; DEFAULT_READ_CHUNK_SIZE];

    loop {
        if let Some(pos) = memchr::memmem::find(&buf, b"\r\n\r\n") {
            let header_len = pos + 4;
            return parse_headers(&buf, header_len);
        }
        if buf.len() > MAX_HEADER_BYTES {
            return Err(crate::error::parser_error("Response headers"));
        }

        let n = conn.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before response headers"));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn parse_headers(buf: &[u8], header_len: usize) -> io::Result<(u16, Headers, Vec<u8>)> {
    let mut raw_headers = [httparse::EMPTY_HEADER; 64];
    let mut response = httparse::Response::new(&mut raw_headers);

    match response.parse(&buf[..header_len]) {
        Ok(httparse::Status::Complete(_)) => {
            let status_code = response
                .code
                .ok_or_else(|| crate::error::parser_error("Response status line"))?;

            let headers = response
                .headers
                .iter()
                .map(|h| (h.name, std::str::from_utf8(h.value).unwrap_or("")))
                .collect::<Headers>();

            Ok((status_code, headers, buf[header_len..].to_vec()))
        }
        Ok(httparse::Status::Partial) => Err(crate::error::parser_error("Response headers")),
        Err(_) => Err(crate::error::parser_error("Response headers")),
    }
}
