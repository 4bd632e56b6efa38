//! `Content-Length`-framed body: forwards exactly `n` bytes then EOFs.

use std::io::{self, Read};

/// Caps reads from `inner` to exactly `limit` bytes total, then behaves as if
/// the stream ended, leaving any further bytes on the connection untouched
/// for the next request.
pub struct TakeExact<R> {
    inner: R,
    remaining: usize,
}

impl<R: Read> TakeExact<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        Self { inner, remaining: limit }
    }

    /// `true` once `limit` bytes have been forwarded.
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

impl<R: Read> Read for TakeExact<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let to_read = self.remaining.min(buf.len());
        let read = self.inner.read(&mut buf[..to_read])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before content-length bytes were received",
            ));
        }
        self.remaining -= read;
        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn should_stop_exactly_at_limit() {
        let mut limiter = TakeExact::new(Cursor::new(b"hello world"), 5);
        let mut out = Vec::new();
        limiter.read_to_end(&mut out).unwrap();
        assert_eq!(b"hello".to_vec(), out);
        assert!(limiter.is_done());
    }

    #[test]
    fn should_fail_on_premature_eof() {
        let mut limiter = TakeExact::new(Cursor::new(b"hi"), 5);
        let mut out = Vec::new();
        let err = limiter.read_to_end(&mut out).unwrap_err();
        assert_eq!(io::ErrorKind::UnexpectedEof, err.kind());
    }
}
