//! HTTP/1.1 chunked transfer-coding decoder.
//!
//! A small explicit state machine driving an inner [`Read`], in the same
//! style as `boomnet::http::HttpRequest`'s `poll`-driven `State` enum, but
//! here the machine drives byte-for-byte framing instead of whole-response
//! buffering.

use crate::error::parser_error;
use std::io::{self, Read};

#[derive(Debug, Eq, PartialEq)]
enum State {
    NeedChunkHeader,
    InChunk(usize),
    NeedNewline,
    /// The zero-size chunk's header line has been read; one more CRLF is
    /// consumed (the minimal trailer handling below) before `Done`.
    NeedFinalNewline,
    Done,
}

/// Strips chunked framing from `inner`, yielding decoded body bytes.
///
/// Trailer handling after the terminating zero-size chunk is minimal: only
/// the one CRLF that immediately follows a trailer-less zero chunk is
/// consumed. A response that actually carries trailer headers leaves those
/// bytes un-consumed on the connection; callers must treat such a connection
/// as unfit for pooling rather than attempt to drain trailers here.
pub struct ChunkedDecoder<R> {
    inner: R,
    state: State,
}

impl<R: Read> ChunkedDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: State::NeedChunkHeader,
        }
    }

    /// `true` once the terminating zero-size chunk has been parsed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        let n = self.inner.read(&mut byte)?;
        if n == 0 {
            return Err(parser_error("Chunk header"));
        }
        Ok(byte[0])
    }

    /// Reads hex digits (optionally followed by a `;`-delimited chunk
    /// extension, which is ignored) up to and including the terminating
    /// CRLF, returning the parsed chunk length.
    fn read_chunk_header(&mut self) -> io::Result<usize> {
        let mut line = Vec::with_capacity(8);
        loop {
            let byte = self.read_byte()?;
            if byte == b'\n' {
                break;
            }
            if byte != b'\r' {
                line.push(byte);
            }
        }
        let size_part = line.split(|&b| b == b';').next().unwrap_or(&line[..]);
        let text = std::str::from_utf8(size_part).map_err(|_| parser_error("Chunk header"))?;
        usize::from_str_radix(text.trim(), 16).map_err(|_| parser_error("Chunk header"))
    }

    fn read_newline(&mut self) -> io::Result<()> {
        let cr = self.read_byte().map_err(|_| parser_error("End of chunk newline"))?;
        let lf = self.read_byte().map_err(|_| parser_error("End of chunk newline"))?;
        if cr != b'\r' || lf != b'\n' {
            return Err(parser_error("End of chunk newline"));
        }
        Ok(())
    }
}

impl<R: Read> Read for ChunkedDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.state {
                State::Done => return Ok(0),
                State::NeedChunkHeader => {
                    let n = self.read_chunk_header()?;
                    self.state = if n == 0 { State::NeedFinalNewline } else { State::InChunk(n) };
                }
                State::NeedFinalNewline => {
                    self.read_newline()?;
                    self.state = State::Done;
                }
                State::InChunk(0) => {
                    self.state = State::NeedNewline;
                }
                State::InChunk(remaining) => {
                    if buf.is_empty() {
                        return Ok(0);
                    }
                    let to_read = remaining.min(buf.len());
                    let read = self.inner.read(&mut buf[..to_read])?;
                    if read == 0 {
                        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected eof in chunk body"));
                    }
                    self.state = State::InChunk(remaining - read);
                    return Ok(read);
                }
                State::NeedNewline => {
                    self.read_newline()?;
                    self.state = State::NeedChunkHeader;
                }
            }
        }
    }
}
