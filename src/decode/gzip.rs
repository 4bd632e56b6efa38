//! Gzip content-decoding, via `flate2`.
//!
//! Wraps `flate2::read::MultiGzDecoder` rather than driving `Decompress`
//! directly — the inner stream here is already a de-framed (chunked or
//! content-length) body, so plain buffered gzip decoding is all that's
//! needed, the same way the teacher reaches for ready-made `Read`/`Write`
//! adapters (`rustls::StreamOwned`) instead of hand-rolling one where the
//! ecosystem already has it.

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};

/// Inflates a gzip-encoded body. Layered on top of the framing decoder
/// (chunked or content-length), never underneath it: the wire framing
/// applies to the compressed bytes, not the other way around.
pub struct GzipDecoder<R: Read> {
    inner: MultiGzDecoder<R>,
}

impl<R: Read> GzipDecoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: MultiGzDecoder::new(inner),
        }
    }
}

impl<R: Read> Read for GzipDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn should_inflate_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello world").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut decoder = GzipDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(b"hello world".to_vec(), out);
    }
}
