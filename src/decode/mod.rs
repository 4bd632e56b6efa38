//! Transfer-decoding chain: chunked/content-length framing plus gzip inflation.
//!
//! Each decoder is a small `Read` adapter so the chain composes in layers:
//! framing (chunked, content-length, or close-delimited) is applied first,
//! then gzip inflation is layered on top of the already-de-framed bytes.

pub mod chunked;
pub mod gzip;
pub mod limit;

pub use chunked::ChunkedDecoder;
pub use gzip::GzipDecoder;
pub use limit::TakeExact;
