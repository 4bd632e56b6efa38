//! Streaming HTTP/1.1 client engine: keep-alive connection pooling,
//! chunked/gzip response decoding, and bounded redirect following.
//!
//! The entry points most callers need are [`simple_http`] for a one-shot
//! download, or [`driver::http_lbs`]/[`redirect::http_lbs_redirect`] plus a
//! [`pool::Manager`] when connections should be reused across requests.

mod decode;
mod driver;
mod encode;
pub mod error;
pub mod form;
pub mod headers;
pub mod pool;
pub mod redirect;
pub mod request;
pub mod response;
mod simple;
pub mod stream;
pub mod url;

pub use driver::{DEFAULT_READ_CHUNK_SIZE, http, http_lbs};
pub use error::HttpError;
pub use form::url_encoded_body;
pub use headers::Headers;
pub use pool::Manager;
pub use redirect::{DEFAULT_REDIRECT_BUDGET, http_lbs_redirect, http_redirect};
pub use request::{Request, RequestBody};
pub use response::{Consumer, Response};
pub use simple::simple_http;
pub use url::parse_url;
