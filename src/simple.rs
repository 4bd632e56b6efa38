//! Public one-shot façade: "download URL → bytes".

use crate::error::{HttpError, Result};
use crate::pool::Manager;
use crate::redirect::http_lbs_redirect;
use crate::url::parse_url;

/// Parses `url`, follows redirects, and returns the final response body.
/// Fails with [`HttpError::StatusCode`] if the final response is not 2xx.
pub fn simple_http(url: &str) -> Result<Vec<u8>> {
    let request = parse_url(url)?;

    Manager::with_manager(|manager| {
        let response = http_lbs_redirect(&request, manager)?;
        if (200..300).contains(&response.status_code) {
            Ok(response.body)
        } else {
            Err(HttpError::StatusCode {
                status_code: response.status_code,
                body: response.body,
            })
        }
    })
}
