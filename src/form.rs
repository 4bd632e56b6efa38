//! URL-encoded form body helper.

use crate::request::{Request, RequestBody};
use crate::url::percent_encode;

/// Turns `request` into a `POST` with an `application/x-www-form-urlencoded`
/// body built from `pairs`. A pair with an empty value is rendered as the
/// bare key (no trailing `=`), matching [`crate::url::percent_encode`]'s
/// legacy space-as-`+` table.
pub fn url_encoded_body(pairs: &[(String, String)], request: Request) -> Request {
    let mut body = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            body.push('&');
        }
        body.push_str(&percent_encode(key));
        if !value.is_empty() {
            body.push('=');
            body.push_str(&percent_encode(value));
        }
    }

    let mut request = request.with_method("POST").with_body(RequestBody::Bytes(body.into_bytes()));
    request.headers_mut().remove("Content-Type");
    request.headers_mut().insert("Content-Type", "application/x-www-form-urlencoded");
    request
}
