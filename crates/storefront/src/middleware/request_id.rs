//! Request ID propagation for log and error correlation.
//!
//! Every response carries an `x-request-id`. An id supplied by an upstream
//! proxy is reused so the whole hop chain correlates, but only after
//! validation - a hostile client must not be able to inject arbitrary bytes
//! into log lines and Sentry tags through this header.

use axum::{extract::Request, http::HeaderMap, http::HeaderName, http::HeaderValue,
    middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request id, inbound and outbound.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream id accepted before we mint our own.
const MAX_ID_LENGTH: usize = 64;

/// An upstream-supplied request id, if it is safe to reuse.
///
/// Accepts ASCII alphanumerics and hyphens only (UUIDs and the id formats
/// of common proxies all fit); anything else is treated as absent.
fn propagated_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(&REQUEST_ID_HEADER)?.to_str().ok()?;
    let acceptable = !value.is_empty()
        && value.len() <= MAX_ID_LENGTH
        && value
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-');
    acceptable.then(|| value.to_owned())
}

/// Attach a request id to the current span, the Sentry scope and the
/// response headers, minting a UUID v4 when the client sent none.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        propagated_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    // The accepted alphabet is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(&REQUEST_ID_HEADER, value);
    }

    response
}
