/// HTMX utils
use axum::http::{HeaderMap, HeaderValue};

/// Fired on `body` whenever a mutation leaves the rendered note lists stale.
/// Both the home grid and the archive grid listen for it.
pub const RELOAD_NOTES: &str = "reload-notes";

pub fn trigger(event: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Hx-Trigger", HeaderValue::from_static(event));
    headers
}

pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.contains_key("Hx-Request")
}
