//! Cross-origin policy.
//!
//! Browsers on the allowed origins may call the service with credentials
//! using `GET` or `POST`. Requests from any other origin get no CORS headers,
//! so the browser refuses to hand the response to the page.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Builds the CORS layer for the given origin allow-list.
///
/// Request headers are mirrored back rather than allowed with `*`, since a
/// wildcard is not permitted together with credentials.
pub fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
