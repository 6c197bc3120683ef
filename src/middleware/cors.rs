use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Error, Result};

pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any)
}

/// Cookie sessions need credentialed CORS, which only works with an explicit origin.
pub fn client_cors(origin: &str) -> Result<CorsLayer> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|e| Error::Config(format!("Invalid CLIENT_ORIGIN {}: {}", origin, e)))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub fn cors_layer(client_origin: Option<&str>) -> Result<CorsLayer> {
    match client_origin {
        Some(origin) => client_cors(origin),
        None => Ok(permissive_cors()),
    }
}
