use axum::{
    http::{
        HeaderValue, StatusCode,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS},
    },
    response::IntoResponse,
};
use tracing::info;

/// Headers browsers may send to the billing endpoints.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

pub async fn not_found() -> impl IntoResponse {
    info!("router: not_found handler invoked");
    (StatusCode::NOT_FOUND, "NOT_FOUND").into_response()
}

pub async fn health_check() -> impl IntoResponse {
    info!("router: health_check handler invoked");
    (StatusCode::OK, "OK").into_response()
}

/// Plain `OPTIONS` request that the CORS layer did not answer itself.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(CORS_ALLOW_HEADERS),
            ),
            (
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(CORS_ALLOW_METHODS),
            ),
        ],
    )
        .into_response()
}
