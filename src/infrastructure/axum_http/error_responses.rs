use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::errors::BillingError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Browser-facing: provider and storage detail never leaves the server.
    pub fn checkout(err: &BillingError) -> Self {
        Self {
            status: err.status_code(),
            message: err.public_message(),
        }
    }

    /// Provider-facing: any failure is a 400 so the event is redelivered,
    /// except a misconfigured secret.
    pub fn webhook(err: &BillingError) -> Self {
        let status = match err {
            BillingError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
