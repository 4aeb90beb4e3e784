use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::types::ErrorResponse;

/// Body sent for any fault the handlers did not anticipate (a handler panic).
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid userId")]
    InvalidUserId,
    #[error("Username and age are required fields")]
    MissingFields,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("User not found")]
    UserNotFound,
    #[error("Endpoint not found")]
    EndpointNotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidUserId | ApiError::MissingFields | ApiError::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UserNotFound | ApiError::EndpointNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();

        (self.status_code(), Json(ErrorResponse { error })).into_response()
    }
}
