//! Fallback handlers for requests that do not match a route.

use axum::{http::StatusCode, response::Response};

use crate::ApiResponse;

/// The fallback route handler for paths that do not match any endpoint.
pub async fn get_404_not_found() -> Response {
    ApiResponse::error("Not found").into_response_with(StatusCode::NOT_FOUND)
}

/// The fallback for a known path requested with a method it does not support.
pub async fn get_405_method_not_allowed() -> Response {
    ApiResponse::error("Method not allowed").into_response_with(StatusCode::METHOD_NOT_ALLOWED)
}
