//! Error-to-HTTP translation.
//!
//! The domain error already carries the wire message as its `Display` impl;
//! this module only decides the status code and the JSON shape. Database
//! faults are the exception: their detail goes to the log, never to the
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nw_core::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            // 400 Bad Request
            Error::BadRequest => StatusCode::BAD_REQUEST,
            Error::InvalidSortQuery => StatusCode::BAD_REQUEST,
            Error::InvalidOrderQuery => StatusCode::BAD_REQUEST,

            // 404 Not Found
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::ArticleNotFound => StatusCode::NOT_FOUND,
            Error::CommentNotFound => StatusCode::NOT_FOUND,
            Error::TopicNotFound => StatusCode::NOT_FOUND,
            Error::VotesNotFound => StatusCode::NOT_FOUND,
            Error::UserNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every failed request answers with this shape.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let msg = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { msg })).into_response()
    }
}
