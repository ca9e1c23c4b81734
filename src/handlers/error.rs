// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// store_id or product_id absent from both query string and body.
    MissingKey,
    /// Declared body length over the route's limit.
    PayloadTooLarge,
    /// Chunked body with no declared length.
    LengthRequired,
    /// Anything else that went wrong while handling the request.
    Internal,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_key() -> Self {
        ApiError::new(ApiErrorKind::MissingKey, "Missing store_id or product_id")
    }

    pub fn payload_too_large(limit: u64) -> Self {
        ApiError::new(
            ApiErrorKind::PayloadTooLarge,
            format!("Request body exceeds {} bytes", limit),
        )
    }

    pub fn length_required() -> Self {
        ApiError::new(ApiErrorKind::LengthRequired, "Request body must declare a content-length")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ApiErrorKind::Internal, message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::MissingKey => StatusCode::BAD_REQUEST,
            ApiErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorKind::LengthRequired => StatusCode::LENGTH_REQUIRED,
            ApiErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
