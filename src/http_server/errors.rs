//! # HTTP Errors
//!
//! Maps service errors onto status codes and a JSON body
//! `{"error": ..., "code": ...}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::feature::FeatureError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // 400 Bad Request
    // ==================
    /// Body is not JSON
    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    /// Query string or path segment could not be parsed
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    // ==================
    // 422 Unprocessable
    // ==================
    /// Body is JSON but not the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // ==================
    // Service
    // ==================
    #[error(transparent)]
    Feature(#[from] FeatureError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Feature(e) => match e {
                FeatureError::LimitExceeded(_, _) => StatusCode::BAD_REQUEST,
                FeatureError::NotFound { .. } => StatusCode::NOT_FOUND,
                e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "GEO_MALFORMED_BODY",
            ApiError::InvalidQueryParam(_) => "GEO_INVALID_QUERY_PARAM",
            ApiError::InvalidBody(_) => "GEO_INVALID_BODY",
            ApiError::Feature(e) => e.code(),
        }
    }

    /// Display of this error and each of its sources
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(source) = current {
            chain.push(source.to_string());
            current = source.source();
        }
        chain.push(format!("{:?}", self));
        chain
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::InvalidBody(e.body_text()),
            other => ApiError::MalformedBody(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQueryParam(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidQueryParam(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Source chain, only for 500s in debug mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

/// Attached to error responses so the reporting layer can log them and,
/// in debug mode, add the trace
#[derive(Debug, Clone)]
pub struct FailureDetails {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub trace: Vec<String>,
}

impl FailureDetails {
    pub fn to_response(&self, with_trace: bool) -> Response {
        let body = ErrorResponse {
            error: self.error.clone(),
            code: self.status.as_u16(),
            trace: with_trace.then(|| self.trace.clone()),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = FailureDetails {
            status: self.status_code(),
            code: self.error_code(),
            error: self.to_string(),
            trace: self.source_chain(),
        };
        let mut response = details.to_response(false);
        response.extensions_mut().insert(details);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MalformedBody("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FeatureError::LimitExceeded(5000, 1000)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(FeatureError::from(GeometryError::LatitudeOutOfRange(91.0)))
                .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(FeatureError::not_found("Point", 1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(FeatureError::from(StoreError::Connection("refused".into())))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(FeatureError::from(GeometryError::MalformedWkt("x".into())))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_trace_hidden_by_default() {
        let body = ErrorResponse {
            error: "boom".into(),
            code: 500,
            trace: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("trace").is_none());
    }

    #[test]
    fn test_source_chain_starts_with_message() {
        let err = ApiError::from(FeatureError::from(StoreError::Geometry(
            GeometryError::SridMismatch(3857),
        )));
        let chain = err.source_chain();
        assert_eq!(chain[0], err.to_string());
        assert!(chain.len() >= 2);
    }
}
