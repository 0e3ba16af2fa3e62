use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum ApiError {
    Database(diesel::result::Error),
    DatabaseConnection(String),
    Validation(validator::ValidationErrors),
    BadRequest(String),
    Signature(String),
    Auth(String),
    NotFound(String),
    Payment(String),
    Gateway(String),
    Internal(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Validation(e) => write!(f, "Validation error: {}", e),
            ApiError::BadRequest(e) => write!(f, "Bad request: {}", e),
            ApiError::Signature(e) => write!(f, "Signature error: {}", e),
            ApiError::Auth(e) => write!(f, "Authentication error: {}", e),
            ApiError::NotFound(e) => write!(f, "Not found: {}", e),
            ApiError::Payment(e) => write!(f, "Payment error: {}", e),
            ApiError::Gateway(e) => write!(f, "Gateway error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Gateway(err.to_string())
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Database(e) => match e {
                diesel::result::Error::NotFound => {
                    (StatusCode::NOT_FOUND, "Record not found".to_string())
                }
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => (StatusCode::BAD_REQUEST, format!("Database error: {}", e)),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", e),
                ),
            },
            ApiError::DatabaseConnection(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database connection error: {}", e),
            ),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                format!("Validation error: {}", errors),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Signature(msg) => {
                (StatusCode::BAD_REQUEST, format!("Signature error: {}", msg))
            }
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, format!("Auth error: {}", msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Payment(msg) => (StatusCode::BAD_REQUEST, format!("Payment error: {}", msg)),
            ApiError::Gateway(msg) => (StatusCode::BAD_GATEWAY, format!("Gateway error: {}", msg)),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", msg),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error): (StatusCode, String) = self.into();
        (status, Json(ApiErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_errors_map_to_bad_request() {
        let (status, _): (StatusCode, String) = ApiError::Signature("mismatch".into()).into();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_payment_maps_to_not_found() {
        let (status, _): (StatusCode, String) =
            ApiError::NotFound("No payment for order".into()).into();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn gateway_failures_map_to_bad_gateway() {
        let (status, _): (StatusCode, String) = ApiError::Gateway("connect timeout".into()).into();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn ledger_write_failures_are_internal() {
        let (status, _): (StatusCode, String) =
            ApiError::DatabaseConnection("pool exhausted".into()).into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
