use crate::app_state::AppState;
use attendly_primitives::error::ApiError;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::extract::State;
use http::HeaderMap;
use secrecy::ExposeSecret;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub struct SecurityConfig;

impl SecurityConfig {
    fn extract_admin_key(headers: &HeaderMap) -> Result<String, ApiError> {
        let key = headers
            .get("x-admin-key")
            .ok_or_else(|| ApiError::Auth("Missing admin key".into()))?
            .to_str()
            .map_err(|_| ApiError::Auth("Malformed admin key".into()))?
            .trim();

        if key.is_empty() {
            return Err(ApiError::Auth("Missing admin key".into()));
        }

        Ok(key.to_string())
    }

    pub fn verify_admin_key(state: &AppState, presented: &str) -> Result<(), ApiError> {
        let expected = state.config.admin_details.admin_api_key.expose_secret();

        if presented.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
            return Err(ApiError::Auth("Invalid admin key".into()));
        }

        Ok(())
    }

    /// Guards the admin surface (reconciliation). Key comes from the
    /// `x-admin-key` header and is compared in constant time.
    pub async fn admin_middleware(
        State(state): State<Arc<AppState>>,
        req: Request<axum::body::Body>,
        next: Next,
    ) -> Result<Response, Response> {
        let key = Self::extract_admin_key(req.headers()).map_err(|e| e.into_response())?;

        Self::verify_admin_key(&state, &key).map_err(|e| e.into_response())?;

        Ok(next.run(req).await)
    }
}
