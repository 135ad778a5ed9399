use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::future::Future;
use std::sync::Arc;

use crate::{
    auth::{self, EmployeeRole},
    AppError, AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedEmployee {
    pub employee_id: i32,
    pub role: EmployeeRole,
}

impl AuthenticatedEmployee {
    pub fn is_manager(&self) -> bool {
        self.role == EmployeeRole::Manager
    }
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedEmployee {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();
        let state = state.clone();

        async move {
            let bearer = bearer.ok_or_else(|| {
                AppError::Unauthorized("Missing authentication: no Bearer token in Authorization header".to_string())
            })?;

            let claims = auth::validate_access_token(
                bearer.token(),
                &state.config.jwt_secret,
                state.config.jwt_issuer.as_deref(),
            )
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AppError::Unauthorized(e)
            })?;

            let employee_id: i32 = claims.sub.parse().map_err(|_| {
                tracing::warn!(sub = %claims.sub, "Access token subject is not an employee id");
                AppError::Unauthorized(format!("Invalid subject in token: {}", claims.sub))
            })?;

            tracing::debug!(employee_id, role = ?claims.role, "Employee authenticated");

            Ok(AuthenticatedEmployee {
                employee_id,
                role: claims.role,
            })
        }
    }
}
