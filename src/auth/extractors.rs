use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tracing::warn;

use crate::auth::claims::{Claims, Role};
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;

/// Extracts and validates the bearer JWT, rejecting non-admin callers.
/// Runs before the request body is touched, so authentication and
/// authorization failures short-circuit ahead of any validation.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated("Unauthorized: Not authenticated".into())
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| {
                ApiError::Unauthenticated("Unauthorized: Not authenticated".into())
            })?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(ApiError::Unauthenticated(
                    "Unauthorized: Not authenticated".into(),
                ));
            }
        };

        if claims.role != Role::Admin {
            warn!(user_id = %claims.sub, "non-admin caller rejected");
            return Err(ApiError::Forbidden("Forbidden: admin access required".into()));
        }

        Ok(AdminUser(claims))
    }
}
