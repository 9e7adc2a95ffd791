//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::AppState;
use veritax_db::UserRepository;
use veritax_shared::Identity;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Uniform 401 response.
///
/// Credential failures are not differentiated: a missing header, a
/// malformed or expired token, and an unknown subject all produce the
/// same body.
fn unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Could not validate credentials"
        })),
    )
}

/// Authentication middleware that verifies bearer credentials.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Resolves the subject against the user directory
/// 4. Stores the verified [`Identity`] in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized().into_response();
    };

    let Ok(claims) = state.jwt_service.validate_token(token) else {
        return unauthorized().into_response();
    };

    let users = UserRepository::new((*state.db).clone());
    match users.find_by_email(claims.email()).await {
        Ok(Some(user)) if user.is_active => {
            request.extensions_mut().insert(Identity::new(user.email));
            next.run(request).await
        }
        Ok(_) => unauthorized().into_response(),
        Err(error) => {
            // A directory failure must not leak detail to the caller.
            error!(%error, "user directory lookup failed");
            unauthorized().into_response()
        }
    }
}

/// Extractor for the verified document owner.
///
/// Use this in handlers behind [`auth_middleware`]:
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     let owner = user.identity();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl CurrentUser {
    /// Returns the verified identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Returns the subject email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.0.email()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("abc123"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_unauthorized_shape() {
        let (status, Json(body)) = unauthorized();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_credentials");
        assert_eq!(body["message"], "Could not validate credentials");
    }
}
