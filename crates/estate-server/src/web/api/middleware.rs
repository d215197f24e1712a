use crate::auth::validate_access_token;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use estate_common::models::auth::Claims;
use std::sync::Arc;
use uuid::Uuid;

/// Extractor that validates a JWT Bearer token and provides the claims.
///
/// A missing header, or one not of the form `Bearer <token>`, is rejected as
/// `Unauthorized`; a token that fails verification as `InvalidToken`.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.0.sub
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` value
fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Some(token),
        _ => None,
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        match validate_access_token(token, state.jwt_secret()) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {:#}", e);
                Err(ApiError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_access_token;
    use crate::state::testing::{test_state, TEST_JWT_SECRET};
    use axum::{body::Body, http::Request, routing::get, Json, Router};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn whoami(auth: AuthUser) -> Json<Value> {
        Json(json!({"id": auth.user_id(), "email": auth.0.email}))
    }

    fn router() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .with_state(test_state(None))
    }

    async fn call(auth_header: Option<String>) -> (u16, Value) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = auth_header {
            builder = builder.header("Authorization", value);
        }
        let response = router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
    }

    #[tokio::test]
    async fn test_missing_header_unauthorized() {
        let (status, body) = call(None).await;
        assert_eq!(status, 401);
        assert_eq!(body["message"], "Access denied. No token provided.");
    }

    #[tokio::test]
    async fn test_raw_token_without_scheme_unauthorized() {
        let token = create_access_token(Uuid::new_v4(), "a@b.c", TEST_JWT_SECRET, 900).unwrap();
        let (status, _) = call(Some(token)).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let (status, body) = call(Some("Bearer not-a-jwt".to_string())).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Invalid token.");

        let foreign = create_access_token(Uuid::new_v4(), "a@b.c", "other-secret", 900).unwrap();
        let (status, _) = call(Some(format!("Bearer {}", foreign))).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token =
            create_access_token(Uuid::new_v4(), "a@b.c", TEST_JWT_SECRET, -3600).unwrap();
        let (status, _) = call(Some(format!("Bearer {}", token))).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_valid_token_exposes_claims() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, "u@test.com", TEST_JWT_SECRET, 900).unwrap();
        let (status, body) = call(Some(format!("Bearer {}", token))).await;
        assert_eq!(status, 200);
        assert_eq!(body["id"], user_id.to_string());
        assert_eq!(body["email"], "u@test.com");
    }
}
