use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::extract::ApiJson;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use estate_common::models::auth::{Credentials, LoginResponse, TokenUser, User};
use estate_common::validation::validate_credentials;
use estate_db::UserRepo;
use std::sync::Arc;
use uuid::Uuid;

/// POST /api/auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    validate_credentials(&req)?;
    let email = req.email.trim();

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::upstream("Registration failed", e))?;

    let user = UserRepo::create(&state.pool, Uuid::new_v4(), email, &password_hash)
        .await
        .map_err(|e| ApiError::upstream("Registration failed", e))?
        .ok_or(ApiError::Conflict("Email already registered"))?;

    tracing::info!("Registered user {}", user.user_id);
    Ok((StatusCode::CREATED, Json(User::from(user))))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_credentials(&req)?;

    let user = UserRepo::get_by_email(&state.pool, req.email.trim())
        .await
        .map_err(|e| ApiError::upstream("Login failed", e))?
        .ok_or(ApiError::InvalidCredentials)?;

    let matches = verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::upstream("Login failed", e))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_access_token(
        user.user_id,
        &user.email,
        state.jwt_secret(),
        state.config.auth.token_ttl_secs,
    )
    .map_err(|e| ApiError::upstream("Login failed", e))?;

    Ok(Json(LoginResponse {
        token,
        user: TokenUser {
            id: user.user_id,
            email: user.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::state::testing::test_state;
    use crate::web::api::build_api_routes;
    use axum::{body::Body, http::Request, Router};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post(uri: &str, content_type: Option<&str>, body: String) -> (u16, Value) {
        let router = Router::new().nest("/api", build_api_routes(test_state(None)));
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(value) = content_type {
            builder = builder.header("Content-Type", value);
        }
        let response = router
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // The lazy pool never connects; each case is rejected before the store.

    #[tokio::test]
    async fn test_register_wrong_type_is_json_400() {
        let body = json!({"email": 5, "password": "pw"}).to_string();
        let (status, body) = post("/api/auth/register", Some("application/json"), body).await;
        assert_eq!(status, 400);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_login_without_content_type_is_json_400() {
        let body = json!({"email": "a@b.c", "password": "pw"}).to_string();
        let (status, body) = post("/api/auth/login", None, body).await;
        assert_eq!(status, 400);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Content-Type: application/json"));
    }

    #[tokio::test]
    async fn test_login_missing_password_rejected() {
        let body = json!({"email": "a@b.c"}).to_string();
        let (status, body) = post("/api/auth/login", Some("application/json"), body).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Email and password are required");
    }
}
