//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use potluck_common::AppResult;
use potluck_core::{AccessToken, RegisterInput, TokenPair};
use potluck_db::entities::user;
use serde::Deserialize;

use crate::{extractors::Json, middleware::AppState, response::ApiResponse};

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Create a new user account.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.register(req).await?;
    Ok(ApiResponse::created(user))
}

/// Exchange credentials for an access and refresh token.
async fn token(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<TokenPair>> {
    let pair = state
        .auth_service
        .login(&req.username, &req.password)
        .await?;
    Ok(ApiResponse::ok(pair))
}

/// Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<ApiResponse<AccessToken>> {
    let access = state.auth_service.refresh(&req.refresh).await?;
    Ok(ApiResponse::ok(access))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/token", post(token))
        .route("/token/refresh", post(refresh))
}
