//! Following endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use potluck_common::AppResult;
use potluck_core::{FollowStatus, ProfileSummary};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow toggle response.
#[derive(Serialize)]
pub struct FollowResponse {
    pub status: FollowStatus,
}

/// Follow `username`, or unfollow if already following.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let status = state
        .following_service
        .toggle_follow(&user.username, &username)
        .await?;
    Ok(ApiResponse::ok(FollowResponse { status }))
}

/// Users following `username`.
async fn followers(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let users = state
        .following_service
        .list_followers(&username, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(users))
}

/// Users `username` follows.
async fn following(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<ProfileSummary>>> {
    let users = state
        .following_service
        .list_following(&username, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{username}/follow", post(toggle))
        .route("/user/{username}/followers", get(followers))
        .route("/user/{username}/following", get(following))
}
