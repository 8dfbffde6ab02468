//! User endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use potluck_common::AppResult;
use potluck_core::{PostView, UserProfile, UserSearchResult};
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser, Query},
    middleware::AppState,
    response::ApiResponse,
};

/// Search query string.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Get a user's profile.
async fn profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .user_service
        .get_profile(&username, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// List a user's posts, newest first.
async fn posts(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state
        .post_service
        .list_by_user(&username, viewer.username())
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// Search users by username or name.
async fn search(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<UserSearchResult>>> {
    let users = state
        .user_service
        .search(&query.query, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user_data/{username}", get(profile))
        .route("/user/{username}/posts", get(posts))
        .route("/users/search", get(search))
}
