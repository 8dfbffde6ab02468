//! Post endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use potluck_common::AppResult;
use potluck_core::{CreatePostInput, PostView};

use crate::{
    extractors::{AuthUser, Json, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Posts by the caller and everyone they follow.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state.post_service.feed(&user.username).await?;
    Ok(ApiResponse::ok(posts))
}

/// Most recent posts across all users.
async fn explore(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state.post_service.explore(viewer.username()).await?;
    Ok(ApiResponse::ok(posts))
}

/// Create a post owned by the caller.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state.post_service.create(&user.username, req).await?;
    Ok(ApiResponse::created(post))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(feed))
        .route("/explore", get(explore))
        .route("/posts/create", post(create))
}
