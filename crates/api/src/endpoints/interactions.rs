//! Like and comment endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::post,
};
use potluck_common::AppResult;
use potluck_core::{AddCommentInput, LikeStatus, LikeToggle};
use potluck_db::entities::comment;

use crate::{
    extractors::{AuthUser, Json},
    middleware::AppState,
    response::ApiResponse,
};

/// Like a post, or remove the like. Answers 201 when a like was created.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<LikeToggle>> {
    let toggle = state
        .like_service
        .toggle_like(&user.username, &post_id)
        .await?;

    Ok(match toggle.status {
        LikeStatus::Liked => ApiResponse::created(toggle),
        LikeStatus::Unliked => ApiResponse::ok(toggle),
    })
}

/// Comment on a post.
async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<AddCommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .add_comment(&user.username, &post_id, req)
        .await?;
    Ok(ApiResponse::created(comment))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/like", post(like))
        .route("/posts/{id}/comment", post(comment))
}
