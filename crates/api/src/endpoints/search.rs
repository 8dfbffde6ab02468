//! Recipe search endpoint.

use axum::{
    Router,
    extract::State,
    routing::get,
};
use potluck_common::AppResult;
use potluck_core::PostView;

use crate::{
    endpoints::users::SearchQuery,
    extractors::{AuthUser, Query},
    middleware::AppState,
    response::ApiResponse,
};

/// Posts whose recipe title contains the query.
async fn recipes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state
        .recipe_search_service
        .search(&query.query, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(posts))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/recipes/search", get(recipes))
}
