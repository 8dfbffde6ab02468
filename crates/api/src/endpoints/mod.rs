//! API endpoints.

mod auth;
mod following;
mod interactions;
mod posts;
mod search;
mod users;

use axum::{Router, http::Uri};
use potluck_common::AppError;

use crate::middleware::AppState;

/// Unknown paths get the same JSON error body as every other failure.
async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(following::router())
        .merge(posts::router())
        .merge(interactions::router())
        .merge(search::router())
        .fallback(fallback)
}
