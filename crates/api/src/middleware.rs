//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use potluck_core::{
    AuthService, CommentService, FollowingService, LikeService, PostService,
    RecipeSearchService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub following_service: FollowingService,
    pub post_service: PostService,
    pub like_service: LikeService,
    pub comment_service: CommentService,
    pub recipe_search_service: RecipeSearchService,
}

/// Authentication middleware.
///
/// A valid `Authorization: Bearer <access token>` places the caller's user record in the
/// request extensions. Missing or invalid credentials leave the request anonymous; handlers
/// that require a caller reject it through [`crate::extractors::AuthUser`]. A lookup that
/// fails on the server side ends the request with that error.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.auth_service.authenticate_access(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => return e.into_response(),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
            }
        }
    }

    next.run(req).await
}
