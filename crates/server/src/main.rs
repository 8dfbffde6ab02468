//! Potluck server entry point.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use potluck_api::{AppState, auth_middleware, router as api_router};
use potluck_common::Config;
use potluck_core::{
    AuthService, CommentService, FollowingService, LikeService, PostService,
    RecipeSearchService, UserService,
};
use potluck_db::repositories::{
    CommentRepository, FollowingRepository, LikeRepository, PostRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Wire repositories into services.
fn build_state(db: &Arc<DatabaseConnection>, config: &Config) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(db));
    let following_repo = FollowingRepository::new(Arc::clone(db));
    let post_repo = PostRepository::new(Arc::clone(db));
    let like_repo = LikeRepository::new(Arc::clone(db));
    let comment_repo = CommentRepository::new(Arc::clone(db));

    let user_service =
        UserService::new(user_repo.clone(), following_repo.clone(), post_repo.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        like_repo.clone(),
        comment_repo.clone(),
        following_repo.clone(),
    );

    AppState {
        auth_service: AuthService::new(user_service.clone(), &config.auth),
        user_service,
        following_service: FollowingService::new(following_repo, user_repo),
        like_service: LikeService::new(like_repo, post_repo.clone()),
        comment_service: CommentService::new(comment_repo, post_repo.clone()),
        recipe_search_service: RecipeSearchService::new(post_repo, post_service.clone()),
        post_service,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "potluck=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting potluck server...");

    let config = Config::load().context("failed to load configuration")?;

    let db = Arc::new(potluck_db::init(&config.database).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    potluck_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = build_state(&db, &config);

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host or port")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
