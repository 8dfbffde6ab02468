//! HTTP API layer for potluck.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: accounts, profiles, the follow graph, posts, likes, comments and search
//! - **Extractors**: authenticated and optional callers
//! - **Middleware**: bearer token authentication and shared state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
