//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod comment;
pub mod following;
pub mod like;
pub mod post;
pub mod search;
pub mod user;

pub use auth::{AccessToken, AuthService, Claims, TokenPair, TokenType};
pub use comment::{AddCommentInput, CommentService};
pub use following::{FollowStatus, FollowingService};
pub use like::{LikeService, LikeStatus, LikeToggle};
pub use post::{CreatePostInput, PostService, PostView};
pub use search::{RecipeSearchService, recipe_title};
pub use user::{ProfileSummary, RegisterInput, UserProfile, UserSearchResult, UserService};
