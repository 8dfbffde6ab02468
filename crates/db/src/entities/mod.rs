//! Database entities.

pub mod comment;
pub mod following;
pub mod post;
pub mod post_like;
pub mod user;

pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use user::Entity as User;
