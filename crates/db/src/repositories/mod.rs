//! Repositories: one per entity, returning plain records.

mod comment;
mod following;
mod like;
mod post;
mod user;

pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use like::LikeRepository;
pub use post::PostRepository;
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};

/// Whether `err` was raised by a unique index or primary key.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
