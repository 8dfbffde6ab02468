//! Like service.

use potluck_common::{AppResult, IdGenerator};
use potluck_db::repositories::{LikeRepository, PostRepository};
use serde::Serialize;

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// State of the like after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeStatus {
    Liked,
    Unliked,
}

/// Result of toggling a like.
#[derive(Debug, Clone, Serialize)]
pub struct LikeToggle {
    pub status: LikeStatus,
    pub likes_count: u64,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like the post if `caller` has not liked it yet, unlike it otherwise.
    pub async fn toggle_like(&self, caller: &str, post_id: &str) -> AppResult<LikeToggle> {
        self.post_repo.get_by_id(post_id).await?;

        let liked = self
            .like_repo
            .toggle(self.id_gen.generate(), caller, post_id)
            .await?;
        let likes_count = self.like_repo.count_by_post(post_id).await?;

        let status = if liked {
            LikeStatus::Liked
        } else {
            LikeStatus::Unliked
        };
        tracing::info!(username = %caller, post_id, ?status, likes_count, "Toggled like");

        Ok(LikeToggle {
            status,
            likes_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use potluck_common::AppError;
    use potluck_db::entities::post;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_like_missing_post_returns_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = LikeService::new(LikeRepository::new(db.clone()), PostRepository::new(db));

        let result = service.toggle_like("alice", "missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[test]
    fn test_like_toggle_serializes() {
        let toggle = LikeToggle {
            status: LikeStatus::Liked,
            likes_count: 1,
        };

        let json = serde_json::to_value(&toggle).unwrap();
        assert_eq!(json["status"], "liked");
        assert_eq!(json["likes_count"], 1);
    }
}
