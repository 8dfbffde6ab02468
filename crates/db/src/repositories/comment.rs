//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use potluck_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments on many posts, oldest first within each post.
    pub async fn find_by_posts(&self, post_ids: &[String]) -> AppResult<Vec<comment::Model>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        Comment::find()
            .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Set};

    fn create_test_comment(id: &str, post_id: &str, text: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            username: "alice".to_string(),
            post_id: post_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let comment = create_test_comment("c1", "p1", "Looks great");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let active = comment::ActiveModel {
            id: Set("c1".to_string()),
            username: Set("alice".to_string()),
            post_id: Set("p1".to_string()),
            text: Set("Looks great".to_string()),
            created_at: Set(comment.created_at),
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.text, "Looks great");
    }

    #[tokio::test]
    async fn test_find_by_posts_keeps_query_order() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_comment("c1", "p1", "first"),
                    create_test_comment("c2", "p2", "second"),
                    create_test_comment("c3", "p1", "third"),
                ]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let comments = repo
            .find_by_posts(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();

        let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }
}
