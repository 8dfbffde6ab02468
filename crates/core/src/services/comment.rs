//! Comment service.

use chrono::Utc;
use potluck_common::{AppError, AppResult, IdGenerator};
use potluck_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize)]
pub struct AddCommentInput {
    #[serde(default)]
    pub text: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post. The text is stored trimmed.
    pub async fn add_comment(
        &self,
        caller: &str,
        post_id: &str,
        input: AddCommentInput,
    ) -> AppResult<comment::Model> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation(
                "Comment text cannot be empty".to_string(),
            ));
        }

        self.post_repo.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(caller.to_string()),
            post_id: Set(post_id.to_string()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::info!(comment_id = %comment.id, post_id, username = %caller, "Added comment");

        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use potluck_db::entities::post;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_with(db: MockDatabase) -> CommentService {
        let db = Arc::new(db.into_connection());
        CommentService::new(CommentRepository::new(db.clone()), PostRepository::new(db))
    }

    fn input(text: &str) -> AddCommentInput {
        AddCommentInput {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_blank_comment_is_rejected_before_lookup() {
        // No query results queued: any database access would fail the test.
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.add_comment("alice", "p1", input(" \n\t ")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
        );

        let result = service.add_comment("alice", "missing", input("Yum")).await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_is_stored_trimmed() {
        let now = Utc::now();
        let post = post::Model {
            id: "p1".to_string(),
            username: "bob".to_string(),
            image: "p1.jpg".to_string(),
            caption: String::new(),
            created_at: now.into(),
        };
        let stored = comment::Model {
            id: "c1".to_string(),
            username: "alice".to_string(),
            post_id: "p1".to_string(),
            text: "Yum".to_string(),
            created_at: now.into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_query_results([[stored]])
                .into_connection(),
        );
        let service =
            CommentService::new(CommentRepository::new(db.clone()), PostRepository::new(db.clone()));

        let comment = service.add_comment("alice", "p1", input("  Yum  ")).await.unwrap();
        assert_eq!(comment.text, "Yum");
        drop(service);

        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let insert = format!("{:?}", log[1]);
        assert!(insert.contains("INSERT"));
        assert!(insert.contains("\"Yum\""));
        assert!(!insert.contains("  Yum  "));
    }
}
