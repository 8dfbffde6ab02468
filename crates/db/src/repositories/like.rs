//! Like repository.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use super::is_unique_violation;
use crate::entities::{PostLike, post_like};
use chrono::Utc;
use potluck_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Flip the like of `username` on `post_id` inside one transaction.
    ///
    /// Returns `true` when the like exists afterwards. A concurrent insert
    /// of the same like surfaces as a unique violation and resolves to `true`.
    pub async fn toggle(&self, id: String, username: &str, post_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = PostLike::find()
            .filter(post_like::Column::Username.eq(username))
            .filter(post_like::Column::PostId.eq(post_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(like) = existing {
            like.delete(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        let model = post_like::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        if Self::insert_like(&txn, model).await? {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        } else {
            tracing::debug!(username, post_id, "Like inserted concurrently");
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(true)
    }

    /// Insert a like. Returns `false` when the user already likes the post.
    async fn insert_like<C: ConnectionTrait>(
        conn: &C,
        model: post_like::ActiveModel,
    ) -> AppResult<bool> {
        match model.insert(conn).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes for many posts with one grouped query.
    ///
    /// Posts without likes are absent from the map.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(Expr::col(post_like::Column::Id).count(), "total")
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(post_like::Column::PostId)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count as u64))
            .collect())
    }

    /// Of `post_ids`, the ones `username` has liked.
    pub async fn find_liked_post_ids(
        &self,
        username: &str,
        post_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked = PostLike::find()
            .filter(post_like::Column::Username.eq(username))
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .select_only()
            .column(post_like::Column::PostId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(liked.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;

    fn create_test_like(id: &str, username: &str, post_id: &str) -> post_like::Model {
        post_like::Model {
            id: id.to_string(),
            username: username.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn count_row(post_id: &str, count: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([
            ("post_id", sea_orm::Value::from(post_id.to_string())),
            ("total", sea_orm::Value::from(count)),
        ])
    }

    #[tokio::test]
    async fn test_toggle_creates_like() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_like::Model>::new()])
                .append_query_results([[create_test_like("l1", "alice", "p1")]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert!(repo.toggle("l1".to_string(), "alice", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_deletes_like() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "alice", "p1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        assert!(!repo.toggle("l2".to_string(), "alice", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_posts_groups_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![count_row("p1", 3), count_row("p2", 1)]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let counts = repo
            .count_by_posts(&["p1".to_string(), "p2".to_string(), "p3".to_string()])
            .await
            .unwrap();

        assert_eq!(counts.get("p1"), Some(&3));
        assert_eq!(counts.get("p2"), Some(&1));
        assert_eq!(counts.get("p3"), None);
    }

    #[tokio::test]
    async fn test_find_liked_post_ids_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        let liked = repo.find_liked_post_ids("alice", &[]).await.unwrap();

        assert!(liked.is_empty());
    }

    #[tokio::test]
    async fn test_insert_like_reports_existing_like() {
        let db = crate::test_utils::TestDatabase::new().await.unwrap();
        let conn = db.connection();
        crate::test_utils::insert_user(&conn, "alice").await.unwrap();
        crate::test_utils::insert_post(&conn, "p1", "alice", "Soup").await.unwrap();

        let like = |id: &str| post_like::ActiveModel {
            id: Set(id.to_string()),
            username: Set("alice".to_string()),
            post_id: Set("p1".to_string()),
            created_at: Set(Utc::now().into()),
        };

        assert!(LikeRepository::insert_like(conn.as_ref(), like("l1")).await.unwrap());
        assert!(!LikeRepository::insert_like(conn.as_ref(), like("l2")).await.unwrap());

        let repo = LikeRepository::new(conn);
        assert_eq!(repo.count_by_post("p1").await.unwrap(), 1);
    }
}
