//! Following repository.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use super::is_unique_violation;
use crate::entities::{Following, following};
use chrono::Utc;
use potluck_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a following relationship by follower and followee.
    pub async fn find_by_pair(
        &self,
        follower: &str,
        followee: &str,
    ) -> AppResult<Option<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerUsername.eq(follower))
            .filter(following::Column::FolloweeUsername.eq(followee))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower: &str, followee: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower, followee).await?.is_some())
    }

    /// Flip the edge `follower -> followee` inside one transaction.
    ///
    /// Returns `true` when the edge exists afterwards. A unique violation
    /// means a concurrent request inserted the same edge first, so the edge
    /// is present and the result is `true` as well.
    pub async fn toggle(&self, id: String, follower: &str, followee: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Following::find()
            .filter(following::Column::FollowerUsername.eq(follower))
            .filter(following::Column::FolloweeUsername.eq(followee))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(edge) = existing {
            edge.delete(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        let model = following::ActiveModel {
            id: Set(id),
            follower_username: Set(follower.to_string()),
            followee_username: Set(followee.to_string()),
            created_at: Set(Utc::now().into()),
        };

        if Self::insert_edge(&txn, model).await? {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        } else {
            tracing::debug!(follower, followee, "Follow edge inserted concurrently");
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(true)
    }

    /// Insert an edge. Returns `false` when the pair is already present.
    async fn insert_edge<C: ConnectionTrait>(
        conn: &C,
        model: following::ActiveModel,
    ) -> AppResult<bool> {
        match model.insert(conn).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Usernames `username` follows, oldest edge first.
    pub async fn find_followee_usernames(&self, username: &str) -> AppResult<Vec<String>> {
        Following::find()
            .filter(following::Column::FollowerUsername.eq(username))
            .order_by_asc(following::Column::CreatedAt)
            .order_by_asc(following::Column::Id)
            .select_only()
            .column(following::Column::FolloweeUsername)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Usernames following `username`, oldest edge first.
    pub async fn find_follower_usernames(&self, username: &str) -> AppResult<Vec<String>> {
        Following::find()
            .filter(following::Column::FolloweeUsername.eq(username))
            .order_by_asc(following::Column::CreatedAt)
            .order_by_asc(following::Column::Id)
            .select_only()
            .column(following::Column::FollowerUsername)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of `candidates`, the ones `follower` follows.
    pub async fn find_followed_among(
        &self,
        follower: &str,
        candidates: &[String],
    ) -> AppResult<HashSet<String>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let followed = Following::find()
            .filter(following::Column::FollowerUsername.eq(follower))
            .filter(following::Column::FolloweeUsername.is_in(candidates.to_vec()))
            .select_only()
            .column(following::Column::FolloweeUsername)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(followed.into_iter().collect())
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, username: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::FolloweeUsername.eq(username))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers for many users with one grouped query.
    ///
    /// Users without followers are absent from the map.
    pub async fn count_followers_by_users(
        &self,
        usernames: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Following::find()
            .select_only()
            .column(following::Column::FolloweeUsername)
            .column_as(Expr::col(following::Column::Id).count(), "total")
            .filter(following::Column::FolloweeUsername.is_in(usernames.to_vec()))
            .group_by(following::Column::FolloweeUsername)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(username, count)| (username, count as u64))
            .collect())
    }

    /// Count following of a user.
    pub async fn count_following(&self, username: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::FollowerUsername.eq(username))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
