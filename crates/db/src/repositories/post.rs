//! Post repository.

use std::{collections::HashMap, sync::Arc};

use crate::entities::{Post, post};
use potluck_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Newest first, with the time-sortable id breaking timestamp ties.
fn newest_first(query: Select<Post>) -> Select<Post> {
    query
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts by a user, newest first.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Vec<post::Model>> {
        newest_first(Post::find().filter(post::Column::Username.eq(username)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts owned by any of `usernames`, newest first.
    pub async fn find_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<post::Model>> {
        if usernames.is_empty() {
            return Ok(vec![]);
        }

        newest_first(Post::find().filter(post::Column::Username.is_in(usernames.to_vec())))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The most recent posts across all users.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        self.find_recent_page(limit, 0).await
    }

    /// One page of posts across all users, newest first.
    pub async fn find_recent_page(&self, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        newest_first(Post::find())
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by a user.
    pub async fn count_by_username(&self, username: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::Username.eq(username))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts for many users with one grouped query.
    pub async fn count_by_usernames(&self, usernames: &[String]) -> AppResult<HashMap<String, u64>> {
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Post::find()
            .select_only()
            .column(post::Column::Username)
            .column_as(Expr::col(post::Column::Id).count(), "total")
            .filter(post::Column::Username.is_in(usernames.to_vec()))
            .group_by(post::Column::Username)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(username, count)| (username, count as u64))
            .collect())
    }
}
