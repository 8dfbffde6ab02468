//! User repository.

use std::sync::Arc;

use super::is_unique_violation;
use crate::entities::{User, user};
use potluck_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func, LikeExpr},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(username)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username, returning an error if not found.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Check whether a username is taken.
    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        let count = User::find_by_id(username)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Find users by usernames. Order is unspecified.
    pub async fn find_by_usernames(&self, usernames: &[String]) -> AppResult<Vec<user::Model>> {
        if usernames.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Username.is_in(usernames.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user. A taken username is a validation error.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation("A user with that username already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Case-insensitive substring search over username, first name and last name.
    ///
    /// `exclude` is left out of the results. Users come back in creation order.
    pub async fn search(
        &self,
        query: &str,
        exclude: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        let escaped = query
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let matches = |column: user::Column| {
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };

        let mut condition = Condition::all().add(
            Condition::any()
                .add(matches(user::Column::Username))
                .add(matches(user::Column::FirstName))
                .add(matches(user::Column::LastName)),
        );

        if let Some(username) = exclude {
            condition = condition.add(user::Column::Username.ne(username));
        }

        User::find()
            .filter(condition)
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Username)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
