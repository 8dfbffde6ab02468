//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with every migration applied, and
//! fixture helpers that insert rows without going through the services.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{post, user};
use crate::migrations::Migrator;

/// A migrated, throwaway database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool is pinned to a single connection: every `SQLite` connection
    /// to `:memory:` opens its own empty database.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get a shared handle to the connection, as repositories expect it.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}

/// Insert a user with placeholder names and a dummy password hash.
pub async fn insert_user(conn: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(None),
        password: Set("not-a-real-hash".to_string()),
        bio: Set(String::new()),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Insert a post owned by `username`.
pub async fn insert_post(
    conn: &DatabaseConnection,
    id: &str,
    username: &str,
    caption: &str,
) -> Result<post::Model, DbErr> {
    post::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        image: Set(format!("posts/{id}.jpg")),
        caption: Set(caption.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}
