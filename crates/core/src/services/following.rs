//! Following service.

use std::collections::HashMap;

use potluck_common::{AppError, AppResult, IdGenerator};
use potluck_db::repositories::{FollowingRepository, UserRepository};
use serde::Serialize;

use crate::services::user::ProfileSummary;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// State of the follow edge after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Followed,
    Unfollowed,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow `target` if `caller` does not follow them yet, unfollow otherwise.
    pub async fn toggle_follow(&self, caller: &str, target: &str) -> AppResult<FollowStatus> {
        if caller == target {
            return Err(AppError::InvalidOperation(
                "Cannot follow yourself".to_string(),
            ));
        }

        self.user_repo.get_by_username(target).await?;

        let followed = self
            .following_repo
            .toggle(self.id_gen.generate(), caller, target)
            .await?;

        let status = if followed {
            FollowStatus::Followed
        } else {
            FollowStatus::Unfollowed
        };
        tracing::info!(follower = %caller, followee = %target, ?status, "Toggled follow");

        Ok(status)
    }

    /// Users following `username`.
    pub async fn list_followers(
        &self,
        username: &str,
        viewer: Option<&str>,
    ) -> AppResult<Vec<ProfileSummary>> {
        self.user_repo.get_by_username(username).await?;
        let usernames = self.following_repo.find_follower_usernames(username).await?;
        self.summarize(usernames, viewer).await
    }

    /// Users `username` follows.
    pub async fn list_following(
        &self,
        username: &str,
        viewer: Option<&str>,
    ) -> AppResult<Vec<ProfileSummary>> {
        self.user_repo.get_by_username(username).await?;
        let usernames = self.following_repo.find_followee_usernames(username).await?;
        self.summarize(usernames, viewer).await
    }

    /// Load summaries for `usernames`, keeping their order.
    async fn summarize(
        &self,
        usernames: Vec<String>,
        viewer: Option<&str>,
    ) -> AppResult<Vec<ProfileSummary>> {
        let mut users: HashMap<String, _> = self
            .user_repo
            .find_by_usernames(&usernames)
            .await?
            .into_iter()
            .map(|u| (u.username.clone(), u))
            .collect();

        let followed = match viewer {
            Some(viewer) => {
                self.following_repo
                    .find_followed_among(viewer, &usernames)
                    .await?
            }
            None => Default::default(),
        };

        Ok(usernames
            .into_iter()
            .filter_map(|name| users.remove(&name))
            .map(|u| ProfileSummary {
                is_following: followed.contains(&u.username),
                username: u.username,
                first_name: u.first_name,
                last_name: u.last_name,
                bio: u.bio,
                profile_image: u.profile_image,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use potluck_db::entities::{following, user};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(username: &str) -> user::Model {
        user::Model {
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            password: "hash".to_string(),
            bio: String::new(),
            profile_image: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: MockDatabase) -> FollowingService {
        let db = Arc::new(db.into_connection());
        FollowingService::new(FollowingRepository::new(db.clone()), UserRepository::new(db))
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.toggle_follow("alice", "alice").await;

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user_returns_not_found() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.toggle_follow("alice", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_follow_creates_edge() {
        let edge = following::Model {
            id: "e1".to_string(),
            follower_username: "alice".to_string(),
            followee_username: "bob".to_string(),
            created_at: Utc::now().into(),
        };
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("bob")]])
                .append_query_results([Vec::<following::Model>::new()])
                .append_query_results([[edge]]),
        );

        let status = service.toggle_follow("alice", "bob").await.unwrap();

        assert_eq!(status, FollowStatus::Followed);
    }

    #[tokio::test]
    async fn test_list_followers_unknown_user() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.list_followers("ghost", Some("alice")).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[test]
    fn test_follow_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FollowStatus::Unfollowed).unwrap(),
            "\"unfollowed\""
        );
    }
}
