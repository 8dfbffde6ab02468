//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use potluck_common::{AppError, AppResult};
use potluck_db::{
    entities::user,
    repositories::{FollowingRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maximum number of users returned by a search.
const SEARCH_LIMIT: u64 = 10;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    post_repo: PostRepository,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,
}

/// A user's public profile as seen by a viewer.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub follower_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
    /// Whether the viewer follows this user.
    pub is_following: bool,
}

/// A user entry in a followers or following list.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub profile_image: Option<String>,
    /// Whether the viewer follows this user.
    pub is_following: bool,
}

/// A user search hit.
#[derive(Debug, Clone, Serialize)]
pub struct UserSearchResult {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub profile_image: Option<String>,
    pub follower_count: u64,
    pub posts_count: u64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        following_repo: FollowingRepository,
        post_repo: PostRepository,
    ) -> Self {
        Self {
            user_repo,
            following_repo,
            post_repo,
        }
    }

    /// Register a new user.
    pub async fn register(&self, mut input: RegisterInput) -> AppResult<user::Model> {
        input.email = input
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        input.validate()?;

        if !input
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(AppError::Validation(
                "Username may only contain letters, digits and @/./+/-/_".to_string(),
            ));
        }

        if self.user_repo.exists(&input.username).await? {
            return Err(AppError::Validation(
                "A user with that username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            password: Set(password_hash),
            bio: Set(String::new()),
            profile_image: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(username = %user.username, "Registered user");

        Ok(user)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_username(username).await
    }

    /// Get a user's profile with counts and the viewer-relative follow flag.
    pub async fn get_profile(&self, username: &str, viewer: Option<&str>) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_username(username).await?;

        let follower_count = self.following_repo.count_followers(username).await?;
        let following_count = self.following_repo.count_following(username).await?;
        let posts_count = self.post_repo.count_by_username(username).await?;

        let is_following = match viewer {
            Some(viewer) if viewer != username => {
                self.following_repo.is_following(viewer, username).await?
            }
            _ => false,
        };

        Ok(UserProfile {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_image: user.profile_image,
            follower_count,
            following_count,
            posts_count,
            is_following,
        })
    }

    /// Search users by username, first name or last name.
    ///
    /// The caller never appears in their own results. A blank query matches nothing.
    pub async fn search(
        &self,
        query: &str,
        caller: Option<&str>,
    ) -> AppResult<Vec<UserSearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let users = self.user_repo.search(query, caller, SEARCH_LIMIT).await?;
        let usernames: Vec<String> = users.iter().map(|u| u.username.clone()).collect();

        let follower_counts = self
            .following_repo
            .count_followers_by_users(&usernames)
            .await?;
        let post_counts = self.post_repo.count_by_usernames(&usernames).await?;

        Ok(users
            .into_iter()
            .map(|u| UserSearchResult {
                follower_count: follower_counts.get(&u.username).copied().unwrap_or(0),
                posts_count: post_counts.get(&u.username).copied().unwrap_or(0),
                username: u.username,
                first_name: u.first_name,
                last_name: u.last_name,
                bio: u.bio,
                profile_image: u.profile_image,
            })
            .collect())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
