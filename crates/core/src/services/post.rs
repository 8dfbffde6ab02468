//! Post service: creation, listings, the feed, and hydration of posts
//! with their likes and comments.

use std::collections::HashMap;

use chrono::Utc;
use potluck_common::{AppError, AppResult, IdGenerator};
use potluck_db::{
    entities::{comment, post},
    repositories::{CommentRepository, FollowingRepository, LikeRepository, PostRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of posts on the explore page.
const EXPLORE_LIMIT: u64 = 20;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    like_repo: LikeRepository,
    comment_repo: CommentRepository,
    following_repo: FollowingRepository,
    id_gen: IdGenerator,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    /// Image reference; storage is handled elsewhere.
    #[validate(length(min = 1, max = 1024))]
    pub image: String,

    /// Free text or a JSON recipe document.
    #[serde(default)]
    pub caption: String,
}

/// A post as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub likes_count: u64,
    pub comments_count: u64,
    /// Whether the viewer likes this post.
    pub liked_by_user: bool,
    /// Oldest first.
    pub comments: Vec<comment::Model>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        like_repo: LikeRepository,
        comment_repo: CommentRepository,
        following_repo: FollowingRepository,
    ) -> Self {
        Self {
            post_repo,
            like_repo,
            comment_repo,
            following_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a post owned by `owner`.
    pub async fn create(&self, owner: &str, input: CreatePostInput) -> AppResult<PostView> {
        input.validate()?;
        if input.image.trim().is_empty() {
            return Err(AppError::Validation("Image is required".to_string()));
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(owner.to_string()),
            image: Set(input.image),
            caption: Set(input.caption),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, username = %owner, "Created post");

        Ok(PostView {
            post,
            likes_count: 0,
            comments_count: 0,
            liked_by_user: false,
            comments: vec![],
        })
    }

    /// All posts by `username`, newest first. Unknown users have no posts.
    pub async fn list_by_user(
        &self,
        username: &str,
        viewer: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        let posts = self.post_repo.find_by_username(username).await?;
        self.hydrate(posts, viewer).await
    }

    /// The most recent posts across all users.
    pub async fn explore(&self, viewer: Option<&str>) -> AppResult<Vec<PostView>> {
        let posts = self.post_repo.find_recent(EXPLORE_LIMIT).await?;
        self.hydrate(posts, viewer).await
    }

    /// Posts by `caller` and everyone `caller` follows, newest first.
    pub async fn feed(&self, caller: &str) -> AppResult<Vec<PostView>> {
        let mut authors = self.following_repo.find_followee_usernames(caller).await?;
        if !authors.iter().any(|name| name == caller) {
            authors.push(caller.to_string());
        }

        let posts = self.post_repo.find_by_usernames(&authors).await?;
        tracing::debug!(username = %caller, authors = authors.len(), posts = posts.len(), "Composed feed");

        self.hydrate(posts, Some(caller)).await
    }

    /// Attach live like/comment aggregates and the viewer's like flag.
    ///
    /// Issues a fixed number of queries regardless of how many posts there are.
    pub async fn hydrate(
        &self,
        posts: Vec<post::Model>,
        viewer: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();

        let likes = self.like_repo.count_by_posts(&ids).await?;
        let liked = match viewer {
            Some(viewer) => self.like_repo.find_liked_post_ids(viewer, &ids).await?,
            None => Default::default(),
        };

        let mut comments: HashMap<String, Vec<comment::Model>> = HashMap::new();
        for c in self.comment_repo.find_by_posts(&ids).await? {
            comments.entry(c.post_id.clone()).or_default().push(c);
        }

        Ok(posts
            .into_iter()
            .map(|post| {
                let comments = comments.remove(&post.id).unwrap_or_default();
                PostView {
                    likes_count: likes.get(&post.id).copied().unwrap_or(0),
                    comments_count: comments.len() as u64,
                    liked_by_user: liked.contains(&post.id),
                    comments,
                    post,
                }
            })
            .collect())
    }
}
