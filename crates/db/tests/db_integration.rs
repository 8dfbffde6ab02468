//! Database integration tests against an in-memory `SQLite` database.
//!
//! Every test gets its own freshly migrated database, so they run in parallel.

#![allow(clippy::unwrap_used)]

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use potluck_common::AppError;
use potluck_db::entities::{Following, PostLike, following, post, user};
use potluck_db::repositories::{
    CommentRepository, FollowingRepository, LikeRepository, PostRepository, UserRepository,
};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, Set,
};

async fn setup() -> Arc<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opt).await.unwrap();
    potluck_db::migrate(&conn).await.unwrap();
    Arc::new(conn)
}

async fn add_user(db: &DatabaseConnection, username: &str, first: &str, last: &str) {
    user::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        email: Set(None),
        password: Set("hash".to_string()),
        bio: Set(String::new()),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .unwrap();
}

async fn add_post(db: &DatabaseConnection, id: &str, username: &str) -> post::Model {
    // Keeps created_at strictly increasing between consecutive posts.
    tokio::time::sleep(Duration::from_millis(5)).await;
    post::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        image: Set(format!("{id}.jpg")),
        caption: Set(String::new()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_follow_toggle_flips_edge() {
    let db = setup().await;
    add_user(&db, "alice", "", "").await;
    add_user(&db, "bob", "", "").await;
    let repo = FollowingRepository::new(db.clone());

    assert!(repo.toggle("e1".to_string(), "alice", "bob").await.unwrap());
    assert!(repo.is_following("alice", "bob").await.unwrap());
    assert!(!repo.is_following("bob", "alice").await.unwrap());

    assert!(!repo.toggle("e2".to_string(), "alice", "bob").await.unwrap());
    assert!(!repo.is_following("alice", "bob").await.unwrap());
    assert_eq!(Following::find().count(db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_edge_violates_unique_index() {
    let db = setup().await;
    add_user(&db, "alice", "", "").await;
    add_user(&db, "bob", "", "").await;
    let repo = FollowingRepository::new(db.clone());

    repo.toggle("e1".to_string(), "alice", "bob").await.unwrap();

    let duplicate = following::ActiveModel {
        id: Set("e2".to_string()),
        follower_username: Set("alice".to_string()),
        followee_username: Set("bob".to_string()),
        created_at: Set(Utc::now().into()),
    };
    assert!(duplicate.insert(db.as_ref()).await.is_err());
    assert_eq!(Following::find().count(db.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_taken_username_is_a_validation_error() {
    let db = setup().await;
    let repo = UserRepository::new(db.clone());
    add_user(&db, "alice", "", "").await;

    let again = user::ActiveModel {
        username: Set("alice".to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(None),
        password: Set("hash".to_string()),
        bio: Set(String::new()),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    };
    let err = repo.create(again).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err:?}");
    assert_eq!(err.status_code().as_u16(), 400);
}

#[tokio::test]
async fn test_follow_lists_and_counts() {
    let db = setup().await;
    for name in ["alice", "bob", "carol"] {
        add_user(&db, name, "", "").await;
    }
    let repo = FollowingRepository::new(db.clone());

    repo.toggle("e1".to_string(), "alice", "bob").await.unwrap();
    repo.toggle("e2".to_string(), "carol", "bob").await.unwrap();
    repo.toggle("e3".to_string(), "alice", "carol").await.unwrap();

    assert_eq!(
        repo.find_follower_usernames("bob").await.unwrap(),
        vec!["alice".to_string(), "carol".to_string()]
    );
    assert_eq!(repo.count_followers("bob").await.unwrap(), 2);
    assert_eq!(repo.count_following("alice").await.unwrap(), 2);

    let followed = repo
        .find_followed_among("alice", &["bob".to_string(), "carol".to_string()])
        .await
        .unwrap();
    assert_eq!(followed.len(), 2);
}

#[tokio::test]
async fn test_like_counts_are_grouped_per_post() {
    let db = setup().await;
    for name in ["alice", "bob", "carol"] {
        add_user(&db, name, "", "").await;
    }
    add_post(&db, "p1", "alice").await;
    add_post(&db, "p2", "alice").await;
    let repo = LikeRepository::new(db.clone());

    repo.toggle("l1".to_string(), "bob", "p1").await.unwrap();
    repo.toggle("l2".to_string(), "carol", "p1").await.unwrap();
    repo.toggle("l3".to_string(), "carol", "p2").await.unwrap();

    let ids = vec!["p1".to_string(), "p2".to_string()];
    let counts = repo.count_by_posts(&ids).await.unwrap();
    assert_eq!(counts.get("p1"), Some(&2));
    assert_eq!(counts.get("p2"), Some(&1));

    let liked = repo.find_liked_post_ids("bob", &ids).await.unwrap();
    assert!(liked.contains("p1"));
    assert!(!liked.contains("p2"));
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let db = setup().await;
    add_user(&db, "alice", "", "").await;
    add_user(&db, "bob", "", "").await;
    add_post(&db, "p1", "alice").await;
    LikeRepository::new(db.clone())
        .toggle("l1".to_string(), "bob", "p1")
        .await
        .unwrap();
    FollowingRepository::new(db.clone())
        .toggle("e1".to_string(), "bob", "alice")
        .await
        .unwrap();

    let alice = UserRepository::new(db.clone())
        .get_by_username("alice")
        .await
        .unwrap();
    alice.delete(db.as_ref()).await.unwrap();

    let posts = PostRepository::new(db.clone());
    assert!(posts.find_by_id("p1").await.unwrap().is_none());
    assert_eq!(PostLike::find().count(db.as_ref()).await.unwrap(), 0);
    assert_eq!(Following::find().count(db.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_posts_newest_first() {
    let db = setup().await;
    add_user(&db, "alice", "", "").await;
    add_user(&db, "bob", "", "").await;
    add_post(&db, "p1", "alice").await;
    add_post(&db, "p2", "bob").await;
    add_post(&db, "p3", "alice").await;
    let repo = PostRepository::new(db.clone());

    let ids = |posts: Vec<post::Model>| posts.into_iter().map(|p| p.id).collect::<Vec<_>>();

    assert_eq!(ids(repo.find_recent(20).await.unwrap()), ["p3", "p2", "p1"]);
    assert_eq!(ids(repo.find_by_username("alice").await.unwrap()), ["p3", "p1"]);
    assert_eq!(
        ids(repo.find_by_usernames(&["bob".to_string()]).await.unwrap()),
        ["p2"]
    );
    assert_eq!(ids(repo.find_recent_page(1, 1).await.unwrap()), ["p2"]);
    assert_eq!(repo.count_by_username("alice").await.unwrap(), 2);
}

#[tokio::test]
async fn test_comments_oldest_first() {
    let db = setup().await;
    add_user(&db, "alice", "", "").await;
    add_post(&db, "p1", "alice").await;
    let repo = CommentRepository::new(db.clone());

    for (id, text) in [("c1", "first"), ("c2", "second")] {
        tokio::time::sleep(Duration::from_millis(5)).await;
        repo.create(potluck_db::entities::comment::ActiveModel {
            id: Set(id.to_string()),
            username: Set("alice".to_string()),
            post_id: Set("p1".to_string()),
            text: Set(text.to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    }

    add_post(&db, "p2", "alice").await;
    let texts: Vec<_> = repo
        .find_by_posts(&["p1".to_string(), "p2".to_string()])
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, ["first", "second"]);
}

#[tokio::test]
async fn test_user_search_is_case_insensitive_and_excludes_caller() {
    let db = setup().await;
    add_user(&db, "alice", "Alice", "Baker").await;
    add_user(&db, "bob", "Robert", "Stone").await;
    add_user(&db, "carol", "Carol", "Bonham").await;
    let repo = UserRepository::new(db.clone());

    let names = |users: Vec<user::Model>| users.into_iter().map(|u| u.username).collect::<Vec<_>>();

    assert_eq!(
        names(repo.search("BO", Some("alice"), 10).await.unwrap()),
        ["bob", "carol"]
    );
    assert_eq!(names(repo.search("bak", None, 10).await.unwrap()), ["alice"]);
    assert!(repo.search("%", None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batched_user_counts() {
    let db = setup().await;
    for name in ["alice", "bob", "carol"] {
        add_user(&db, name, "", "").await;
    }
    add_post(&db, "p1", "bob").await;
    add_post(&db, "p2", "bob").await;
    let follows = FollowingRepository::new(db.clone());
    follows.toggle("e1".to_string(), "alice", "bob").await.unwrap();
    follows.toggle("e2".to_string(), "carol", "bob").await.unwrap();

    let names = vec!["bob".to_string(), "carol".to_string()];
    let followers = follows.count_followers_by_users(&names).await.unwrap();
    let posts = PostRepository::new(db.clone())
        .count_by_usernames(&names)
        .await
        .unwrap();

    assert_eq!(followers.get("bob"), Some(&2));
    assert_eq!(followers.get("carol"), None);
    assert_eq!(posts.get("bob"), Some(&2));
    assert_eq!(posts.get("carol"), None);
}
