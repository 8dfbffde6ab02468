//! Recipe search.
//!
//! Recipe posts keep their recipe as a JSON document in the caption, e.g.
//! `{"title": "...", "ingredients": [...], "instructions": "..."}`. Titles
//! are not indexed, so a search walks the posts newest-first in pages and
//! decodes each caption until it has enough hits.

use potluck_common::AppResult;
use potluck_db::repositories::PostRepository;
use serde_json::Value;

use crate::services::post::{PostService, PostView};

/// Maximum number of recipes returned by a search.
const RESULT_LIMIT: usize = 10;

/// Posts fetched per scan step.
const SCAN_PAGE_SIZE: u64 = 200;

/// Recipe search service.
#[derive(Clone)]
pub struct RecipeSearchService {
    post_repo: PostRepository,
    post_service: PostService,
}

impl RecipeSearchService {
    /// Create a new recipe search service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, post_service: PostService) -> Self {
        Self {
            post_repo,
            post_service,
        }
    }

    /// Posts whose recipe title contains `query`, case-insensitively.
    pub async fn search(&self, query: &str, viewer: Option<&str>) -> AppResult<Vec<PostView>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let mut matches = Vec::new();
        let mut offset = 0;
        let mut scanned = 0;

        'scan: loop {
            let page = self
                .post_repo
                .find_recent_page(SCAN_PAGE_SIZE, offset)
                .await?;
            let page_len = page.len() as u64;
            scanned += page.len();

            for post in page {
                if title_matches(&post.caption, &query) {
                    matches.push(post);
                    if matches.len() == RESULT_LIMIT {
                        break 'scan;
                    }
                }
            }

            if page_len < SCAN_PAGE_SIZE {
                break;
            }
            offset += SCAN_PAGE_SIZE;
        }

        tracing::debug!(query = %query, scanned, hits = matches.len(), "Searched recipes");
        self.post_service.hydrate(matches, viewer).await
    }
}

/// The recipe title in a caption, if the caption is a JSON object with a string title.
#[must_use]
pub fn recipe_title(caption: &str) -> Option<String> {
    let value: Value = serde_json::from_str(caption).ok()?;
    value.get("title")?.as_str().map(str::to_owned)
}

/// Whether the caption's recipe title contains the already-lowercased `query`.
fn title_matches(caption: &str, query: &str) -> bool {
    recipe_title(caption).is_some_and(|title| title.to_lowercase().contains(query))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use potluck_db::repositories::{CommentRepository, FollowingRepository, LikeRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_recipe_title_from_json_caption() {
        let caption = r#"{"title": "Lemon Tart", "ingredients": [{"name": "lemon", "quantity": 2, "unit": ""}], "instructions": "Bake."}"#;
        assert_eq!(recipe_title(caption), Some("Lemon Tart".to_string()));
    }

    #[test]
    fn test_recipe_title_skips_non_recipes() {
        assert_eq!(recipe_title("just a photo of lunch"), None);
        assert_eq!(recipe_title(""), None);
        assert_eq!(recipe_title(r#"["title"]"#), None);
        assert_eq!(recipe_title(r#""title""#), None);
        assert_eq!(recipe_title(r#"{"name": "Soup"}"#), None);
        assert_eq!(recipe_title(r#"{"title": 42}"#), None);
        assert_eq!(recipe_title(r#"{"title": null}"#), None);
    }

    #[test]
    fn test_title_matches_is_case_insensitive_substring() {
        let caption = r#"{"title": "Grandma's PANCAKES"}"#;

        assert!(title_matches(caption, "pancake"));
        assert!(title_matches(caption, "grandma's"));
        assert!(!title_matches(caption, "waffle"));
    }

    #[tokio::test]
    async fn test_blank_query_skips_database() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let post_repo = PostRepository::new(db.clone());
        let post_service = PostService::new(
            post_repo.clone(),
            LikeRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            FollowingRepository::new(db),
        );
        let service = RecipeSearchService::new(post_repo, post_service);

        assert!(service.search("", None).await.unwrap().is_empty());
        assert!(service.search("  ", Some("alice")).await.unwrap().is_empty());
    }
}
