use chrono::{Duration, Utc};
use tracing::instrument;

use crate::error::BlogResult;
use crate::models::{AuthorActivity, BlogActivity, BlogRecentComments, BlogWithComments};
use crate::repository::BlogRepository;
use crate::service::BlogService;

const DEFAULT_RECENT_WINDOW_DAYS: i64 = 7;
const DEFAULT_TOP_BLOGS: i64 = 5;
const DEFAULT_TOP_AUTHORS: i64 = 10;

impl<R: BlogRepository> BlogService<R> {
    /// All blogs that have at least one comment.
    pub async fn blogs_with_comments(&self) -> BlogResult<Vec<BlogWithComments>> {
        self.repository().blogs_with_comments().await
    }

    /// Blogs with comments newer than `now - days_ago` days, carrying
    /// only those comments. A missing or zero `days_ago` falls back to
    /// 7 days, matching the long-standing behavior callers rely on.
    #[instrument(skip(self))]
    pub async fn blogs_with_recent_comments(
        &self,
        days_ago: Option<i64>,
    ) -> BlogResult<Vec<BlogRecentComments>> {
        let days = match days_ago {
            Some(d) if d > 0 => d,
            _ => DEFAULT_RECENT_WINDOW_DAYS,
        };
        let cutoff = Utc::now() - Duration::days(days);
        self.repository().blogs_with_recent_comments(cutoff).await
    }

    /// The `top` most-commented blogs, busiest first.
    #[instrument(skip(self))]
    pub async fn most_active_blogs(&self, top: Option<i64>) -> BlogResult<Vec<BlogActivity>> {
        let limit = match top {
            Some(t) if t > 0 => t,
            _ => DEFAULT_TOP_BLOGS,
        };
        self.repository().most_active_blogs(limit).await
    }

    /// The `top` most prolific comment authors across all blogs.
    #[instrument(skip(self))]
    pub async fn most_active_authors(&self, top: Option<i64>) -> BlogResult<Vec<AuthorActivity>> {
        let limit = match top {
            Some(t) if t > 0 => t,
            _ => DEFAULT_TOP_AUTHORS,
        };
        self.repository().most_active_authors(limit).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::models::{Blog, Comment, CreateBlog, CreateComment};
    use crate::repository::{BlogRepository as _, InMemoryBlogRepository};

    fn blog_with_comments(title: &str, authors: &[&str]) -> Blog {
        let mut blog = Blog::new(CreateBlog {
            title: title.into(),
            content: "body".into(),
            author_id: Uuid::now_v7(),
            tags: vec![],
            is_published: Some(true),
        });
        for author in authors {
            blog.comments_mut().push(Comment::new(CreateComment {
                author_name: (*author).into(),
                content: "comment".into(),
            }));
        }
        blog
    }

    async fn seeded_service() -> BlogService<InMemoryBlogRepository> {
        let repo = InMemoryBlogRepository::new();
        repo.insert(blog_with_comments("quiet", &["alice"])).await.unwrap();
        repo.insert(blog_with_comments("busy", &["alice", "bob", "carol"])).await.unwrap();
        repo.insert(blog_with_comments("silent", &[])).await.unwrap();
        BlogService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn blogs_with_comments_skips_commentless_blogs() {
        let svc = seeded_service().await;
        let result = svc.blogs_with_comments().await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|b| !b.comments.is_empty()));
    }

    #[tokio::test]
    async fn recent_comments_includes_fresh_activity() {
        let svc = seeded_service().await;
        // All seeded comments were created just now.
        let result = svc.blogs_with_recent_comments(Some(1)).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn recent_comments_excludes_stale_activity() {
        let repo = InMemoryBlogRepository::new();
        let mut blog = blog_with_comments("old", &["alice"]);
        let stale = Utc::now() - Duration::days(30);
        blog.comments.as_mut().unwrap()[0].created_at = stale;
        repo.insert(blog).await.unwrap();
        let svc = BlogService::new(Arc::new(repo));

        assert!(svc.blogs_with_recent_comments(Some(7)).await.unwrap().is_empty());
        assert_eq!(svc.blogs_with_recent_comments(Some(60)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_day_window_falls_back_to_seven_days() {
        // Regression guard: a zero window means "unset", not "empty".
        let repo = InMemoryBlogRepository::new();
        let mut blog = blog_with_comments("recent-ish", &["alice"]);
        blog.comments.as_mut().unwrap()[0].created_at = Utc::now() - Duration::days(3);
        repo.insert(blog).await.unwrap();
        let svc = BlogService::new(Arc::new(repo));

        let zero = svc.blogs_with_recent_comments(Some(0)).await.unwrap();
        let seven = svc.blogs_with_recent_comments(Some(7)).await.unwrap();
        assert_eq!(zero.len(), seven.len());
        assert_eq!(zero.len(), 1);
    }

    #[tokio::test]
    async fn most_active_blogs_returns_busiest_first() {
        let svc = seeded_service().await;
        let result = svc.most_active_blogs(None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].title, "busy");
        assert_eq!(result[0].comment_count, 3);
        assert_eq!(result[1].title, "quiet");
    }

    #[tokio::test]
    async fn zero_top_falls_back_to_the_default_cap() {
        let svc = seeded_service().await;
        let zero = svc.most_active_blogs(Some(0)).await.unwrap();
        let default = svc.most_active_blogs(None).await.unwrap();
        assert_eq!(zero, default);
    }

    #[tokio::test]
    async fn most_active_authors_counts_across_blogs() {
        let svc = seeded_service().await;
        let result = svc.most_active_authors(None).await.unwrap();

        assert_eq!(result[0].author_name, "alice");
        assert_eq!(result[0].comment_count, 2);
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn most_active_authors_honors_the_cap() {
        let svc = seeded_service().await;
        let result = svc.most_active_authors(Some(1)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].author_name, "alice");
    }
}
