use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{BlogError, BlogResult};
use crate::models::{
    AuthorActivity, Blog, BlogActivity, BlogRecentComments, BlogWithComments, Comment,
};

/// Persistence seam for the blog aggregate. One document per blog,
/// keyed by id; comments are only reachable through their parent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Insert a new blog. Fails with `DuplicateId` if the id is taken.
    async fn insert(&self, blog: Blog) -> BlogResult<Blog>;

    async fn get(&self, id: Uuid) -> BlogResult<Option<Blog>>;

    /// Full collection scan, store-defined order.
    async fn list(&self) -> BlogResult<Vec<Blog>>;

    /// Conditional full-document replace. The write only applies when
    /// the stored version still matches `blog.version`; on success the
    /// returned blog carries the bumped version. A version mismatch is
    /// `WriteConflict`, a missing document is `BlogNotFound`.
    async fn replace(&self, blog: Blog) -> BlogResult<Blog>;

    /// Returns whether a document was actually removed.
    async fn delete(&self, id: Uuid) -> BlogResult<bool>;

    /// Look up a single comment inside its parent blog.
    async fn find_comment(&self, blog_id: Uuid, comment_id: Uuid)
        -> BlogResult<Option<Comment>>;

    async fn blogs_with_comments(&self) -> BlogResult<Vec<BlogWithComments>>;

    async fn blogs_with_recent_comments(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BlogResult<Vec<BlogRecentComments>>;

    async fn most_active_blogs(&self, limit: i64) -> BlogResult<Vec<BlogActivity>>;

    async fn most_active_authors(&self, limit: i64) -> BlogResult<Vec<AuthorActivity>>;
}

/// HashMap-backed repository. Backs handler tests and local runs
/// without a store; mirrors the MongoDB implementation's semantics,
/// including the version check on replace.
#[derive(Debug, Default)]
pub struct InMemoryBlogRepository {
    blogs: RwLock<HashMap<Uuid, Blog>>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn insert(&self, blog: Blog) -> BlogResult<Blog> {
        let mut blogs = self.blogs.write().unwrap_or_else(|e| e.into_inner());
        if blogs.contains_key(&blog.id) {
            return Err(BlogError::DuplicateId(blog.id));
        }
        blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn get(&self, id: Uuid) -> BlogResult<Option<Blog>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blogs.get(&id).cloned())
    }

    async fn list(&self) -> BlogResult<Vec<Blog>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blogs.values().cloned().collect())
    }

    async fn replace(&self, blog: Blog) -> BlogResult<Blog> {
        let mut blogs = self.blogs.write().unwrap_or_else(|e| e.into_inner());
        let stored = blogs.get(&blog.id).ok_or(BlogError::BlogNotFound(blog.id))?;
        if stored.version != blog.version {
            return Err(BlogError::WriteConflict(blog.id));
        }
        let mut next = blog;
        next.version += 1;
        blogs.insert(next.id, next.clone());
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> BlogResult<bool> {
        let mut blogs = self.blogs.write().unwrap_or_else(|e| e.into_inner());
        Ok(blogs.remove(&id).is_some())
    }

    async fn find_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
    ) -> BlogResult<Option<Comment>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        let blog = blogs.get(&blog_id).ok_or(BlogError::BlogNotFound(blog_id))?;
        Ok(blog
            .comments
            .as_ref()
            .and_then(|comments| comments.iter().find(|c| c.id == comment_id).cloned()))
    }

    async fn blogs_with_comments(&self) -> BlogResult<Vec<BlogWithComments>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blogs
            .values()
            .filter(|blog| blog.comment_count() > 0)
            .map(|blog| BlogWithComments {
                id: blog.id,
                title: blog.title.clone(),
                content: blog.content.clone(),
                author_id: blog.author_id,
                comments: blog.comments.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn blogs_with_recent_comments(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BlogResult<Vec<BlogRecentComments>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blogs
            .values()
            .filter_map(|blog| {
                let recent: Vec<Comment> = blog
                    .comments
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .filter(|c| c.created_at >= cutoff)
                    .cloned()
                    .collect();
                if recent.is_empty() {
                    return None;
                }
                Some(BlogRecentComments {
                    blog_id: blog.id,
                    title: blog.title.clone(),
                    content: blog.content.clone(),
                    recent_comments: recent,
                })
            })
            .collect())
    }

    async fn most_active_blogs(&self, limit: i64) -> BlogResult<Vec<BlogActivity>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        let mut activity: Vec<BlogActivity> = blogs
            .values()
            .filter(|blog| blog.comment_count() > 0)
            .map(|blog| BlogActivity {
                id: blog.id,
                title: blog.title.clone(),
                comment_count: blog.comment_count() as i64,
            })
            .collect();
        activity.sort_by(|a, b| b.comment_count.cmp(&a.comment_count).then(a.id.cmp(&b.id)));
        activity.truncate(limit.max(0) as usize);
        Ok(activity)
    }

    async fn most_active_authors(&self, limit: i64) -> BlogResult<Vec<AuthorActivity>> {
        let blogs = self.blogs.read().unwrap_or_else(|e| e.into_inner());
        let mut counts: HashMap<String, i64> = HashMap::new();
        for blog in blogs.values() {
            for comment in blog.comments.as_deref().unwrap_or_default() {
                *counts.entry(comment.author_name.clone()).or_default() += 1;
            }
        }
        let mut activity: Vec<AuthorActivity> = counts
            .into_iter()
            .map(|(author_name, comment_count)| AuthorActivity { author_name, comment_count })
            .collect();
        activity.sort_by(|a, b| {
            b.comment_count
                .cmp(&a.comment_count)
                .then_with(|| a.author_name.cmp(&b.author_name))
        });
        activity.truncate(limit.max(0) as usize);
        Ok(activity)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateBlog, CreateComment};

    fn sample_blog() -> Blog {
        Blog::new(CreateBlog {
            title: "Sample".into(),
            content: "Body".into(),
            author_id: Uuid::now_v7(),
            tags: vec![],
            is_published: None,
        })
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let repo = InMemoryBlogRepository::new();
        let blog = sample_blog();
        repo.insert(blog.clone()).await.unwrap();

        let err = repo.insert(blog).await.unwrap_err();
        assert!(matches!(err, BlogError::DuplicateId(_)));
    }

    #[tokio::test]
    async fn replace_bumps_version_and_checks_it() {
        let repo = InMemoryBlogRepository::new();
        let blog = repo.insert(sample_blog()).await.unwrap();

        let updated = repo.replace(blog.clone()).await.unwrap();
        assert_eq!(updated.version, blog.version + 1);

        // Replaying the stale read must now conflict.
        let err = repo.replace(blog).await.unwrap_err();
        assert!(matches!(err, BlogError::WriteConflict(_)));
    }

    #[tokio::test]
    async fn replace_of_missing_blog_is_not_found() {
        let repo = InMemoryBlogRepository::new();
        let err = repo.replace(sample_blog()).await.unwrap_err();
        assert!(matches!(err, BlogError::BlogNotFound(_)));
    }

    #[tokio::test]
    async fn delete_reports_whether_something_was_removed() {
        let repo = InMemoryBlogRepository::new();
        let blog = repo.insert(sample_blog()).await.unwrap();

        assert!(repo.delete(blog.id).await.unwrap());
        assert!(!repo.delete(blog.id).await.unwrap());
    }

    #[tokio::test]
    async fn find_comment_requires_existing_parent() {
        let repo = InMemoryBlogRepository::new();
        let err = repo.find_comment(Uuid::now_v7(), Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, BlogError::BlogNotFound(_)));
    }

    #[tokio::test]
    async fn find_comment_is_scoped_to_the_parent_blog() {
        let repo = InMemoryBlogRepository::new();
        let mut with_comment = sample_blog();
        with_comment.comments_mut().push(Comment::new(CreateComment {
            author_name: "alice".into(),
            content: "hi".into(),
        }));
        let comment_id = with_comment.comments.as_ref().unwrap()[0].id;
        repo.insert(with_comment).await.unwrap();
        let other = repo.insert(sample_blog()).await.unwrap();

        let miss = repo.find_comment(other.id, comment_id).await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn most_active_blogs_sorts_descending_and_truncates() {
        let repo = InMemoryBlogRepository::new();
        for count in [1usize, 3, 2] {
            let mut blog = sample_blog();
            for i in 0..count {
                blog.comments_mut().push(Comment::new(CreateComment {
                    author_name: format!("author-{i}"),
                    content: "c".into(),
                }));
            }
            repo.insert(blog).await.unwrap();
        }

        let top = repo.most_active_blogs(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].comment_count, 3);
        assert_eq!(top[1].comment_count, 2);
    }

    #[tokio::test]
    async fn most_active_authors_groups_across_blogs() {
        let repo = InMemoryBlogRepository::new();
        for _ in 0..2 {
            let mut blog = sample_blog();
            blog.comments_mut().push(Comment::new(CreateComment {
                author_name: "prolific".into(),
                content: "c".into(),
            }));
            repo.insert(blog).await.unwrap();
        }
        let mut blog = sample_blog();
        blog.comments_mut().push(Comment::new(CreateComment {
            author_name: "quiet".into(),
            content: "c".into(),
        }));
        repo.insert(blog).await.unwrap();

        let authors = repo.most_active_authors(10).await.unwrap();
        assert_eq!(authors[0].author_name, "prolific");
        assert_eq!(authors[0].comment_count, 2);
        assert_eq!(authors[1].comment_count, 1);
    }
}
