use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{BlogError, BlogResult};
use crate::models::{Blog, Comment, CreateBlog, CreateComment, UpdateBlog, UpdateComment};
use crate::repository::BlogRepository;

/// Read-modify-write cycles retry this many times on a version
/// conflict before surfacing it to the caller.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Manages the blog aggregate. All comment operations go through the
/// parent blog document; every mutation is a conditional full-document
/// replace.
#[derive(Debug, Clone)]
pub struct BlogService<R> {
    repository: Arc<R>,
}

impl<R: BlogRepository> BlogService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_blog(&self, input: CreateBlog) -> BlogResult<Blog> {
        input.validate()?;
        let blog = Blog::new(input);
        debug!(blog_id = %blog.id, "creating blog");
        self.repository.insert(blog).await
    }

    pub async fn get_blog(&self, id: Uuid) -> BlogResult<Blog> {
        self.repository
            .get(id)
            .await?
            .ok_or(BlogError::BlogNotFound(id))
    }

    pub async fn list_blogs(&self) -> BlogResult<Vec<Blog>> {
        self.repository.list().await
    }

    #[instrument(skip(self, update))]
    pub async fn update_blog(&self, id: Uuid, update: UpdateBlog) -> BlogResult<Blog> {
        update.validate()?;
        self.modify_blog(id, |blog| {
            blog.apply_update(update.clone());
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_blog(&self, id: Uuid) -> BlogResult<()> {
        if !self.repository.delete(id).await? {
            return Err(BlogError::BlogNotFound(id));
        }
        debug!(blog_id = %id, "blog deleted");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn add_comment(&self, blog_id: Uuid, input: CreateComment) -> BlogResult<Blog> {
        input.validate()?;
        let comment = Comment::new(input);
        self.modify_blog(blog_id, |blog| {
            blog.comments_mut().push(comment.clone());
            Ok(())
        })
        .await
    }

    pub async fn get_comment(&self, blog_id: Uuid, comment_id: Uuid) -> BlogResult<Comment> {
        self.repository
            .find_comment(blog_id, comment_id)
            .await?
            .ok_or(BlogError::CommentNotFound { blog_id, comment_id })
    }

    #[instrument(skip(self, input))]
    pub async fn update_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        input: UpdateComment,
    ) -> BlogResult<Blog> {
        input.validate()?;
        self.modify_blog(blog_id, |blog| {
            let comments = blog
                .comments
                .as_mut()
                .ok_or(BlogError::NoComments(blog_id))?;
            let comment = comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or(BlogError::CommentNotFound { blog_id, comment_id })?;
            comment.content = input.content.clone();
            comment.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    /// Removing an absent comment from an existing array is a no-op; a
    /// blog that never had comments is an error.
    #[instrument(skip(self))]
    pub async fn remove_comment(&self, blog_id: Uuid, comment_id: Uuid) -> BlogResult<Blog> {
        self.modify_blog(blog_id, |blog| {
            let comments = blog
                .comments
                .as_mut()
                .ok_or(BlogError::NoComments(blog_id))?;
            comments.retain(|c| c.id != comment_id);
            Ok(())
        })
        .await
    }

    /// Read-modify-write with bounded retry. Each attempt re-reads the
    /// document, applies `transform`, refreshes `updated_at` and issues
    /// a conditional replace; a lost race re-enters the loop.
    async fn modify_blog<F>(&self, id: Uuid, mut transform: F) -> BlogResult<Blog>
    where
        F: FnMut(&mut Blog) -> BlogResult<()>,
    {
        let mut attempt = 1;
        loop {
            let mut blog = self.get_blog(id).await?;
            transform(&mut blog)?;
            blog.updated_at = Utc::now();
            match self.repository.replace(blog).await {
                Ok(saved) => return Ok(saved),
                Err(BlogError::WriteConflict(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(blog_id = %id, attempt, "write conflict, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
