use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A reader comment embedded in its parent blog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(input: CreateComment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            author_name: input.author_name,
            content: input.content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The blog aggregate. Comments live inside the blog document and are
/// never addressed outside their parent.
///
/// `comments` stays `None` until the first comment arrives; after that it
/// is a (possibly empty) array. `version` is the optimistic-concurrency
/// token: it starts at 1 and the store bumps it on every successful
/// replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    pub version: i64,
}

impl Blog {
    pub fn new(input: CreateBlog) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            content: input.content,
            author_id: input.author_id,
            tags: input.tags,
            is_published: input.is_published.unwrap_or(false),
            published_at: None,
            created_at: now,
            updated_at: now,
            comments: None,
            version: 1,
        }
    }

    /// Overlay the supplied fields; absent fields keep their value.
    /// `updated_at` is refreshed by the write path, not here.
    pub fn apply_update(&mut self, update: UpdateBlog) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(is_published) = update.is_published {
            self.is_published = is_published;
        }
        if let Some(published_at) = update.published_at {
            self.published_at = Some(published_at);
        }
    }

    /// Mutable access to the comment array, initializing it on first use.
    pub fn comments_mut(&mut self) -> &mut Vec<Comment> {
        self.comments.get_or_insert_with(Vec::new)
    }

    pub fn comment_count(&self) -> usize {
        self.comments.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBlog {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    pub author_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBlog {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 100, message = "Author name must be between 1 and 100 characters"))]
    pub author_name: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateComment {
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

/// A blog that has at least one comment, with the full comment array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlogWithComments {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub comments: Vec<Comment>,
}

/// A blog together with only its comments newer than the query cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlogRecentComments {
    pub blog_id: Uuid,
    pub title: String,
    pub content: String,
    pub recent_comments: Vec<Comment>,
}

/// Comment volume for a single blog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BlogActivity {
    pub id: Uuid,
    pub title: String,
    pub comment_count: i64,
}

/// Comment volume for a single author, across all blogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorActivity {
    pub author_name: String,
    pub comment_count: i64,
}

/// Per-blog result of a bulk delete. `error` carries the failure detail
/// when `success` is false.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    pub id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a bulk delete. One failed item never aborts its siblings,
/// so `deleted` can be lower than `attempted`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteReport {
    pub attempted: usize,
    pub deleted: usize,
    pub results: Vec<DeleteOutcome>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RecentCommentsQuery {
    /// Window size in days; omitted or zero falls back to 7.
    pub days_ago: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TopQuery {
    /// Result cap; omitted or zero falls back to the per-query default.
    pub top: Option<i64>,
}
