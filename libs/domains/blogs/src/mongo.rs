use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{BlogError, BlogResult};
use crate::models::{
    AuthorActivity, Blog, BlogActivity, BlogRecentComments, BlogWithComments, Comment,
};
use crate::repository::BlogRepository;

pub const BLOGS_COLLECTION: &str = "blogs";

/// Create the blogs collection if it does not exist yet. Idempotent;
/// called once at startup.
pub async fn init_collection(db: &Database) -> BlogResult<()> {
    let existing = db.list_collection_names().await.map_err(map_mongo_err)?;
    if !existing.iter().any(|name| name == BLOGS_COLLECTION) {
        db.create_collection(BLOGS_COLLECTION).await.map_err(map_mongo_err)?;
    }
    info!(collection = BLOGS_COLLECTION, "collection ready");
    Ok(())
}

/// Persisted shape of a comment. Ids are stored as strings so filters
/// and aggregation stages can match them without binary-UUID handling.
#[derive(Debug, Serialize, Deserialize)]
struct CommentDocument {
    id: String,
    author_name: String,
    content: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&Comment> for CommentDocument {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author_name: comment.author_name.clone(),
            content: comment.content.clone(),
            created_at: bson::DateTime::from_chrono(comment.created_at),
            updated_at: bson::DateTime::from_chrono(comment.updated_at),
        }
    }
}

impl TryFrom<CommentDocument> for Comment {
    type Error = BlogError;

    fn try_from(doc: CommentDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_stored_id(&doc.id)?,
            author_name: doc.author_name,
            content: doc.content,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        })
    }
}

/// Persisted shape of a blog. `_id` is the blog id; timestamps are BSON
/// datetimes so range comparisons inside pipelines work on real dates.
#[derive(Debug, Serialize, Deserialize)]
struct BlogDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    content: String,
    author_id: String,
    tags: Vec<String>,
    is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    published_at: Option<bson::DateTime>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<Vec<CommentDocument>>,
    version: i64,
}

impl From<&Blog> for BlogDocument {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id.to_string(),
            title: blog.title.clone(),
            content: blog.content.clone(),
            author_id: blog.author_id.to_string(),
            tags: blog.tags.clone(),
            is_published: blog.is_published,
            published_at: blog.published_at.map(bson::DateTime::from_chrono),
            created_at: bson::DateTime::from_chrono(blog.created_at),
            updated_at: bson::DateTime::from_chrono(blog.updated_at),
            comments: blog
                .comments
                .as_ref()
                .map(|comments| comments.iter().map(CommentDocument::from).collect()),
            version: blog.version,
        }
    }
}

impl TryFrom<BlogDocument> for Blog {
    type Error = BlogError;

    fn try_from(doc: BlogDocument) -> Result<Self, Self::Error> {
        let comments = doc
            .comments
            .map(|comments| {
                comments
                    .into_iter()
                    .map(Comment::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Self {
            id: parse_stored_id(&doc.id)?,
            title: doc.title,
            content: doc.content,
            author_id: parse_stored_id(&doc.author_id)?,
            tags: doc.tags,
            is_published: doc.is_published,
            published_at: doc.published_at.map(bson::DateTime::to_chrono),
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
            comments,
            version: doc.version,
        })
    }
}

fn parse_stored_id(raw: &str) -> BlogResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| BlogError::Store(format!("corrupt id in stored document: {raw}")))
}

/// MongoDB-backed repository. One document per blog in the `blogs`
/// collection; comment mutations ride on full-document replaces guarded
/// by the version token.
#[derive(Debug, Clone)]
pub struct MongoBlogRepository {
    collection: Collection<BlogDocument>,
}

impl MongoBlogRepository {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(BLOGS_COLLECTION) }
    }
}

fn map_mongo_err(err: mongodb::error::Error) -> BlogError {
    match &*err.kind {
        ErrorKind::ServerSelection { .. } => BlogError::Unavailable(err.to_string()),
        ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            BlogError::Timeout(err.to_string())
        }
        ErrorKind::Io(_) => BlogError::Unavailable(err.to_string()),
        ErrorKind::Command(cmd) => match cmd.code {
            // MaxTimeMSExpired / ExceededTimeLimit
            50 | 262 => BlogError::Timeout(err.to_string()),
            // Cosmos-compatible endpoints report throttling as 16500.
            16500 => BlogError::RateLimited(err.to_string()),
            _ => BlogError::Store(err.to_string()),
        },
        _ => BlogError::Store(err.to_string()),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_err)) if write_err.code == 11000
    )
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    async fn insert(&self, blog: Blog) -> BlogResult<Blog> {
        let document = BlogDocument::from(&blog);
        self.collection.insert_one(&document).await.map_err(|err| {
            if is_duplicate_key(&err) {
                BlogError::DuplicateId(blog.id)
            } else {
                map_mongo_err(err)
            }
        })?;
        Ok(blog)
    }

    async fn get(&self, id: Uuid) -> BlogResult<Option<Blog>> {
        self.collection
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_err)?
            .map(Blog::try_from)
            .transpose()
    }

    async fn list(&self) -> BlogResult<Vec<Blog>> {
        let documents: Vec<BlogDocument> = self
            .collection
            .find(doc! {})
            .await
            .map_err(map_mongo_err)?
            .try_collect()
            .await
            .map_err(map_mongo_err)?;
        documents.into_iter().map(Blog::try_from).collect()
    }

    async fn replace(&self, blog: Blog) -> BlogResult<Blog> {
        let mut next = blog.clone();
        next.version += 1;
        let document = BlogDocument::from(&next);

        // The filter pins the version the caller read; a concurrent
        // writer invalidates it and the replace matches nothing.
        let filter = doc! { "_id": blog.id.to_string(), "version": blog.version };
        let previous = self
            .collection
            .find_one_and_replace(filter, &document)
            .await
            .map_err(map_mongo_err)?;

        match previous {
            Some(_) => Ok(next),
            None => match self.get(blog.id).await? {
                Some(_) => Err(BlogError::WriteConflict(blog.id)),
                None => Err(BlogError::BlogNotFound(blog.id)),
            },
        }
    }

    async fn delete(&self, id: Uuid) -> BlogResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(map_mongo_err)?;
        Ok(result.deleted_count > 0)
    }

    async fn find_comment(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
    ) -> BlogResult<Option<Comment>> {
        if self.get(blog_id).await?.is_none() {
            return Err(BlogError::BlogNotFound(blog_id));
        }
        let pipeline = vec![
            doc! { "$match": { "_id": blog_id.to_string() } },
            doc! { "$unwind": "$comments" },
            doc! { "$match": { "comments.id": comment_id.to_string() } },
            doc! { "$replaceRoot": { "newRoot": "$comments" } },
        ];
        let documents = self.run_pipeline(pipeline).await?;
        documents
            .into_iter()
            .next()
            .map(|d| Comment::try_from(deserialize::<CommentDocument>(d)?))
            .transpose()
    }

    async fn blogs_with_comments(&self) -> BlogResult<Vec<BlogWithComments>> {
        let pipeline = vec![doc! { "$match": { "comments.0": { "$exists": true } } }];
        self.run_pipeline(pipeline)
            .await?
            .into_iter()
            .map(|d| {
                let blog: Blog = deserialize::<BlogDocument>(d)?.try_into()?;
                Ok(BlogWithComments {
                    id: blog.id,
                    title: blog.title,
                    content: blog.content,
                    author_id: blog.author_id,
                    comments: blog.comments.unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn blogs_with_recent_comments(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BlogResult<Vec<BlogRecentComments>> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(rename = "_id")]
            id: String,
            title: String,
            content: String,
            recent_comments: Vec<CommentDocument>,
        }

        let pipeline = vec![
            doc! { "$match": { "comments.0": { "$exists": true } } },
            doc! { "$project": {
                "title": 1,
                "content": 1,
                "recent_comments": { "$filter": {
                    "input": "$comments",
                    "as": "comment",
                    "cond": { "$gte": ["$$comment.created_at", bson::DateTime::from_chrono(cutoff)] },
                } },
            } },
            doc! { "$match": { "recent_comments.0": { "$exists": true } } },
        ];
        self.run_pipeline(pipeline)
            .await?
            .into_iter()
            .map(|d| {
                let row: Row = deserialize(d)?;
                Ok(BlogRecentComments {
                    blog_id: parse_stored_id(&row.id)?,
                    title: row.title,
                    content: row.content,
                    recent_comments: row
                        .recent_comments
                        .into_iter()
                        .map(Comment::try_from)
                        .collect::<Result<Vec<_>, _>>()?,
                })
            })
            .collect()
    }

    async fn most_active_blogs(&self, limit: i64) -> BlogResult<Vec<BlogActivity>> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(rename = "_id")]
            id: String,
            title: String,
            comment_count: i64,
        }

        let pipeline = vec![
            doc! { "$match": { "comments.0": { "$exists": true } } },
            doc! { "$project": { "title": 1, "comment_count": { "$size": "$comments" } } },
            doc! { "$sort": { "comment_count": -1, "_id": 1 } },
            doc! { "$limit": limit },
        ];
        self.run_pipeline(pipeline)
            .await?
            .into_iter()
            .map(|d| {
                let row: Row = deserialize(d)?;
                Ok(BlogActivity {
                    id: parse_stored_id(&row.id)?,
                    title: row.title,
                    comment_count: row.comment_count,
                })
            })
            .collect()
    }

    async fn most_active_authors(&self, limit: i64) -> BlogResult<Vec<AuthorActivity>> {
        let pipeline = vec![
            doc! { "$unwind": "$comments" },
            doc! { "$group": { "_id": "$comments.author_name", "comment_count": { "$sum": 1 } } },
            doc! { "$sort": { "comment_count": -1, "_id": 1 } },
            doc! { "$limit": limit },
            doc! { "$project": { "_id": 0, "author_name": "$_id", "comment_count": 1 } },
        ];
        self.run_pipeline(pipeline)
            .await?
            .into_iter()
            .map(deserialize::<AuthorActivity>)
            .collect()
    }
}

impl MongoBlogRepository {
    async fn run_pipeline(&self, pipeline: Vec<Document>) -> BlogResult<Vec<Document>> {
        self.collection
            .aggregate(pipeline)
            .await
            .map_err(map_mongo_err)?
            .try_collect()
            .await
            .map_err(map_mongo_err)
    }
}

fn deserialize<T: serde::de::DeserializeOwned>(document: Document) -> BlogResult<T> {
    bson::from_document(document)
        .map_err(|e| BlogError::Store(format!("malformed aggregation row: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{CreateBlog, CreateComment};

    // BSON datetimes carry millisecond precision, so fixtures use
    // millisecond-precision timestamps to make round-trips exact.
    fn ms_precision(blog: &mut Blog) {
        let truncate = |ts: DateTime<Utc>| {
            Utc.timestamp_millis_opt(ts.timestamp_millis()).unwrap()
        };
        blog.created_at = truncate(blog.created_at);
        blog.updated_at = truncate(blog.updated_at);
        blog.published_at = blog.published_at.map(truncate);
        if let Some(comments) = blog.comments.as_mut() {
            for comment in comments {
                comment.created_at = truncate(comment.created_at);
                comment.updated_at = truncate(comment.updated_at);
            }
        }
    }

    fn sample_blog() -> Blog {
        let mut blog = Blog::new(CreateBlog {
            title: "Round trip".into(),
            content: "body".into(),
            author_id: Uuid::now_v7(),
            tags: vec!["rust".into(), "mongo".into()],
            is_published: Some(true),
        });
        blog.comments_mut().push(Comment::new(CreateComment {
            author_name: "alice".into(),
            content: "first".into(),
        }));
        blog.comments_mut().push(Comment::new(CreateComment {
            author_name: "bob".into(),
            content: "second".into(),
        }));
        blog.published_at = Some(Utc::now());
        ms_precision(&mut blog);
        blog
    }

    #[test]
    fn document_conversion_round_trips_field_for_field() {
        let blog = sample_blog();
        let restored = Blog::try_from(BlogDocument::from(&blog)).unwrap();
        assert_eq!(restored, blog);
    }

    #[test]
    fn comment_order_survives_conversion() {
        let blog = sample_blog();
        let restored = Blog::try_from(BlogDocument::from(&blog)).unwrap();
        let authors: Vec<_> = restored
            .comments
            .unwrap()
            .into_iter()
            .map(|c| c.author_name)
            .collect();
        assert_eq!(authors, vec!["alice", "bob"]);
    }

    #[test]
    fn absent_comments_stay_absent_in_bson() {
        let mut blog = sample_blog();
        blog.comments = None;
        blog.published_at = None;

        let document = bson::to_document(&BlogDocument::from(&blog)).unwrap();
        assert!(!document.contains_key("comments"));
        assert!(!document.contains_key("published_at"));
        assert_eq!(document.get_str("_id").unwrap(), blog.id.to_string());
    }

    #[test]
    fn corrupt_stored_id_is_a_store_error() {
        let mut document = BlogDocument::from(&sample_blog());
        document.id = "not-a-uuid".into();

        let err = Blog::try_from(document).unwrap_err();
        assert!(matches!(err, BlogError::Store(_)));
    }

    // Live tests; need MONGODB_URL pointing at a running instance.
    mod live {
        use mongodb::Client;

        use super::*;

        async fn test_db() -> Database {
            let url = std::env::var("MONGODB_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".into());
            let client = Client::with_uri_str(&url).await.expect("connect");
            client.database("blog_platform_test")
        }

        #[tokio::test]
        #[ignore = "requires a running MongoDB"]
        async fn crud_round_trip_against_live_store() {
            let db = test_db().await;
            init_collection(&db).await.unwrap();
            let repo = MongoBlogRepository::new(&db);

            let blog = sample_blog();
            repo.insert(blog.clone()).await.unwrap();
            let fetched = repo.get(blog.id).await.unwrap().unwrap();
            assert_eq!(fetched, blog);

            let updated = repo.replace(fetched).await.unwrap();
            assert_eq!(updated.version, blog.version + 1);

            // Stale version must conflict.
            let err = repo.replace(blog.clone()).await.unwrap_err();
            assert!(matches!(err, BlogError::WriteConflict(_)));

            assert!(repo.delete(blog.id).await.unwrap());
            assert!(repo.get(blog.id).await.unwrap().is_none());
        }

        #[tokio::test]
        #[ignore = "requires a running MongoDB"]
        async fn analytics_pipelines_match_in_memory_semantics() {
            let db = test_db().await;
            init_collection(&db).await.unwrap();
            let repo = MongoBlogRepository::new(&db);

            let blog = sample_blog();
            repo.insert(blog.clone()).await.unwrap();

            let with_comments = repo.blogs_with_comments().await.unwrap();
            assert!(with_comments.iter().any(|b| b.id == blog.id));

            let active = repo.most_active_blogs(5).await.unwrap();
            assert!(active.iter().any(|b| b.id == blog.id && b.comment_count == 2));

            let authors = repo.most_active_authors(10).await.unwrap();
            assert!(authors.iter().any(|a| a.author_name == "alice"));

            repo.delete(blog.id).await.unwrap();
        }
    }
}
