use futures::future::{join_all, try_join_all};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::BlogResult;
use crate::models::{Blog, BulkDeleteReport, CreateBlog, DeleteOutcome};
use crate::repository::BlogRepository;
use crate::service::BlogService;

/// Upper bound on concurrent inserts within a single batch create.
const CREATE_CHUNK_SIZE: usize = 20;

impl<R: BlogRepository> BlogService<R> {
    /// Batch create. Inputs are split into chunks of 20; creates within
    /// a chunk run concurrently, chunks run strictly one after another.
    /// Any single failure fails the whole call. The result preserves
    /// input order.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create_many_blogs(&self, inputs: Vec<CreateBlog>) -> BlogResult<Vec<Blog>> {
        let mut created = Vec::with_capacity(inputs.len());
        for chunk in inputs.chunks(CREATE_CHUNK_SIZE) {
            let batch =
                try_join_all(chunk.iter().cloned().map(|input| self.create_blog(input))).await?;
            created.extend(batch);
        }
        info!(created = created.len(), "batch create finished");
        Ok(created)
    }

    /// Best-effort bulk delete: everything currently in the collection,
    /// all deletes in flight at once, one outcome per blog. A failed
    /// delete never aborts its siblings.
    #[instrument(skip(self))]
    pub async fn remove_all_blogs(&self) -> BlogResult<BulkDeleteReport> {
        let blogs = self.list_blogs().await?;
        let outcomes = join_all(blogs.iter().map(|blog| self.delete_outcome(blog.id))).await;

        let deleted = outcomes.iter().filter(|o| o.success).count();
        let report = BulkDeleteReport {
            attempted: outcomes.len(),
            deleted,
            results: outcomes,
        };
        info!(attempted = report.attempted, deleted = report.deleted, "bulk delete finished");
        Ok(report)
    }

    async fn delete_outcome(&self, id: Uuid) -> DeleteOutcome {
        match self.delete_blog(id).await {
            Ok(()) => DeleteOutcome { id, success: true, error: None },
            Err(err) => DeleteOutcome { id, success: false, error: Some(err.to_string()) },
        }
    }

    /// Load the fixture catalog through the chunked batch path.
    pub async fn seed_sample_blogs(&self) -> BlogResult<Vec<Blog>> {
        self.create_many_blogs(sample_catalog()).await
    }
}

/// Fixed demo content for local runs and smoke tests.
fn sample_catalog() -> Vec<CreateBlog> {
    let titles = [
        ("Getting started with Rust", "Ownership, borrowing and why the compiler is right."),
        ("Async pitfalls", "Cancellation, select loops and the tasks you forgot to join."),
        ("Document modeling", "When to embed and when to reference."),
        ("Optimistic concurrency", "Version tokens beat pessimistic locks for web workloads."),
        ("Observability on a budget", "Structured logs first, dashboards later."),
        ("Batch endpoints", "Chunking writes so the store survives your seed script."),
    ];
    titles
        .into_iter()
        .map(|(title, content)| CreateBlog {
            title: title.into(),
            content: content.into(),
            author_id: Uuid::now_v7(),
            tags: vec!["sample".into()],
            is_published: Some(true),
        })
        .collect()
}
