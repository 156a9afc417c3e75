//! Blog domain: aggregate model, persistence, batch and analytics
//! engines, and the HTTP surface.
//!
//! A blog is one document; its comments are embedded and only ever
//! addressed through the parent. Every mutation is a read-modify-write
//! cycle ending in a conditional replace on the version token, retried
//! a bounded number of times on conflict.

pub mod analytics;
pub mod batch;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongo;
pub mod repository;
pub mod service;

pub use error::{BlogError, BlogResult};
pub use models::{
    AuthorActivity, Blog, BlogActivity, BlogRecentComments, BlogWithComments, BulkDeleteReport,
    Comment, CreateBlog, CreateComment, DeleteOutcome, UpdateBlog, UpdateComment,
};
pub use mongo::{init_collection, MongoBlogRepository, BLOGS_COLLECTION};
pub use repository::{BlogRepository, InMemoryBlogRepository};
pub use service::BlogService;
