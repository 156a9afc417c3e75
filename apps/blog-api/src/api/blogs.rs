//! Wires the blog domain to the MongoDB-backed repository.

use std::sync::Arc;

use axum::Router;
use domain_blogs::{BlogService, MongoBlogRepository};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoBlogRepository::new(&state.db);
    let service = BlogService::new(Arc::new(repository));
    domain_blogs::handlers::router(service)
}
