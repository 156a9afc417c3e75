//! HTTP route assembly. Routers returned by `routes` are nested under
//! `/api` by `axum_helpers::create_router`; the readiness probe is
//! merged at the top level next to `/health`.

pub mod blogs;
pub mod health;

use axum::Router;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/blogs", blogs::router(state))
}
