//! Shared application state passed to request handlers.

use mongodb::{Client, Database};

/// Cloned per handler; the MongoDB client shares its underlying
/// connection pool across clones.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
