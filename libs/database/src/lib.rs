//! Database connectivity for the blog platform.
//!
//! Exposes the MongoDB connector used as the document store, plus the
//! shared connection-retry helpers.

pub mod common;
pub mod mongodb;
