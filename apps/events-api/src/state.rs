//! Application state management.
//!
//! The shared application state passed to request handlers: configuration
//! plus the MongoDB client and database handles.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloned per handler (inexpensive Arc clones under the hood).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
}
