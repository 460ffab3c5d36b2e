//! API routes module
//!
//! Defines all HTTP API routes for the events service.

pub mod events;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/events", events::router(state))
        .merge(health::router(state.clone()))
}
