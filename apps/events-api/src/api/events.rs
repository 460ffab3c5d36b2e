//! Events API routes
//!
//! Wires the events domain to MongoDB and the JWT auth layer.

use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum_helpers::auth::{JwtAuth, jwt_auth_middleware};
use domain_events::{
    EventsContext, EventsState, LogNotifier, MongoCategoryResolver, MongoEventRepository,
    MongoIdentityResolver, MongoInviteDirectory, MongoLinkRepository, StatusSweeper,
};
use std::sync::Arc;
use tracing::info;

/// Assemble the domain context from the shared Mongo database handle.
pub fn context(state: &AppState) -> EventsState<MongoEventRepository, MongoLinkRepository> {
    let events = MongoEventRepository::new(&state.db);
    let links = MongoLinkRepository::new(&state.db);

    let identity = Arc::new(MongoIdentityResolver::new(&state.db));
    let categories = Arc::new(MongoCategoryResolver::new(&state.db));
    let invites = Arc::new(MongoInviteDirectory::new(&state.db));

    let service = domain_events::EventService::new(
        events.clone(),
        links.clone(),
        identity.clone(),
        categories.clone(),
        invites,
    )
    .with_notifier(Arc::new(LogNotifier));

    let aggregator = domain_events::ListAggregator::new(events, links, identity.clone(), categories);

    Arc::new(EventsContext {
        service,
        aggregator,
        identity,
    })
}

/// Create the events router with the JWT layer applied.
pub fn router(state: &AppState) -> Router {
    let jwt_auth = JwtAuth::new(&state.config.jwt);
    let ctx = context(state);

    domain_events::events_router(ctx).layer(middleware::from_fn_with_state(
        jwt_auth,
        jwt_auth_middleware,
    ))
}

/// Build the status sweeper over the same collections.
pub fn sweeper(state: &AppState) -> StatusSweeper<MongoEventRepository> {
    StatusSweeper::new(Arc::new(MongoEventRepository::new(&state.db)))
}

/// Initialize event and link collection indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoEventRepository::new(db)
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    MongoLinkRepository::new(db)
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create link indexes: {}", e))?;
    info!("Event and link collection indexes created");
    Ok(())
}
