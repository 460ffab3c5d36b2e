//! HTTP handlers for the events API

use crate::aggregator::ListAggregator;
use crate::collaborators::IdentityResolver;
use crate::error::EventError;
use crate::models::{
    Actor, CreateEvent, Event, EventFilter, EventPage, EventSummaryPage, SortOrder, UpdateEvent,
};
use crate::repository::{EventRepository, LinkRepository};
use crate::service::EventService;
use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use axum_helpers::auth::JwtClaims;
use axum_helpers::{UuidPath, ValidatedJson};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Everything the events routes need, bundled as shared state.
pub struct EventsContext<R: EventRepository, L: LinkRepository> {
    pub service: EventService<R, L>,
    pub aggregator: ListAggregator<R, L>,
    pub identity: Arc<dyn IdentityResolver>,
}

/// Events router state
pub type EventsState<R, L> = Arc<EventsContext<R, L>>;

/// Create the events router.
///
/// Every route runs behind [`resolve_actor`]; there is no anonymous entry
/// point anywhere on this surface.
pub fn events_router<R: EventRepository + 'static, L: LinkRepository + 'static>(
    state: EventsState<R, L>,
) -> Router {
    Router::new()
        .route("/", get(list_events::<R, L>).post(create_event::<R, L>))
        .route("/my-events", get(my_events::<R, L>))
        .route("/event-by-categories", get(events_by_categories::<R, L>))
        .route(
            "/{id}",
            get(get_event::<R, L>)
                .put(update_event::<R, L>)
                .delete(delete_event::<R, L>),
        )
        .route("/{id}/cancel", patch(cancel_event::<R, L>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_actor::<R, L>,
        ))
        .with_state(state)
}

/// Turn the verified JWT claims into a resolved [`Actor`].
///
/// The JWT layer upstream has already checked signature and expiry; here
/// the subject is resolved through the identity collaborator and attached
/// to the request. Anything unresolvable is a 401 before any handler runs.
pub async fn resolve_actor<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let claims = request
        .extensions()
        .get::<JwtClaims>()
        .cloned()
        .ok_or_else(|| EventError::unauthorized().into_response())?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| EventError::unauthorized().into_response())?;

    let actor = state
        .identity
        .resolve(&user_id)
        .await
        .map_err(|e| e.into_response())?
        .ok_or_else(|| EventError::unauthorized().into_response())?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| EventError::unauthorized().into_response())
    }
}

/// Query parameters for the by-categories listing
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    /// Comma-separated category ids
    pub category_ids: String,
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

/// List events with filtering, sorting, and pagination
#[utoipa::path(
    get,
    path = "/",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive title search"),
        ("start_date" = Option<String>, Query, description = "Window overlap start (ISO 8601)"),
        ("end_date" = Option<String>, Query, description = "Window overlap end (ISO 8601)"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category membership"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("sort_by" = Option<String>, Query, description = "Sort field (defaults to created_at)"),
        ("sort_order" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "Page of enriched events", body = EventPage),
        (status = 401, description = "No resolved actor"),
        (status = 500, description = "Internal error")
    ),
    tag = "events"
)]
#[instrument(skip(state, filter))]
pub async fn list_events<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    Query(filter): Query<EventFilter>,
) -> Result<Json<EventPage>, EventError> {
    let page = state.aggregator.list(&filter, &actor).await?;
    Ok(Json(page))
}

/// The actor's own events, newest first
#[utoipa::path(
    get,
    path = "/my-events",
    responses(
        (status = 200, description = "Events created by the actor", body = Vec<Event>),
        (status = 401, description = "No resolved actor")
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn my_events<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
) -> Result<Json<Vec<Event>>, EventError> {
    let events = state.aggregator.my_events(&actor).await?;
    Ok(Json(events))
}

/// Unenriched page of events in any of the given categories
#[utoipa::path(
    get,
    path = "/event-by-categories",
    params(
        ("category_ids" = String, Query, description = "Comma-separated category ids"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
    ),
    responses(
        (status = 200, description = "Page of events", body = EventSummaryPage),
        (status = 400, description = "Malformed category id"),
        (status = 401, description = "No resolved actor")
    ),
    tag = "events"
)]
#[instrument(skip(state, query))]
pub async fn events_by_categories<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<EventSummaryPage>, EventError> {
    let raw_ids: Vec<String> = query
        .category_ids
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let filter = EventFilter {
        page: query.page,
        limit: query.limit,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        ..Default::default()
    };

    let page = state
        .aggregator
        .list_by_categories(&raw_ids, &filter, &actor)
        .await?;
    Ok(Json(page))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn get_event<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> Result<Json<Event>, EventError> {
    let event = state.service.get_by_id(&id, &actor).await?;
    Ok(Json(event))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Validation error"),
        (status = 401, description = "No resolved actor"),
        (status = 403, description = "Forbidden")
    ),
    tag = "events"
)]
#[instrument(skip(state, input), fields(title = %input.title))]
pub async fn create_event<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> Result<impl IntoResponse, EventError> {
    let event = state.service.create(input, &actor).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event (owner or admin only)
#[utoipa::path(
    put,
    path = "/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the creator or an admin"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
#[instrument(skip(state, patch))]
pub async fn update_event<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    UuidPath(id): UuidPath,
    ValidatedJson(patch): ValidatedJson<UpdateEvent>,
) -> Result<Json<Event>, EventError> {
    let event = state.service.update(&id, patch, &actor).await?;
    Ok(Json(event))
}

/// Cancel an event (terminal, idempotent)
#[utoipa::path(
    patch,
    path = "/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event cancelled", body = Event),
        (status = 403, description = "Not the creator or an admin"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn cancel_event<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> Result<Json<Event>, EventError> {
    let event = state.service.cancel(&id, &actor).await?;
    Ok(Json(event))
}

/// Soft-delete an event: cancel it and deactivate its link rows
#[utoipa::path(
    delete,
    path = "/{id}",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event soft-deleted", body = Event),
        (status = 403, description = "Not the creator or an admin"),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn delete_event<R: EventRepository, L: LinkRepository>(
    State(state): State<EventsState<R, L>>,
    actor: Actor,
    UuidPath(id): UuidPath,
) -> Result<Json<Event>, EventError> {
    let event = state.service.delete(&id, &actor).await?;
    Ok(Json(event))
}
