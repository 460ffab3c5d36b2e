//! Events Domain
//!
//! The event lifecycle subsystem: a time-driven status machine over event
//! records, per-event supporter/invitee link rows, and a read-side join for
//! listing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Request Flow                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  mutation ──► AuthorizationGate ──► EventService ──► MongoDB │
//! │                                          │                   │
//! │                                          └─► link row upsert │
//! │                                                              │
//! │  read ──► ListAggregator ─┬─► events + link rows             │
//! │                           └─► identity / category resolvers  │
//! │                                                              │
//! │  StatusSweeper (cron) ──► batch status transitions           │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use utoipa::OpenApi;

mod aggregator;
mod authz;
mod collaborators;
mod error;
mod handlers;
mod models;
mod mongodb;
mod repository;
mod service;
mod sweeper;

pub use aggregator::ListAggregator;
pub use authz::{EventAction, authorize};
pub use collaborators::{
    CategoryResolver, IdentityResolver, InviteDirectory, LogNotifier, MongoCategoryResolver,
    MongoIdentityResolver, MongoInviteDirectory, NotificationSender,
};
pub use error::{EventError, Result};
pub use handlers::{EventsContext, EventsState, events_router};
pub use models::{
    Actor, CategoryRef, CreateEvent, DEFAULT_COVER_IMAGE, Event, EventFilter, EventPage, EventRow,
    EventStatus, EventSummaryPage, InviteLink, LinkStatus, MemberRef, Pagination, Role, SortOrder,
    SupportLink, UpdateEvent,
};
pub use mongodb::{MongoEventRepository, MongoLinkRepository};
pub use repository::{EventRepository, LinkRepository};
pub use service::EventService;
pub use sweeper::{StatusSweeper, SweepOutcome, SweeperHandle};

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_events,
        handlers::my_events,
        handlers::events_by_categories,
        handlers::get_event,
        handlers::create_event,
        handlers::update_event,
        handlers::cancel_event,
        handlers::delete_event,
    ),
    components(schemas(
        Event,
        EventStatus,
        EventRow,
        EventPage,
        EventSummaryPage,
        CreateEvent,
        UpdateEvent,
        Pagination,
        CategoryRef,
        MemberRef,
        SupportLink,
        InviteLink,
        LinkStatus,
        Actor,
        Role,
    )),
    tags(
        (name = "events", description = "Event lifecycle management")
    )
)]
pub struct ApiDoc;
