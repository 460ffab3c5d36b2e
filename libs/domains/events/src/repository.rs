//! Repository traits for event and link storage

use crate::error::Result;
use crate::models::{Event, EventFilter, EventStatus, InviteLink, SupportLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Repository trait for event storage operations
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event
    async fn insert(&self, event: Event) -> Result<Event>;

    /// Get event by ID
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Event>>;

    /// Persist a fully-applied patch (whole-document replace)
    async fn replace(&self, event: &Event) -> Result<()>;

    /// Atomically set the status of one event, returning the updated
    /// document when it exists
    async fn set_status(
        &self,
        id: &Uuid,
        status: EventStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Event>>;

    /// List events matching the filter, sorted and paginated
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Count events matching the filter
    async fn count(&self, filter: &EventFilter) -> Result<u64>;

    /// Events created by one user, newest first
    async fn find_by_creator(&self, creator: &Uuid) -> Result<Vec<Event>>;

    /// Sweep batch: close every non-closed, non-cancelled event whose end
    /// date has passed. Returns the number of modified documents.
    async fn close_ended(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Sweep batch: move every CREATE event whose start date has been
    /// reached to PROCESS. Returns the number of modified documents.
    async fn start_due(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Repository trait for the per-event support/invite link rows
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// The single support row for an event, if any
    async fn find_support(&self, event_id: &Uuid) -> Result<Option<SupportLink>>;

    /// Persist a support row, keyed by event id (insert or replace)
    async fn save_support(&self, link: SupportLink) -> Result<SupportLink>;

    /// The single invite row for an event, if any
    async fn find_invite(&self, event_id: &Uuid) -> Result<Option<InviteLink>>;

    /// Persist an invite row, keyed by event id (insert or replace)
    async fn save_invite(&self, link: InviteLink) -> Result<InviteLink>;

    /// Soft-delete both link rows for an event
    async fn deactivate(&self, event_id: &Uuid) -> Result<()>;
}
