//! Event domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Cover image used when an event is created without one.
pub const DEFAULT_COVER_IMAGE: &str = "https://via.placeholder.com/600x400";

/// Event lifecycle status.
///
/// `Create` and `Process` are assigned by the sweeper against the event's
/// time window; `Cancelled` is terminal and only ever set by an explicit
/// cancel/delete.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Created, not yet started
    #[default]
    Create,
    /// Currently running (start date reached)
    Process,
    /// Past its end date
    Closed,
    /// Explicitly cancelled; never left by any transition
    Cancelled,
}

impl EventStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Roles carried by authenticated identities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Customer,
}

/// Soft-delete status for link rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    Inactive,
}

/// The authenticated identity performing an operation.
///
/// Threaded explicitly through every call; there is no request-attached or
/// global current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// The event aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub location: String,

    /// Start of the event window (UTC)
    pub start_date: DateTime<Utc>,

    /// End of the event window (UTC); always after `start_date`
    pub end_date: DateTime<Utc>,

    pub status: EventStatus,

    #[serde(default)]
    pub cover_image: String,

    /// References to the category collaborator; non-empty
    pub category_ids: Vec<Uuid>,

    /// Whether seating is capped. Data-entry only; nothing enforces it.
    #[serde(default)]
    pub limit_seat: bool,

    #[serde(default)]
    pub total_seats: i64,

    // Denormalized counters. Kept in sync by the subsystems that own the
    // underlying records; this service stores and returns them untouched.
    #[serde(default)]
    pub total_customer_invites: i64,
    #[serde(default)]
    pub total_supports: i64,
    #[serde(default)]
    pub total_details: i64,
    #[serde(default)]
    pub total_costs: i64,
    #[serde(default)]
    pub total_feedbacks: i64,

    #[serde(default)]
    pub estimate_price: i64,
    #[serde(default)]
    pub real_price: i64,

    /// Creator; immutable, basis of ownership checks
    pub created_by: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row per event holding the current set of supporting users.
///
/// Created lazily on the first write that carries supporters, updated in
/// place afterwards, soft-deactivated when the parent event is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportLink {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,

    pub event_id: Uuid,

    pub user_ids: Vec<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default = "default_true")]
    pub accepted: bool,

    #[serde(default)]
    pub status: LinkStatus,

    pub created_by: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportLink {
    /// Fresh link row for an event without one.
    pub fn new(event_id: Uuid, user_ids: Vec<Uuid>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            event_id,
            user_ids,
            responsible: None,
            note: None,
            accepted: true,
            status: LinkStatus::Active,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Same per-event pattern as [`SupportLink`], referencing invited parties.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteLink {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,

    pub event_id: Uuid,

    pub invite_ids: Vec<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default)]
    pub status: LinkStatus,

    pub created_by: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InviteLink {
    pub fn new(event_id: Uuid, invite_ids: Vec<Uuid>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            event_id,
            invite_ids,
            note: None,
            status: LinkStatus::Active,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for creating a new event.
///
/// Reference ids arrive as raw strings and are shape-checked by the service
/// so the offending value can be named in the rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    #[validate(length(min = 5, max = 255, message = "Title must be 5-255 characters"))]
    pub title: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: String,

    /// Accepted with any offset, normalized to UTC
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category_ids: Vec<String>,

    /// Supporting users; triggers SupportLink fan-out when non-empty
    #[serde(default)]
    pub supporters: Vec<String>,

    /// Invited parties; triggers InviteLink fan-out when non-empty
    #[serde(default)]
    pub invites: Vec<String>,

    #[serde(default)]
    pub limit_seat: bool,
    #[serde(default)]
    pub total_seats: i64,
    #[serde(default)]
    pub estimate_price: i64,
    #[serde(default)]
    pub real_price: i64,
}

/// Partial patch for an existing event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEvent {
    #[validate(length(min = 5, max = 255, message = "Title must be 5-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: Option<String>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    pub cover_image: Option<String>,

    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category_ids: Option<Vec<String>>,

    /// Replaces the SupportLink membership when present
    pub supporters: Option<Vec<String>>,

    /// Replaces the InviteLink membership when present
    pub invites: Option<Vec<String>>,

    pub limit_seat: Option<bool>,
    pub total_seats: Option<i64>,
    pub estimate_price: Option<i64>,
    pub real_price: Option<i64>,
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter options for querying events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    /// Case-insensitive substring match on title
    #[serde(default)]
    pub q: Option<String>,

    /// Window-overlap filter: matches events with `end_date >= start_date`
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Window-overlap filter: matches events with `start_date <= end_date`
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Single category membership filter
    #[serde(default)]
    pub category_id: Option<Uuid>,

    /// Multi-category membership filter (by-categories endpoint)
    #[serde(skip)]
    pub category_ids: Vec<Uuid>,

    #[serde(default)]
    pub page: Option<u64>,

    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub sort_by: Option<String>,

    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl EventFilter {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// 1-based page number
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to 1..=MAX_LIMIT
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Documents to skip for the requested page
    pub fn skip(&self) -> u64 {
        (self.page() - 1) * self.limit() as u64
    }

    /// Whitelisted sort field; unknown or absent fields fall back to
    /// `created_at`.
    pub fn sort_field(&self) -> &'static str {
        match self.sort_by.as_deref() {
            Some("title") => "title",
            Some("status") => "status",
            Some("start_date" | "startDate") => "start_date",
            Some("end_date" | "endDate") => "end_date",
            Some("updated_at" | "updatedAt") => "updated_at",
            _ => "created_at",
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// Pagination envelope returned with every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: i64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit as u64),
        }
    }
}

/// Category reference resolved through the category collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

/// User reference resolved through the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MemberRef {
    pub id: Uuid,
    pub name: String,
}

/// An event enriched with its joined relationships for listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventRow {
    #[serde(flatten)]
    pub event: Event,

    /// SupportLink membership, resolved to display names
    pub supporters: Vec<MemberRef>,

    /// InviteLink membership (ids only)
    pub invitees: Vec<Uuid>,

    /// Resolved categories (id + name only)
    pub categories: Vec<CategoryRef>,

    /// Creator display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
}

/// Page of enriched rows, shaped as `{ events, pagination }`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventPage {
    pub events: Vec<EventRow>,
    pub pagination: Pagination,
}

/// Page of plain events (no joins).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSummaryPage {
    pub events: Vec<Event>,
    pub pagination: Pagination,
}
