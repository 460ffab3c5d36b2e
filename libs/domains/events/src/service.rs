//! Event service layer: mutations and link fan-out

use crate::authz::{EventAction, authorize};
use crate::collaborators::{
    CategoryResolver, IdentityResolver, InviteDirectory, NotificationSender,
};
use crate::error::{EventError, Result};
use crate::models::{
    Actor, CreateEvent, DEFAULT_COVER_IMAGE, Event, EventStatus, InviteLink, SupportLink,
    UpdateEvent,
};
use crate::repository::{EventRepository, LinkRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Coordinates the event store, the link rows, and the external
/// collaborators. Every operation takes the acting identity explicitly.
pub struct EventService<R: EventRepository, L: LinkRepository> {
    events: R,
    links: L,
    identity: Arc<dyn IdentityResolver>,
    categories: Arc<dyn CategoryResolver>,
    invites: Arc<dyn InviteDirectory>,
    notifier: Option<Arc<dyn NotificationSender>>,
}

/// Shape-check a list of raw reference ids, naming the first offender.
fn parse_ids(raw: &[String]) -> Result<Vec<Uuid>> {
    raw.iter()
        .map(|value| {
            Uuid::parse_str(value)
                .map_err(|_| EventError::invalid_argument(format!("Invalid id: {}", value)))
        })
        .collect()
}

impl<R: EventRepository, L: LinkRepository> EventService<R, L> {
    pub fn new(
        events: R,
        links: L,
        identity: Arc<dyn IdentityResolver>,
        categories: Arc<dyn CategoryResolver>,
        invites: Arc<dyn InviteDirectory>,
    ) -> Self {
        Self {
            events,
            links,
            identity,
            categories,
            invites,
            notifier: None,
        }
    }

    /// Add a notification sender for support-assignment changes
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSender>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Shape-check and resolve category references
    async fn resolve_categories(&self, raw: &[String]) -> Result<Vec<Uuid>> {
        let ids = parse_ids(raw)?;
        for id in &ids {
            if !self.categories.exists(id).await? {
                return Err(EventError::not_found("category", id));
            }
        }
        Ok(ids)
    }

    /// Create a new event in status CREATE.
    ///
    /// Link rows for supplied supporter/invitee lists are side effects of
    /// create, not part of its contract; a failed fan-out is logged and the
    /// event stands.
    #[instrument(skip(self, input), fields(actor = %actor.id, title = %input.title))]
    pub async fn create(&self, input: CreateEvent, actor: &Actor) -> Result<Event> {
        authorize(actor, EventAction::Create, None)?;
        input.validate()?;

        if input.end_date <= input.start_date {
            return Err(EventError::invalid_argument(
                "end_date must be after start_date",
            ));
        }

        let category_ids = self.resolve_categories(&input.category_ids).await?;
        let supporters = parse_ids(&input.supporters)?;
        let invitees = parse_ids(&input.invites)?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            location: input.location,
            start_date: input.start_date,
            end_date: input.end_date,
            status: EventStatus::Create,
            cover_image: input
                .cover_image
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            category_ids,
            limit_seat: input.limit_seat,
            total_seats: input.total_seats,
            total_customer_invites: 0,
            total_supports: 0,
            total_details: 0,
            total_costs: 0,
            total_feedbacks: 0,
            estimate_price: input.estimate_price,
            real_price: input.real_price,
            created_by: actor.id,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let event = self.events.insert(event).await?;
        info!(event_id = %event.id, "Event created");

        if !supporters.is_empty() {
            if let Err(e) = self.upsert_support(&event.id, supporters, actor).await {
                warn!(event_id = %event.id, error = %e, "Support link fan-out failed");
            }
        }
        if !invitees.is_empty() {
            if let Err(e) = self.upsert_invite(&event.id, invitees, actor).await {
                warn!(event_id = %event.id, error = %e, "Invite link fan-out failed");
            }
        }

        Ok(event)
    }

    /// Apply a partial patch to an existing event.
    ///
    /// Only the creator or an admin may update. Membership lists present in
    /// the patch are upserted (never appended) into the link rows after the
    /// event write; the two writes are not transactional, but the upsert is
    /// idempotent so a retried caller self-heals.
    #[instrument(skip(self, patch), fields(event_id = %id, actor = %actor.id))]
    pub async fn update(&self, id: &Uuid, patch: UpdateEvent, actor: &Actor) -> Result<Event> {
        patch.validate()?;

        let mut event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::not_found("event", id))?;

        authorize(actor, EventAction::Update, Some(&event.created_by))?;

        // Dates are cross-checked only when the patch carries both bounds.
        // TODO: validate a single-sided date patch against the stored window.
        if let (Some(start), Some(end)) = (patch.start_date, patch.end_date) {
            if end <= start {
                return Err(EventError::invalid_argument(
                    "end_date must be after start_date",
                ));
            }
        }

        if let Some(raw) = &patch.category_ids {
            event.category_ids = self.resolve_categories(raw).await?;
        }

        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(start_date) = patch.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            event.end_date = end_date;
        }
        if let Some(cover_image) = patch.cover_image {
            event.cover_image = cover_image;
        }
        if let Some(limit_seat) = patch.limit_seat {
            event.limit_seat = limit_seat;
        }
        if let Some(total_seats) = patch.total_seats {
            event.total_seats = total_seats;
        }
        if let Some(estimate_price) = patch.estimate_price {
            event.estimate_price = estimate_price;
        }
        if let Some(real_price) = patch.real_price {
            event.real_price = real_price;
        }

        event.updated_by = Some(actor.id);
        event.updated_at = Utc::now();

        self.events.replace(&event).await?;
        info!(event_id = %event.id, "Event updated");

        if let Some(raw) = &patch.supporters {
            let supporters = parse_ids(raw)?;
            self.upsert_support(&event.id, supporters, actor).await?;
        }
        if let Some(raw) = &patch.invites {
            let invitees = parse_ids(raw)?;
            self.upsert_invite(&event.id, invitees, actor).await?;
        }

        Ok(event)
    }

    /// Cancel an event. Terminal and idempotent; nothing is removed.
    #[instrument(skip(self), fields(event_id = %id, actor = %actor.id))]
    pub async fn cancel(&self, id: &Uuid, actor: &Actor) -> Result<Event> {
        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::not_found("event", id))?;

        authorize(actor, EventAction::Cancel, Some(&event.created_by))?;

        let cancelled = self
            .events
            .set_status(id, EventStatus::Cancelled, Some(actor.id))
            .await?
            .ok_or_else(|| EventError::not_found("event", id))?;

        info!(event_id = %id, "Event cancelled");
        Ok(cancelled)
    }

    /// Soft delete: cancel the event and deactivate its link rows.
    #[instrument(skip(self), fields(event_id = %id, actor = %actor.id))]
    pub async fn delete(&self, id: &Uuid, actor: &Actor) -> Result<Event> {
        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::not_found("event", id))?;

        authorize(actor, EventAction::Delete, Some(&event.created_by))?;

        let cancelled = self
            .events
            .set_status(id, EventStatus::Cancelled, Some(actor.id))
            .await?
            .ok_or_else(|| EventError::not_found("event", id))?;

        self.links.deactivate(id).await?;

        info!(event_id = %id, "Event soft-deleted");
        Ok(cancelled)
    }

    /// Fetch one event by id
    #[instrument(skip(self), fields(event_id = %id, actor = %actor.id))]
    pub async fn get_by_id(&self, id: &Uuid, actor: &Actor) -> Result<Event> {
        authorize(actor, EventAction::Read, None)?;

        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::not_found("event", id))
    }

    /// Replace (or lazily create) the support membership for an event.
    ///
    /// Every member id is resolved before anything is written, so a
    /// rejection never leaves partial membership behind. Exactly one row
    /// exists per event no matter how often this is called.
    #[instrument(skip(self, user_ids), fields(event_id = %event_id, members = user_ids.len()))]
    pub async fn upsert_support(
        &self,
        event_id: &Uuid,
        user_ids: Vec<Uuid>,
        actor: &Actor,
    ) -> Result<SupportLink> {
        // Pre-check pass before the write
        for user_id in &user_ids {
            if !self.identity.exists(user_id).await? {
                return Err(EventError::not_found("user", user_id));
            }
        }

        let (link, changed) = match self.links.find_support(event_id).await? {
            Some(mut link) => {
                let changed = link.user_ids != user_ids;
                link.user_ids = user_ids;
                link.updated_by = Some(actor.id);
                link.updated_at = Utc::now();
                (link, changed)
            }
            None => {
                let link = SupportLink::new(*event_id, user_ids, actor.id);
                (link, true)
            }
        };

        let link = self.links.save_support(link).await?;

        if changed {
            if let Some(notifier) = &self.notifier {
                for user_id in link.user_ids.clone() {
                    let notifier = Arc::clone(notifier);
                    let event_id = *event_id;
                    tokio::spawn(async move {
                        let message =
                            format!("You have been assigned to support event {}", event_id);
                        if let Err(e) = notifier.notify(&user_id, &message).await {
                            warn!(user_id = %user_id, error = %e, "Failed to send support notification");
                        }
                    });
                }
            }
        }

        Ok(link)
    }

    /// Replace (or lazily create) the invited-party membership for an event.
    #[instrument(skip(self, invite_ids), fields(event_id = %event_id, members = invite_ids.len()))]
    pub async fn upsert_invite(
        &self,
        event_id: &Uuid,
        invite_ids: Vec<Uuid>,
        actor: &Actor,
    ) -> Result<InviteLink> {
        for invite_id in &invite_ids {
            if !self.invites.exists(invite_id).await? {
                return Err(EventError::not_found("invite", invite_id));
            }
        }

        let link = match self.links.find_invite(event_id).await? {
            Some(mut link) => {
                link.invite_ids = invite_ids;
                link.updated_by = Some(actor.id);
                link.updated_at = Utc::now();
                link
            }
            None => InviteLink::new(*event_id, invite_ids, actor.id),
        };

        self.links.save_invite(link).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::mock::{
        MockCategoryResolver, MockIdentityResolver, MockInviteDirectory,
    };
    use crate::models::Role;
    use crate::repository::mock::{MockEventRepository, MockLinkRepository};
    use chrono::{TimeZone, Utc};

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::now_v7(),
            role,
            display_name: "Test User".to_string(),
        }
    }

    fn sample_create() -> CreateEvent {
        CreateEvent {
            title: "Annual company retreat".to_string(),
            description: "Two days of workshops and team building".to_string(),
            location: "Mountain lodge".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 1, 10, 2, 0, 0).unwrap(),
            cover_image: None,
            category_ids: vec![Uuid::now_v7().to_string()],
            supporters: vec![],
            invites: vec![],
            limit_seat: false,
            total_seats: 0,
            estimate_price: 0,
            real_price: 0,
        }
    }

    fn stored_event(created_by: Uuid) -> Event {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Event {
            id: Uuid::now_v7(),
            title: "Annual company retreat".to_string(),
            description: "Two days of workshops and team building".to_string(),
            location: "Mountain lodge".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 1, 10, 2, 0, 0).unwrap(),
            status: EventStatus::Create,
            cover_image: DEFAULT_COVER_IMAGE.to_string(),
            category_ids: vec![Uuid::now_v7()],
            limit_seat: false,
            total_seats: 0,
            total_customer_invites: 0,
            total_supports: 0,
            total_details: 0,
            total_costs: 0,
            total_feedbacks: 0,
            estimate_price: 0,
            real_price: 0,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        events: MockEventRepository,
        links: MockLinkRepository,
        identity: MockIdentityResolver,
        categories: MockCategoryResolver,
        invites: MockInviteDirectory,
    ) -> EventService<MockEventRepository, MockLinkRepository> {
        EventService::new(
            events,
            links,
            Arc::new(identity),
            Arc::new(categories),
            Arc::new(invites),
        )
    }

    #[tokio::test]
    async fn test_create_persists_in_create_status() {
        let actor = actor(Role::Organizer);
        let actor_id = actor.id;

        let mut events = MockEventRepository::new();
        events
            .expect_insert()
            .withf(move |event| {
                event.status == EventStatus::Create
                    && event.created_by == actor_id
                    && event.cover_image == DEFAULT_COVER_IMAGE
            })
            .returning(|event| Ok(event));

        let mut categories = MockCategoryResolver::new();
        categories.expect_exists().returning(|_| Ok(true));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            categories,
            MockInviteDirectory::new(),
        );

        let event = service.create(sample_create(), &actor).await.unwrap();
        assert_eq!(event.status, EventStatus::Create);
        assert_eq!(event.created_by, actor.id);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_category_id() {
        let actor = actor(Role::Customer);

        let mut input = sample_create();
        input.category_ids = vec!["not-a-uuid".to_string()];

        // No insert expectation: reaching the store would panic the mock
        let service = service(
            MockEventRepository::new(),
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let err = service.create(input, &actor).await.unwrap_err();
        match err {
            EventError::InvalidArgument { message } => {
                assert!(message.contains("not-a-uuid"), "message: {}", message);
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unresolvable_category() {
        let actor = actor(Role::Customer);
        let missing = Uuid::now_v7();

        let mut input = sample_create();
        input.category_ids = vec![missing.to_string()];

        let mut categories = MockCategoryResolver::new();
        categories.expect_exists().returning(|_| Ok(false));

        let service = service(
            MockEventRepository::new(),
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            categories,
            MockInviteDirectory::new(),
        );

        let err = service.create(input, &actor).await.unwrap_err();
        match err {
            EventError::NotFound { entity, id } => {
                assert_eq!(entity, "category");
                assert_eq!(id, missing.to_string());
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_dates() {
        let actor = actor(Role::Customer);

        let mut input = sample_create();
        input.end_date = input.start_date - chrono::Duration::hours(1);

        let service = service(
            MockEventRepository::new(),
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let err = service.create(input, &actor).await.unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_create_fans_out_support_link() {
        let actor = actor(Role::Organizer);
        let s1 = Uuid::now_v7();
        let s2 = Uuid::now_v7();

        let mut input = sample_create();
        input.supporters = vec![s1.to_string(), s2.to_string()];

        let mut events = MockEventRepository::new();
        events.expect_insert().returning(|event| Ok(event));

        let mut categories = MockCategoryResolver::new();
        categories.expect_exists().returning(|_| Ok(true));

        let mut identity = MockIdentityResolver::new();
        identity.expect_exists().times(2).returning(|_| Ok(true));

        let mut links = MockLinkRepository::new();
        links.expect_find_support().returning(|_| Ok(None));
        links
            .expect_save_support()
            .withf(move |link| link.user_ids == vec![s1, s2])
            .returning(|link| Ok(link));

        let service = service(events, links, identity, categories, MockInviteDirectory::new());

        let event = service.create(input, &actor).await.unwrap();
        assert_eq!(event.status, EventStatus::Create);
    }

    #[tokio::test]
    async fn test_create_survives_failed_fan_out() {
        let actor = actor(Role::Organizer);
        let missing = Uuid::now_v7();

        let mut input = sample_create();
        input.supporters = vec![missing.to_string()];

        let mut events = MockEventRepository::new();
        events.expect_insert().returning(|event| Ok(event));

        let mut categories = MockCategoryResolver::new();
        categories.expect_exists().returning(|_| Ok(true));

        // Supporter does not resolve: the link upsert fails but create still
        // returns the persisted event
        let mut identity = MockIdentityResolver::new();
        identity.expect_exists().returning(|_| Ok(false));

        let service = service(
            events,
            MockLinkRepository::new(),
            identity,
            categories,
            MockInviteDirectory::new(),
        );

        assert!(service.create(input, &actor).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_forbidden_for_non_owner() {
        let owner = Uuid::now_v7();
        let intruder = actor(Role::Customer);

        let event = stored_event(owner);
        let event_id = event.id;

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let err = service
            .update(&event_id, UpdateEvent::default(), &intruder)
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_update_allows_admin_on_foreign_event() {
        let owner = Uuid::now_v7();
        let admin = actor(Role::Admin);

        let event = stored_event(owner);
        let event_id = event.id;

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        events.expect_replace().returning(|_| Ok(()));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let patch = UpdateEvent {
            title: Some("Renamed by admin team".to_string()),
            ..Default::default()
        };
        let updated = service.update(&event_id, patch, &admin).await.unwrap();
        assert_eq!(updated.title, "Renamed by admin team");
        assert_eq!(updated.updated_by, Some(admin.id));
        // Ownership never moves
        assert_eq!(updated.created_by, owner);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let actor = actor(Role::Admin);

        let mut events = MockEventRepository::new();
        events.expect_find_by_id().returning(|_| Ok(None));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let err = service
            .update(&Uuid::now_v7(), UpdateEvent::default(), &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound { entity: "event", .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_date_pair() {
        let actor = actor(Role::Admin);
        let event = stored_event(actor.id);
        let event_id = event.id;

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let start = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let patch = UpdateEvent {
            start_date: Some(start),
            end_date: Some(start - chrono::Duration::hours(2)),
            ..Default::default()
        };
        let err = service.update(&event_id, patch, &actor).await.unwrap_err();
        assert!(matches!(err, EventError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_update_single_sided_date_patch_is_not_cross_checked() {
        // The loose edge: only one bound in the patch skips the ordering
        // check against the stored value
        let actor = actor(Role::Admin);
        let event = stored_event(actor.id);
        let event_id = event.id;
        let stored_start = event.start_date;

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        events.expect_replace().returning(|_| Ok(()));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let patch = UpdateEvent {
            end_date: Some(stored_start - chrono::Duration::hours(1)),
            ..Default::default()
        };
        assert!(service.update(&event_id, patch, &actor).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_replaces_support_membership_in_place() {
        let actor = actor(Role::Admin);
        let event = stored_event(actor.id);
        let event_id = event.id;

        let s1 = Uuid::now_v7();
        let s2 = Uuid::now_v7();
        let existing = SupportLink::new(event_id, vec![s1, s2], actor.id);
        let existing_row_id = existing.id;

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        events.expect_replace().returning(|_| Ok(()));

        let mut identity = MockIdentityResolver::new();
        identity.expect_exists().returning(|_| Ok(true));

        let mut links = MockLinkRepository::new();
        links
            .expect_find_support()
            .returning(move |_| Ok(Some(existing.clone())));
        links
            .expect_save_support()
            .withf(move |link| {
                // Same row, membership replaced rather than appended
                link.id == existing_row_id && link.user_ids == vec![s1]
            })
            .returning(|link| Ok(link));

        let service = service(
            events,
            links,
            identity,
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let patch = UpdateEvent {
            supporters: Some(vec![s1.to_string()]),
            ..Default::default()
        };
        assert!(service.update(&event_id, patch, &actor).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_unresolvable_supporter_before_writing() {
        let actor = actor(Role::Admin);
        let event = stored_event(actor.id);
        let event_id = event.id;
        let missing = Uuid::now_v7();

        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        events.expect_replace().returning(|_| Ok(()));

        let mut identity = MockIdentityResolver::new();
        identity.expect_exists().returning(|_| Ok(false));

        // No save_support expectation: a write would panic the mock
        let mut links = MockLinkRepository::new();
        links.expect_find_support().never();

        let service = service(
            events,
            links,
            identity,
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let patch = UpdateEvent {
            supporters: Some(vec![missing.to_string()]),
            ..Default::default()
        };
        let err = service.update(&event_id, patch, &actor).await.unwrap_err();
        match err {
            EventError::NotFound { entity, id } => {
                assert_eq!(entity, "user");
                assert_eq!(id, missing.to_string());
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let actor = actor(Role::Customer);
        let mut event = stored_event(actor.id);
        event.status = EventStatus::Cancelled;
        let event_id = event.id;

        let find = event.clone();
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(find.clone())));
        events
            .expect_set_status()
            .withf(|_, status, _| *status == EventStatus::Cancelled)
            .returning(move |_, _, _| Ok(Some(event.clone())));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let cancelled = service.cancel(&event_id, &actor).await.unwrap();
        assert_eq!(cancelled.status, EventStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_delete_deactivates_links() {
        let actor = actor(Role::Customer);
        let event = stored_event(actor.id);
        let event_id = event.id;

        let find = event.clone();
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(find.clone())));
        events.expect_set_status().returning(move |_, _, _| {
            let mut cancelled = event.clone();
            cancelled.status = EventStatus::Cancelled;
            Ok(Some(cancelled))
        });

        let mut links = MockLinkRepository::new();
        links
            .expect_deactivate()
            .withf(move |id| *id == event_id)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(
            events,
            links,
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let deleted = service.delete(&event_id, &actor).await.unwrap();
        assert_eq!(deleted.status, EventStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let actor = actor(Role::Customer);

        let mut events = MockEventRepository::new();
        events.expect_find_by_id().returning(|_| Ok(None));

        let service = service(
            events,
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            MockInviteDirectory::new(),
        );

        let err = service.get_by_id(&Uuid::now_v7(), &actor).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound { entity: "event", .. }));
    }

    #[tokio::test]
    async fn test_upsert_invite_checks_directory() {
        let actor = actor(Role::Organizer);
        let event_id = Uuid::now_v7();
        let missing = Uuid::now_v7();

        let mut invites = MockInviteDirectory::new();
        invites.expect_exists().returning(|_| Ok(false));

        let service = service(
            MockEventRepository::new(),
            MockLinkRepository::new(),
            MockIdentityResolver::new(),
            MockCategoryResolver::new(),
            invites,
        );

        let err = service
            .upsert_invite(&event_id, vec![missing], &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound { entity: "invite", .. }));
    }
}
