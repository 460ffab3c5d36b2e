//! End-to-end lifecycle scenario over in-memory stores.
//!
//! Drives the public service/sweeper API against a shared in-memory
//! implementation of the repository traits: create with fan-out, membership
//! replacement, time-driven transitions, and the ownership gate.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain_events::{
    Actor, CreateEvent, Event, EventError, EventFilter, EventRepository, EventService, EventStatus,
    InviteLink, LinkRepository, ListAggregator, Result, Role, StatusSweeper, SupportLink,
    UpdateEvent,
};
use domain_events::{CategoryRef, CategoryResolver, IdentityResolver, InviteDirectory};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    events: Mutex<HashMap<Uuid, Event>>,
    supports: Mutex<HashMap<Uuid, SupportLink>>,
    invites: Mutex<HashMap<Uuid, InviteLink>>,
}

/// Shared in-memory store implementing both repository traits.
#[derive(Clone, Default)]
struct InMemoryStore {
    inner: Arc<Inner>,
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert(&self, event: Event) -> Result<Event> {
        self.inner
            .events
            .lock()
            .unwrap()
            .insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Event>> {
        Ok(self.inner.events.lock().unwrap().get(id).cloned())
    }

    async fn replace(&self, event: &Event) -> Result<()> {
        self.inner
            .events
            .lock()
            .unwrap()
            .insert(event.id, event.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: EventStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Event>> {
        let mut events = self.inner.events.lock().unwrap();
        Ok(events.get_mut(id).map(|event| {
            event.status = status;
            event.updated_by = updated_by;
            event.clone()
        }))
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self.inner.events.lock().unwrap().values().cloned().collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events
            .into_iter()
            .skip(filter.skip() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn count(&self, _filter: &EventFilter) -> Result<u64> {
        Ok(self.inner.events.lock().unwrap().len() as u64)
    }

    async fn find_by_creator(&self, creator: &Uuid) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .inner
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.created_by == *creator)
            .cloned()
            .collect();
        events.sort_by_key(|e| std::cmp::Reverse(e.created_at));
        Ok(events)
    }

    async fn close_ended(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut count = 0;
        for event in self.inner.events.lock().unwrap().values_mut() {
            if event.status != EventStatus::Closed
                && event.status != EventStatus::Cancelled
                && event.end_date < now
            {
                event.status = EventStatus::Closed;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn start_due(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut count = 0;
        for event in self.inner.events.lock().unwrap().values_mut() {
            if event.status == EventStatus::Create && event.start_date <= now {
                event.status = EventStatus::Process;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn find_support(&self, event_id: &Uuid) -> Result<Option<SupportLink>> {
        Ok(self.inner.supports.lock().unwrap().get(event_id).cloned())
    }

    async fn save_support(&self, link: SupportLink) -> Result<SupportLink> {
        self.inner
            .supports
            .lock()
            .unwrap()
            .insert(link.event_id, link.clone());
        Ok(link)
    }

    async fn find_invite(&self, event_id: &Uuid) -> Result<Option<InviteLink>> {
        Ok(self.inner.invites.lock().unwrap().get(event_id).cloned())
    }

    async fn save_invite(&self, link: InviteLink) -> Result<InviteLink> {
        self.inner
            .invites
            .lock()
            .unwrap()
            .insert(link.event_id, link.clone());
        Ok(link)
    }

    async fn deactivate(&self, event_id: &Uuid) -> Result<()> {
        use domain_events::LinkStatus;
        if let Some(link) = self.inner.supports.lock().unwrap().get_mut(event_id) {
            link.status = LinkStatus::Inactive;
        }
        if let Some(link) = self.inner.invites.lock().unwrap().get_mut(event_id) {
            link.status = LinkStatus::Inactive;
        }
        Ok(())
    }
}

/// Identity directory over a fixed set of known users.
struct StaticUsers {
    known: Vec<Uuid>,
}

#[async_trait]
impl IdentityResolver for StaticUsers {
    async fn resolve(&self, user_id: &Uuid) -> Result<Option<Actor>> {
        Ok(self.known.contains(user_id).then(|| Actor {
            id: *user_id,
            role: Role::Customer,
            display_name: format!("user-{}", user_id),
        }))
    }
}

struct AllCategories;

#[async_trait]
impl CategoryResolver for AllCategories {
    async fn resolve(&self, category_id: &Uuid) -> Result<Option<CategoryRef>> {
        Ok(Some(CategoryRef {
            id: *category_id,
            name: "General".to_string(),
        }))
    }
}

struct NoInvites;

#[async_trait]
impl InviteDirectory for NoInvites {
    async fn exists(&self, _invite_id: &Uuid) -> Result<bool> {
        Ok(false)
    }
}

fn actor(id: Uuid, role: Role) -> Actor {
    Actor {
        id,
        role,
        display_name: format!("user-{}", id),
    }
}

fn harness(
    known_users: Vec<Uuid>,
) -> (
    EventService<InMemoryStore, InMemoryStore>,
    StatusSweeper<InMemoryStore>,
    InMemoryStore,
) {
    let store = InMemoryStore::default();
    let service = EventService::new(
        store.clone(),
        store.clone(),
        Arc::new(StaticUsers { known: known_users }),
        Arc::new(AllCategories),
        Arc::new(NoInvites),
    );
    let sweeper = StatusSweeper::new(Arc::new(store.clone()));
    (service, sweeper, store)
}

#[tokio::test]
async fn test_full_event_lifecycle() {
    let u1 = Uuid::now_v7();
    let u2 = Uuid::now_v7();
    let s1 = Uuid::now_v7();
    let s2 = Uuid::now_v7();

    let (service, sweeper, store) = harness(vec![u1, u2, s1, s2]);
    let creator = actor(u1, Role::Customer);

    // Create event A with a two-hour window and two supporters
    let input = CreateEvent {
        title: "Launch day rehearsal".to_string(),
        description: "Full run-through before the public launch".to_string(),
        location: "Auditorium".to_string(),
        start_date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 1, 10, 2, 0, 0).unwrap(),
        cover_image: None,
        category_ids: vec![Uuid::now_v7().to_string()],
        supporters: vec![s1.to_string(), s2.to_string()],
        invites: vec![],
        limit_seat: false,
        total_seats: 0,
        estimate_price: 0,
        real_price: 0,
    };

    let event = service.create(input, &creator).await.unwrap();
    assert_eq!(event.status, EventStatus::Create);

    let link = store.find_support(&event.id).await.unwrap().unwrap();
    assert_eq!(link.user_ids, vec![s1, s2]);

    // Shrinking the supporter list replaces membership, never appends
    let patch = UpdateEvent {
        supporters: Some(vec![s1.to_string()]),
        ..Default::default()
    };
    service.update(&event.id, patch, &creator).await.unwrap();

    assert_eq!(store.inner.supports.lock().unwrap().len(), 1);
    let link = store.find_support(&event.id).await.unwrap().unwrap();
    assert_eq!(link.user_ids, vec![s1]);

    // One sweep tick after the window ends closes the event
    let after_end = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let outcome = sweeper.run_once(after_end).await;
    assert_eq!(outcome.closed, 1);

    let event = store.find_by_id(&event.id).await.unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Closed);

    // A non-owner, non-admin caller can never mutate the event
    let intruder = actor(u2, Role::Customer);
    let err = service
        .update(&event.id, UpdateEvent::default(), &intruder)
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::Forbidden { .. }));
}

#[tokio::test]
async fn test_sweep_moves_started_events_to_process() {
    let u1 = Uuid::now_v7();
    let (service, sweeper, store) = harness(vec![u1]);
    let creator = actor(u1, Role::Organizer);

    let input = CreateEvent {
        title: "Morning workshop".to_string(),
        description: "Hands-on introduction session".to_string(),
        location: "Room 2".to_string(),
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
    };
    let event = service.create(input, &creator).await.unwrap();

    // Inside the window: CREATE -> PROCESS
    let during = Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap();
    let outcome = sweeper.run_once(during).await;
    assert_eq!(outcome.started, 1);
    assert_eq!(outcome.closed, 0);

    let event = store.find_by_id(&event.id).await.unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Process);
}

#[tokio::test]
async fn test_sweep_never_resurrects_cancelled_events() {
    let u1 = Uuid::now_v7();
    let (service, sweeper, store) = harness(vec![u1]);
    let creator = actor(u1, Role::Customer);

    let input = CreateEvent {
        title: "Cancelled gathering".to_string(),
        description: "This one is called off before it starts".to_string(),
        location: "Courtyard".to_string(),
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
    };
    let event = service.create(input, &creator).await.unwrap();
    service.cancel(&event.id, &creator).await.unwrap();

    // Well past the end date: the cancelled event must not flip to CLOSED
    let after_end = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
    let outcome = sweeper.run_once(after_end).await;
    assert_eq!(outcome.closed, 0);
    assert_eq!(outcome.started, 0);

    let event = store.find_by_id(&event.id).await.unwrap().unwrap();
    assert_eq!(event.status, EventStatus::Cancelled);

    // And cancelling again is not an error
    assert!(service.cancel(&event.id, &creator).await.is_ok());
}

#[tokio::test]
async fn test_aggregator_pages_over_the_store() {
    let u1 = Uuid::now_v7();
    let (service, _sweeper, store) = harness(vec![u1]);
    let creator = actor(u1, Role::Organizer);

    for i in 0..7 {
        let input = CreateEvent {
            title: format!("Recurring meetup number {}", i),
            description: "Monthly community get-together".to_string(),
            location: "Cafe downstairs".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap(),
            cover_image: None,
            category_ids: vec![Uuid::now_v7().to_string()],
            supporters: vec![],
            invites: vec![],
            limit_seat: false,
            total_seats: 0,
            estimate_price: 0,
            real_price: 0,
        };
        service.create(input, &creator).await.unwrap();
    }

    let aggregator = ListAggregator::new(
        store.clone(),
        store.clone(),
        Arc::new(StaticUsers { known: vec![u1] }),
        Arc::new(AllCategories),
    );

    let filter = EventFilter {
        page: Some(2),
        limit: Some(3),
        ..Default::default()
    };
    let page = aggregator.list(&filter, &creator).await.unwrap();

    assert_eq!(page.events.len(), 3);
    assert_eq!(page.pagination.total, 7);
    assert_eq!(page.pagination.total_pages, 3);

    let mine = aggregator.my_events(&creator).await.unwrap();
    assert_eq!(mine.len(), 7);
}
