//! Read-side composer for event listings.
//!
//! The document store holds only reference ids; this module joins each
//! matching event with its link rows, resolved categories, and creator name
//! through the injected collaborators, then wraps the result in a
//! pagination envelope.

use crate::collaborators::{CategoryResolver, IdentityResolver};
use crate::error::{EventError, Result};
use crate::models::{
    Actor, CategoryRef, Event, EventFilter, EventPage, EventRow, EventSummaryPage, MemberRef,
    Pagination,
};
use crate::repository::{EventRepository, LinkRepository};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

pub struct ListAggregator<R: EventRepository, L: LinkRepository> {
    events: R,
    links: L,
    identity: Arc<dyn IdentityResolver>,
    categories: Arc<dyn CategoryResolver>,
}

impl<R: EventRepository, L: LinkRepository> ListAggregator<R, L> {
    pub fn new(
        events: R,
        links: L,
        identity: Arc<dyn IdentityResolver>,
        categories: Arc<dyn CategoryResolver>,
    ) -> Self {
        Self {
            events,
            links,
            identity,
            categories,
        }
    }

    /// Paginated, filtered, enriched listing.
    #[instrument(skip(self, filter), fields(actor = %actor.id))]
    pub async fn list(&self, filter: &EventFilter, actor: &Actor) -> Result<EventPage> {
        let (events, total) =
            tokio::try_join!(self.events.list(filter), self.events.count(filter))?;

        let mut rows = Vec::with_capacity(events.len());
        for event in events {
            rows.push(self.enrich(event).await?);
        }

        Ok(EventPage {
            events: rows,
            pagination: Pagination::new(total, filter.page(), filter.limit()),
        })
    }

    /// Unenriched page of events belonging to any of the given categories.
    ///
    /// Ids arrive raw (comma-separated query param upstream); any malformed
    /// id rejects the whole request, naming the offender.
    #[instrument(skip(self, raw_ids, filter), fields(actor = %actor.id))]
    pub async fn list_by_categories(
        &self,
        raw_ids: &[String],
        filter: &EventFilter,
        actor: &Actor,
    ) -> Result<EventSummaryPage> {
        let category_ids = raw_ids
            .iter()
            .map(|value| {
                Uuid::parse_str(value.trim())
                    .map_err(|_| EventError::invalid_argument(format!("Invalid id: {}", value)))
            })
            .collect::<Result<Vec<_>>>()?;

        if category_ids.is_empty() {
            return Err(EventError::invalid_argument(
                "category_ids must not be empty",
            ));
        }

        let filter = EventFilter {
            category_ids,
            ..filter.clone()
        };

        let (events, total) =
            tokio::try_join!(self.events.list(&filter), self.events.count(&filter))?;

        Ok(EventSummaryPage {
            events,
            pagination: Pagination::new(total, filter.page(), filter.limit()),
        })
    }

    /// The actor's own events, newest first, without joins.
    #[instrument(skip(self), fields(actor = %actor.id))]
    pub async fn my_events(&self, actor: &Actor) -> Result<Vec<Event>> {
        self.events.find_by_creator(&actor.id).await
    }

    async fn enrich(&self, event: Event) -> Result<EventRow> {
        let supporters = match self.links.find_support(&event.id).await? {
            Some(link) => {
                let mut members = Vec::with_capacity(link.user_ids.len());
                for user_id in &link.user_ids {
                    if let Some(user) = self.identity.resolve(user_id).await? {
                        members.push(MemberRef {
                            id: user.id,
                            name: user.display_name,
                        });
                    }
                }
                members
            }
            None => Vec::new(),
        };

        let invitees = self
            .links
            .find_invite(&event.id)
            .await?
            .map(|link| link.invite_ids)
            .unwrap_or_default();

        let mut categories: Vec<CategoryRef> = Vec::with_capacity(event.category_ids.len());
        for category_id in &event.category_ids {
            if let Some(category) = self.categories.resolve(category_id).await? {
                categories.push(category);
            }
        }

        let created_by_name = self
            .identity
            .resolve(&event.created_by)
            .await?
            .map(|user| user.display_name);

        Ok(EventRow {
            event,
            supporters,
            invitees,
            categories,
            created_by_name,
        })
    }
}
