//! MongoDB implementations of the event and link repositories

use crate::error::Result;
use crate::models::{
    Event, EventFilter, EventStatus, InviteLink, LinkStatus, SortOrder, SupportLink,
};
use crate::repository::{EventRepository, LinkRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, to_bson};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReplaceOptions, ReturnDocument};
use mongodb::{Collection, Database};
use tracing::instrument;
use uuid::Uuid;

/// MongoDB-based event repository
#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<Event>,
}

impl MongoEventRepository {
    /// Create a new MongoDB event repository
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection("events"),
        }
    }

    /// Convert chrono DateTime to BSON DateTime
    fn to_bson_datetime(dt: DateTime<Utc>) -> Bson {
        Bson::DateTime(mongodb::bson::DateTime::from_millis(dt.timestamp_millis()))
    }

    /// Create indexes for efficient querying
    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;

        let indexes = vec![
            // Sweep scans
            IndexModel::builder()
                .keys(doc! { "status": 1, "end_date": 1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "start_date": 1 })
                .build(),
            // Ownership listing (my-events), newest first
            IndexModel::builder()
                .keys(doc! { "created_by": 1, "created_at": -1 })
                .build(),
            // Category membership filter
            IndexModel::builder().keys(doc! { "category_ids": 1 }).build(),
            // Title search
            IndexModel::builder().keys(doc! { "title": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    /// Build filter document from EventFilter
    fn build_filter(filter: &EventFilter) -> Result<Document> {
        let mut query = Document::new();

        if let Some(q) = &filter.q {
            if !q.is_empty() {
                let regex = format!("(?i){}", regex::escape(q));
                query.insert("title", doc! { "$regex": regex });
            }
        }

        // Window overlap: the event's window intersects [start_date, end_date]
        if let Some(from) = filter.start_date {
            query.insert("end_date", doc! { "$gte": Self::to_bson_datetime(from) });
        }
        if let Some(to) = filter.end_date {
            query.insert("start_date", doc! { "$lte": Self::to_bson_datetime(to) });
        }

        if let Some(category_id) = &filter.category_id {
            query.insert("category_ids", to_bson(category_id)?);
        }

        if !filter.category_ids.is_empty() {
            let ids = filter
                .category_ids
                .iter()
                .map(to_bson)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            query.insert("category_ids", doc! { "$in": ids });
        }

        Ok(query)
    }

    fn sort_doc(filter: &EventFilter) -> Document {
        let direction: i32 = match filter.sort_order() {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        let mut sort = Document::new();
        sort.insert(filter.sort_field(), direction);
        sort
    }

    /// Selection for the close sweep. CANCELLED must be excluded explicitly:
    /// cancellation is terminal and a cancelled-but-ended event would
    /// otherwise flip to CLOSED.
    fn close_filter(now: DateTime<Utc>) -> Document {
        doc! {
            "status": { "$nin": [
                EventStatus::Closed.to_string(),
                EventStatus::Cancelled.to_string(),
            ] },
            "end_date": { "$lt": Self::to_bson_datetime(now) },
        }
    }

    /// Selection for the start sweep: CREATE events whose window has opened.
    fn due_filter(now: DateTime<Utc>) -> Document {
        doc! {
            "status": EventStatus::Create.to_string(),
            "start_date": { "$lte": Self::to_bson_datetime(now) },
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert(&self, event: Event) -> Result<Event> {
        self.collection.insert_one(&event).await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Event>> {
        let event = self
            .collection
            .find_one(doc! { "_id": to_bson(id)? })
            .await?;
        Ok(event)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn replace(&self, event: &Event) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": to_bson(&event.id)? }, event)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        id: &Uuid,
        status: EventStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Event>> {
        let mut set = doc! {
            "status": status.to_string(),
            "updated_at": Self::to_bson_datetime(Utc::now()),
        };
        if let Some(updated_by) = updated_by {
            set.insert("updated_by", to_bson(&updated_by)?);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let event = self
            .collection
            .find_one_and_update(doc! { "_id": to_bson(id)? }, doc! { "$set": set })
            .with_options(options)
            .await?;
        Ok(event)
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let query = Self::build_filter(filter)?;
        let options = FindOptions::builder()
            .sort(Self::sort_doc(filter))
            .skip(filter.skip())
            .limit(filter.limit())
            .build();

        let cursor = self.collection.find(query).with_options(options).await?;
        let events: Vec<Event> = cursor.try_collect().await?;
        Ok(events)
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &EventFilter) -> Result<u64> {
        let query = Self::build_filter(filter)?;
        let count = self.collection.count_documents(query).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn find_by_creator(&self, creator: &Uuid) -> Result<Vec<Event>> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "created_by": to_bson(creator)? })
            .with_options(options)
            .await?;
        let events: Vec<Event> = cursor.try_collect().await?;
        Ok(events)
    }

    #[instrument(skip(self))]
    async fn close_ended(&self, now: DateTime<Utc>) -> Result<u64> {
        let update = doc! { "$set": {
            "status": EventStatus::Closed.to_string(),
            "updated_at": Self::to_bson_datetime(now),
        } };

        let result = self
            .collection
            .update_many(Self::close_filter(now), update)
            .await?;
        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn start_due(&self, now: DateTime<Utc>) -> Result<u64> {
        let update = doc! { "$set": {
            "status": EventStatus::Process.to_string(),
            "updated_at": Self::to_bson_datetime(now),
        } };

        let result = self
            .collection
            .update_many(Self::due_filter(now), update)
            .await?;
        Ok(result.modified_count)
    }
}

/// MongoDB-based link repository over the two per-event link collections
#[derive(Clone)]
pub struct MongoLinkRepository {
    supports: Collection<SupportLink>,
    invites: Collection<InviteLink>,
}

impl MongoLinkRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            supports: database.collection("event_supports"),
            invites: database.collection("event_invites"),
        }
    }

    /// Unique index on event_id keeps the zero-or-one-row-per-event shape
    /// even under concurrent upserts.
    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;
        use mongodb::options::IndexOptions;

        let unique_event = IndexModel::builder()
            .keys(doc! { "event_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.supports.create_index(unique_event.clone()).await?;
        self.invites.create_index(unique_event).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for MongoLinkRepository {
    #[instrument(skip(self))]
    async fn find_support(&self, event_id: &Uuid) -> Result<Option<SupportLink>> {
        let link = self
            .supports
            .find_one(doc! { "event_id": to_bson(event_id)? })
            .await?;
        Ok(link)
    }

    #[instrument(skip(self, link), fields(event_id = %link.event_id))]
    async fn save_support(&self, link: SupportLink) -> Result<SupportLink> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.supports
            .replace_one(doc! { "event_id": to_bson(&link.event_id)? }, &link)
            .with_options(options)
            .await?;
        Ok(link)
    }

    #[instrument(skip(self))]
    async fn find_invite(&self, event_id: &Uuid) -> Result<Option<InviteLink>> {
        let link = self
            .invites
            .find_one(doc! { "event_id": to_bson(event_id)? })
            .await?;
        Ok(link)
    }

    #[instrument(skip(self, link), fields(event_id = %link.event_id))]
    async fn save_invite(&self, link: InviteLink) -> Result<InviteLink> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.invites
            .replace_one(doc! { "event_id": to_bson(&link.event_id)? }, &link)
            .with_options(options)
            .await?;
        Ok(link)
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, event_id: &Uuid) -> Result<()> {
        let filter = doc! { "event_id": to_bson(event_id)? };
        let update = doc! { "$set": {
            "status": LinkStatus::Inactive.to_string(),
            "updated_at": MongoEventRepository::to_bson_datetime(Utc::now()),
        } };

        self.supports
            .update_one(filter.clone(), update.clone())
            .await?;
        self.invites.update_one(filter, update).await?;
        Ok(())
    }
}
