//! External collaborator interfaces.
//!
//! Identity, categories, invites and notifications are owned by other
//! subsystems. This module defines the narrow interfaces consumed here and
//! thin MongoDB adapters over the collections those subsystems maintain.

use crate::error::Result;
use crate::models::{Actor, CategoryRef};
use async_trait::async_trait;
use mongodb::bson::{doc, to_bson};
use mongodb::{Collection, Database};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Resolves a user id to an authenticated identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, user_id: &Uuid) -> Result<Option<Actor>>;

    async fn exists(&self, user_id: &Uuid) -> Result<bool> {
        Ok(self.resolve(user_id).await?.is_some())
    }
}

/// Resolves a category id to its id + name projection.
#[async_trait]
pub trait CategoryResolver: Send + Sync {
    async fn resolve(&self, category_id: &Uuid) -> Result<Option<CategoryRef>>;

    async fn exists(&self, category_id: &Uuid) -> Result<bool> {
        Ok(self.resolve(category_id).await?.is_some())
    }
}

/// Looks up invited-party records.
#[async_trait]
pub trait InviteDirectory: Send + Sync {
    async fn exists(&self, invite_id: &Uuid) -> Result<bool>;
}

/// Fire-and-forget user notifications.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify(&self, user_id: &Uuid, message: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct UserDoc {
    #[serde(rename = "_id", alias = "id")]
    id: Uuid,
    name: String,
    role: crate::models::Role,
}

/// Identity adapter over the `users` collection.
#[derive(Clone)]
pub struct MongoIdentityResolver {
    collection: Collection<UserDoc>,
}

impl MongoIdentityResolver {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection("users"),
        }
    }
}

#[async_trait]
impl IdentityResolver for MongoIdentityResolver {
    async fn resolve(&self, user_id: &Uuid) -> Result<Option<Actor>> {
        let user = self
            .collection
            .find_one(doc! { "_id": to_bson(user_id)? })
            .await?;

        Ok(user.map(|u| Actor {
            id: u.id,
            role: u.role,
            display_name: u.name,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct CategoryDoc {
    #[serde(rename = "_id", alias = "id")]
    id: Uuid,
    name: String,
}

/// Category adapter over the `event_categories` collection.
#[derive(Clone)]
pub struct MongoCategoryResolver {
    collection: Collection<CategoryDoc>,
}

impl MongoCategoryResolver {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection("event_categories"),
        }
    }
}

#[async_trait]
impl CategoryResolver for MongoCategoryResolver {
    async fn resolve(&self, category_id: &Uuid) -> Result<Option<CategoryRef>> {
        let category = self
            .collection
            .find_one(doc! { "_id": to_bson(category_id)? })
            .await?;

        Ok(category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
        }))
    }
}

/// Invite adapter over the `invites` collection.
#[derive(Clone)]
pub struct MongoInviteDirectory {
    collection: Collection<mongodb::bson::Document>,
}

impl MongoInviteDirectory {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection("invites"),
        }
    }
}

#[async_trait]
impl InviteDirectory for MongoInviteDirectory {
    async fn exists(&self, invite_id: &Uuid) -> Result<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": to_bson(invite_id)? })
            .await?;
        Ok(count > 0)
    }
}

/// Notification stub: logs instead of dispatching.
///
/// TODO: wire to the mail/notification subsystem once it exposes a queue.
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    async fn notify(&self, user_id: &Uuid, message: &str) -> Result<()> {
        info!(user_id = %user_id, message, "Notification (stub, not dispatched)");
        Ok(())
    }
}
