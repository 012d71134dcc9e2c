use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::media::{InsertMediaEntity, MediaEntity},
    value_objects::{
        enums::content_types::ContentType,
        media::{DetachedMedia, GuardedMediaInsert, MediaRemoval},
    },
};

#[automock]
#[async_trait]
pub trait MediaRepository {
    /// Locks the publication row, checks the MIME type against its current content type and
    /// inserts. With `publish_now`, a DRAFT publication is published in the same transaction.
    async fn insert_guarded(
        &self,
        insert_entity: InsertMediaEntity,
        publish_now: bool,
        now: DateTime<Utc>,
    ) -> Result<GuardedMediaInsert>;

    async fn list_by_publication(&self, publication_id: Uuid) -> Result<Vec<MediaEntity>>;

    /// Deletes one media row, counts what is left and reverts a SCHEDULED or PUBLISHED
    /// publication to DRAFT when nothing is, under one publication row lock.
    async fn delete_and_revert(
        &self,
        publication_id: Uuid,
        media_id: Uuid,
    ) -> Result<Option<DetachedMedia>>;

    /// Deletes the media a publication of `content_type` does not allow, without touching its
    /// status. `None` when the publication does not exist.
    async fn delete_swept(
        &self,
        publication_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<MediaRemoval>>;
}
