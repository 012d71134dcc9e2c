use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::publications::{
        InsertPublicationEntity, PublicationEntity, UpdatePublicationEntity,
    },
    value_objects::publications::{
        AppliedUpdate, DeletedPublication, GuardedInsertOutcome, ListPublicationsFilter,
        PublicationStatsRow, PublicationView, ValidatedPublicationUpdate,
    },
};

#[automock]
#[async_trait]
pub trait PublicationRepository {
    /// Locks the client row, checks it is active and under its plan quota for the
    /// entity's content type, then inserts. All in one transaction.
    async fn insert_within_quota(
        &self,
        insert_entity: InsertPublicationEntity,
    ) -> Result<GuardedInsertOutcome>;

    async fn find_by_id(&self, publication_id: Uuid) -> Result<Option<PublicationEntity>>;

    async fn find_view(&self, publication_id: Uuid) -> Result<Option<PublicationView>>;

    /// Admin listing is ordered by `created_at` desc, per-client listing by `publish_date` desc.
    async fn list_views(&self, filter: ListPublicationsFilter) -> Result<Vec<PublicationView>>;

    /// Partial update under the publication row lock. A content type switch sweeps the media
    /// of the other family and settles the status in the same transaction.
    async fn apply_update(
        &self,
        publication_id: Uuid,
        update: ValidatedPublicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<AppliedUpdate>>;

    async fn update(
        &self,
        publication_id: Uuid,
        update_entity: UpdatePublicationEntity,
    ) -> Result<Option<PublicationEntity>>;

    /// Hard delete. Returns the row and the media rows the cascade removed.
    async fn delete(&self, publication_id: Uuid) -> Result<Option<DeletedPublication>>;

    async fn stats_by_client(&self, client_id: Uuid) -> Result<Vec<PublicationStatsRow>>;
}
