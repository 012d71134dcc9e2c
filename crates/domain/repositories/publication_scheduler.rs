use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

#[automock]
#[async_trait]
pub trait PublicationSchedulerRepository {
    /// SCHEDULED publications due at `now` that own at least one media item.
    async fn list_due_scheduled_ids(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>>;

    /// Single UPDATE guarded by `status = 'SCHEDULED'`; returns the number of rows promoted.
    async fn promote_scheduled(&self, publication_ids: Vec<Uuid>, now: DateTime<Utc>)
    -> Result<usize>;
}
