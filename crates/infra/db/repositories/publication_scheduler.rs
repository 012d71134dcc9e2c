use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::publication_scheduler::PublicationSchedulerRepository,
        value_objects::enums::publication_statuses::PublicationStatus,
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{media, publications},
    },
};

pub struct PublicationSchedulerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PublicationSchedulerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PublicationSchedulerRepository for PublicationSchedulerPostgres {
    async fn list_due_scheduled_ids(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let result = publications::table
                .filter(publications::status.eq(PublicationStatus::Scheduled.to_string()))
                .filter(publications::publish_date.le(now))
                .filter(publications::id.eq_any(media::table.select(media::publication_id)))
                .order(publications::publish_date.asc())
                .select(publications::id)
                .load::<Uuid>(&mut conn)?;

            Ok(result)
        })
        .await?
    }

    async fn promote_scheduled(
        &self,
        publication_ids: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if publication_ids.is_empty() {
            return Ok(0);
        }

        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db_pool.get()?;

            // The status guard keeps rows that changed since the scan (reverted to DRAFT,
            // already promoted) out of the update.
            let promoted = diesel::update(
                publications::table
                    .filter(publications::id.eq_any(publication_ids))
                    .filter(publications::status.eq(PublicationStatus::Scheduled.to_string())),
            )
            .set((
                publications::status.eq(PublicationStatus::Published.to_string()),
                publications::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

            Ok(promoted)
        })
        .await?
    }
}
