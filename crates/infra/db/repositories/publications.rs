use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    PgConnection,
    dsl::{count, count_star},
    prelude::*,
};
use std::{collections::HashMap, sync::Arc};
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            clients::ClientEntity,
            media::MediaEntity,
            publications::{InsertPublicationEntity, PublicationEntity, UpdatePublicationEntity},
        },
        repositories::publications::PublicationRepository,
        value_objects::{
            enums::content_types::ContentType,
            plan_quota,
            publication_lifecycle::status_after_content_change,
            publications::{
                AppliedUpdate, DeletedPublication, GuardedInsertOutcome, ListPublicationsFilter,
                PublicationStatsRow, PublicationView, ValidatedPublicationUpdate,
            },
        },
    },
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{clients, comments, media, publications},
        },
        repositories::media::{lock_publication, sweep_locked},
    },
};

pub struct PublicationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PublicationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PublicationRepository for PublicationPostgres {
    async fn insert_within_quota(
        &self,
        insert_entity: InsertPublicationEntity,
    ) -> Result<GuardedInsertOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<GuardedInsertOutcome> {
            let mut conn = db_pool.get()?;

            conn.transaction::<GuardedInsertOutcome, anyhow::Error, _>(|conn| {
                // Row lock on the client serialises concurrent creations for the same client,
                // so the count below cannot go stale before the insert.
                let client = clients::table
                    .filter(clients::id.eq(insert_entity.client_id))
                    .select(ClientEntity::as_select())
                    .for_update()
                    .first::<ClientEntity>(conn)
                    .optional()?;

                let Some(client) = client else {
                    return Ok(GuardedInsertOutcome::ClientNotFound);
                };

                if !client.is_active() {
                    return Ok(GuardedInsertOutcome::ClientInactive);
                }

                let content_type: ContentType = insert_entity.content_type.parse()?;
                let current_count = publications::table
                    .filter(publications::client_id.eq(client.id))
                    .filter(publications::content_type.eq(&insert_entity.content_type))
                    .count()
                    .get_result::<i64>(conn)?;

                if let Err(rejection) =
                    plan_quota::ensure_can_create(&client.plan, content_type, current_count)
                {
                    return Ok(GuardedInsertOutcome::QuotaExceeded {
                        rejection,
                        current_count,
                    });
                }

                let created = diesel::insert_into(publications::table)
                    .values(&insert_entity)
                    .returning(PublicationEntity::as_select())
                    .get_result::<PublicationEntity>(conn)?;

                Ok(GuardedInsertOutcome::Created(created))
            })
        })
        .await?
    }

    async fn find_by_id(&self, publication_id: Uuid) -> Result<Option<PublicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<PublicationEntity>> {
            let mut conn = db_pool.get()?;

            let result = publications::table
                .find(publication_id)
                .select(PublicationEntity::as_select())
                .first::<PublicationEntity>(&mut conn)
                .optional()?;

            Ok(result)
        })
        .await?
    }

    async fn find_view(&self, publication_id: Uuid) -> Result<Option<PublicationView>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<PublicationView>> {
            let mut conn = db_pool.get()?;

            let publication = publications::table
                .find(publication_id)
                .select(PublicationEntity::as_select())
                .first::<PublicationEntity>(&mut conn)
                .optional()?;

            let Some(publication) = publication else {
                return Ok(None);
            };

            let mut views = load_views(&mut conn, vec![publication])?;
            Ok(views.pop())
        })
        .await?
    }

    async fn list_views(&self, filter: ListPublicationsFilter) -> Result<Vec<PublicationView>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<PublicationView>> {
            let mut conn = db_pool.get()?;

            let mut query = publications::table
                .select(PublicationEntity::as_select())
                .into_boxed();

            if let Some(status) = filter.status {
                query = query.filter(publications::status.eq(status.to_string()));
            }

            query = match filter.client_id {
                Some(client_id) => query
                    .filter(publications::client_id.eq(client_id))
                    .order(publications::publish_date.desc()),
                None => query.order(publications::created_at.desc()),
            };

            let rows = query.load::<PublicationEntity>(&mut conn)?;
            let views = load_views(&mut conn, rows)?;
            Ok(views)
        })
        .await?
    }

    async fn apply_update(
        &self,
        publication_id: Uuid,
        update: ValidatedPublicationUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<AppliedUpdate>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<AppliedUpdate>> {
            let mut conn = db_pool.get()?;

            conn.transaction::<Option<AppliedUpdate>, anyhow::Error, _>(|conn| {
                let Some(current) = lock_publication(conn, publication_id)? else {
                    return Ok(None);
                };

                let mut update = update;
                let mut swept_media = Vec::new();

                if let Some(content_type) = update.content_type {
                    if content_type != current.content_type()? {
                        let removal = sweep_locked(conn, publication_id, content_type)?;
                        update.status = status_after_content_change(
                            current.status()?,
                            update.status,
                            removal.removed.len(),
                            removal.remaining,
                        );
                        swept_media = removal.removed;
                    }
                }

                let publication = diesel::update(publications::table.find(publication_id))
                    .set(&update.to_entity(now))
                    .returning(PublicationEntity::as_select())
                    .get_result::<PublicationEntity>(conn)?;

                Ok(Some(AppliedUpdate {
                    publication,
                    swept_media,
                }))
            })
        })
        .await?
    }

    async fn update(
        &self,
        publication_id: Uuid,
        update_entity: UpdatePublicationEntity,
    ) -> Result<Option<PublicationEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<PublicationEntity>> {
            let mut conn = db_pool.get()?;

            let updated = diesel::update(publications::table.find(publication_id))
                .set(&update_entity)
                .returning(PublicationEntity::as_select())
                .get_result::<PublicationEntity>(&mut conn)
                .optional()?;

            Ok(updated)
        })
        .await?
    }

    async fn delete(&self, publication_id: Uuid) -> Result<Option<DeletedPublication>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<DeletedPublication>> {
            let mut conn = db_pool.get()?;

            let deleted = conn.transaction::<Option<DeletedPublication>, diesel::result::Error, _>(
                |conn| {
                    let publication = publications::table
                        .find(publication_id)
                        .select(PublicationEntity::as_select())
                        .for_update()
                        .first::<PublicationEntity>(conn)
                        .optional()?;

                    let Some(publication) = publication else {
                        return Ok(None);
                    };

                    // Media and comments go with the publication through ON DELETE CASCADE;
                    // the media rows are read first so their objects can be removed afterwards.
                    let media_rows = media::table
                        .filter(media::publication_id.eq(publication_id))
                        .order(media::created_at.asc())
                        .select(MediaEntity::as_select())
                        .load::<MediaEntity>(conn)?;

                    diesel::delete(publications::table.find(publication_id)).execute(conn)?;

                    Ok(Some(DeletedPublication {
                        publication,
                        media: media_rows,
                    }))
                },
            )?;

            Ok(deleted)
        })
        .await?
    }

    async fn stats_by_client(&self, client_id: Uuid) -> Result<Vec<PublicationStatsRow>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<PublicationStatsRow>> {
            let mut conn = db_pool.get()?;

            let rows = publications::table
                .filter(publications::client_id.eq(client_id))
                .group_by((publications::content_type, publications::status))
                .select((publications::content_type, publications::status, count_star()))
                .order((publications::content_type.asc(), publications::status.asc()))
                .load::<(String, String, i64)>(&mut conn)?;

            Ok(rows
                .into_iter()
                .map(|(content_type, status, count)| PublicationStatsRow {
                    content_type,
                    status,
                    count,
                })
                .collect())
        })
        .await?
    }
}

fn load_views(
    conn: &mut PgConnection,
    rows: Vec<PublicationEntity>,
) -> QueryResult<Vec<PublicationView>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let media_rows = media::table
        .filter(media::publication_id.eq_any(ids.clone()))
        .order((media::publication_id.asc(), media::created_at.asc()))
        .select(MediaEntity::as_select())
        .load::<MediaEntity>(conn)?;

    let comment_counts = comments::table
        .filter(comments::publication_id.eq_any(ids))
        .group_by(comments::publication_id)
        .select((comments::publication_id, count(comments::id)))
        .load::<(Uuid, i64)>(conn)?
        .into_iter()
        .collect::<HashMap<Uuid, i64>>();

    let mut media_by_publication: HashMap<Uuid, Vec<MediaEntity>> = HashMap::new();
    for item in media_rows {
        media_by_publication
            .entry(item.publication_id)
            .or_default()
            .push(item);
    }

    Ok(rows
        .into_iter()
        .map(|publication| PublicationView {
            media: media_by_publication
                .remove(&publication.id)
                .unwrap_or_default(),
            comment_count: comment_counts.get(&publication.id).copied().unwrap_or(0),
            publication,
        })
        .collect())
}
