use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{PgConnection, prelude::*};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            media::{InsertMediaEntity, MediaEntity},
            publications::PublicationEntity,
        },
        repositories::media::MediaRepository,
        value_objects::{
            enums::{content_types::ContentType, publication_statuses::PublicationStatus},
            media::{AttachedMedia, DetachedMedia, GuardedMediaInsert, MediaRemoval},
            media_compatibility::{is_compatible, is_swept_by},
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{media, publications},
    },
};

pub struct MediaPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MediaPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MediaRepository for MediaPostgres {
    async fn insert_guarded(
        &self,
        insert_entity: InsertMediaEntity,
        publish_now: bool,
        now: DateTime<Utc>,
    ) -> Result<GuardedMediaInsert> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<GuardedMediaInsert> {
            let mut conn = db_pool.get()?;

            conn.transaction::<GuardedMediaInsert, anyhow::Error, _>(|conn| {
                let Some(publication) = lock_publication(conn, insert_entity.publication_id)?
                else {
                    return Ok(GuardedMediaInsert::PublicationNotFound);
                };

                // Checked against the locked row: the caller's earlier read may predate a
                // content type switch.
                let content_type = publication.content_type()?;
                if !is_compatible(content_type, &insert_entity.media_type) {
                    return Ok(GuardedMediaInsert::Incompatible {
                        expected: content_type.media_family(),
                    });
                }

                let inserted = diesel::insert_into(media::table)
                    .values(&insert_entity)
                    .returning(MediaEntity::as_select())
                    .get_result::<MediaEntity>(conn)?;

                let published = if publish_now {
                    let media_count = count_media(conn, publication.id)?;
                    match publication.status()?.on_publish_now(media_count) {
                        Some(next) => diesel::update(
                            publications::table
                                .filter(publications::id.eq(publication.id))
                                .filter(
                                    publications::status.eq(PublicationStatus::Draft.to_string()),
                                ),
                        )
                        .set((
                            publications::status.eq(next.to_string()),
                            publications::publish_date.eq(now),
                            publications::updated_at.eq(now),
                        ))
                        .returning(PublicationEntity::as_select())
                        .get_result::<PublicationEntity>(conn)
                        .optional()?,
                        None => None,
                    }
                } else {
                    None
                };

                Ok(GuardedMediaInsert::Attached(AttachedMedia {
                    media: inserted,
                    published: published.is_some(),
                    publication: published.unwrap_or(publication),
                }))
            })
        })
        .await?
    }

    async fn list_by_publication(&self, publication_id: Uuid) -> Result<Vec<MediaEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<MediaEntity>> {
            let mut conn = db_pool.get()?;

            let result = media::table
                .filter(media::publication_id.eq(publication_id))
                .order(media::created_at.asc())
                .select(MediaEntity::as_select())
                .load::<MediaEntity>(&mut conn)?;

            Ok(result)
        })
        .await?
    }

    async fn delete_and_revert(
        &self,
        publication_id: Uuid,
        media_id: Uuid,
    ) -> Result<Option<DetachedMedia>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<DetachedMedia>> {
            let mut conn = db_pool.get()?;

            conn.transaction::<Option<DetachedMedia>, anyhow::Error, _>(|conn| {
                let Some(publication) = lock_publication(conn, publication_id)? else {
                    return Ok(None);
                };

                let removed = diesel::delete(
                    media::table
                        .filter(media::id.eq(media_id))
                        .filter(media::publication_id.eq(publication_id)),
                )
                .returning(MediaEntity::as_select())
                .get_result::<MediaEntity>(conn)
                .optional()?;

                let Some(removed) = removed else {
                    return Ok(None);
                };

                let remaining = count_media(conn, publication_id)?;
                let current: PublicationStatus = publication.status.parse()?;
                let next = current.after_media_removed(remaining);

                let reverted_publication = if next != current {
                    let reverted = diesel::update(publications::table.find(publication_id))
                        .set((
                            publications::status.eq(next.to_string()),
                            publications::updated_at.eq(Utc::now()),
                        ))
                        .returning(PublicationEntity::as_select())
                        .get_result::<PublicationEntity>(conn)?;
                    Some(reverted)
                } else {
                    None
                };

                Ok(Some(DetachedMedia {
                    removed,
                    remaining,
                    reverted_publication,
                }))
            })
        })
        .await?
    }

    async fn delete_swept(
        &self,
        publication_id: Uuid,
        content_type: ContentType,
    ) -> Result<Option<MediaRemoval>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<MediaRemoval>> {
            let mut conn = db_pool.get()?;

            let removal = conn.transaction::<Option<MediaRemoval>, diesel::result::Error, _>(
                |conn| {
                    if lock_publication(conn, publication_id)?.is_none() {
                        return Ok(None);
                    }

                    sweep_locked(conn, publication_id, content_type).map(Some)
                },
            )?;

            Ok(removal)
        })
        .await?
    }
}

pub(crate) fn lock_publication(
    conn: &mut PgConnection,
    publication_id: Uuid,
) -> QueryResult<Option<PublicationEntity>> {
    publications::table
        .find(publication_id)
        .select(PublicationEntity::as_select())
        .for_update()
        .first::<PublicationEntity>(conn)
        .optional()
}

/// Deletes the media of `publication_id` that a publication of `content_type` does not
/// allow. The caller holds the publication row lock.
pub(crate) fn sweep_locked(
    conn: &mut PgConnection,
    publication_id: Uuid,
    content_type: ContentType,
) -> QueryResult<MediaRemoval> {
    let swept_ids: Vec<Uuid> = media::table
        .filter(media::publication_id.eq(publication_id))
        .select((media::id, media::media_type))
        .load::<(Uuid, String)>(conn)?
        .into_iter()
        .filter(|(_, media_type)| is_swept_by(content_type, media_type))
        .map(|(id, _)| id)
        .collect();

    let removed = if swept_ids.is_empty() {
        Vec::new()
    } else {
        diesel::delete(
            media::table
                .filter(media::publication_id.eq(publication_id))
                .filter(media::id.eq_any(swept_ids)),
        )
        .returning(MediaEntity::as_select())
        .get_results::<MediaEntity>(conn)?
    };

    let remaining = count_media(conn, publication_id)?;

    Ok(MediaRemoval { removed, remaining })
}

fn count_media(conn: &mut PgConnection, publication_id: Uuid) -> QueryResult<i64> {
    media::table
        .filter(media::publication_id.eq(publication_id))
        .count()
        .get_result::<i64>(conn)
}
