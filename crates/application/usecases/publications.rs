use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::media_attachment::MediaAttachmentUseCase,
    domain::{
        entities::publications::{PublicationEntity, UpdatePublicationEntity},
        errors::{PublishingError, PublishingResult},
        repositories::{clients::ClientRepository, publications::PublicationRepository},
        value_objects::{
            enums::publication_statuses::PublicationStatus,
            publications::{
                CreatePublicationModel, GuardedInsertOutcome, ListPublicationsFilter,
                PublicationStatsRow, PublicationView, RemovedMedia, UpdatePublicationModel,
                UpdatedPublication,
            },
        },
    },
};

pub struct PublicationsUseCase {
    publication_repository: Arc<dyn PublicationRepository + Send + Sync>,
    client_repository: Arc<dyn ClientRepository + Send + Sync>,
    media_attachment: Arc<MediaAttachmentUseCase>,
}

impl PublicationsUseCase {
    pub fn new(
        publication_repository: Arc<dyn PublicationRepository + Send + Sync>,
        client_repository: Arc<dyn ClientRepository + Send + Sync>,
        media_attachment: Arc<MediaAttachmentUseCase>,
    ) -> Self {
        Self {
            publication_repository,
            client_repository,
            media_attachment,
        }
    }

    pub async fn create(
        &self,
        client_id: Uuid,
        model: CreatePublicationModel,
    ) -> PublishingResult<PublicationEntity> {
        let (content_type, insert_entity) = model.to_entity(client_id, Utc::now())?;

        match self
            .publication_repository
            .insert_within_quota(insert_entity)
            .await?
        {
            GuardedInsertOutcome::Created(publication) => {
                info!(
                    publication_id = %publication.id,
                    %client_id,
                    content_type = %publication.content_type,
                    status = %publication.status,
                    "publications: publication created"
                );
                Ok(publication)
            }
            GuardedInsertOutcome::ClientNotFound => Err(PublishingError::ClientNotFound(client_id)),
            GuardedInsertOutcome::ClientInactive => Err(PublishingError::InactiveClient(client_id)),
            GuardedInsertOutcome::QuotaExceeded {
                rejection,
                current_count,
            } => {
                warn!(
                    %client_id,
                    %content_type,
                    current_count,
                    reason = %rejection,
                    "publications: quota reached; creation rejected"
                );
                Err(rejection)
            }
        }
    }

    pub async fn get(&self, publication_id: Uuid) -> PublishingResult<PublicationView> {
        self.publication_repository
            .find_view(publication_id)
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))
    }

    pub async fn list_all(&self) -> PublishingResult<Vec<PublicationView>> {
        Ok(self
            .publication_repository
            .list_views(ListPublicationsFilter::default())
            .await?)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> PublishingResult<Vec<PublicationView>> {
        Ok(self
            .publication_repository
            .list_views(ListPublicationsFilter {
                client_id: Some(client_id),
                status: None,
            })
            .await?)
    }

    pub async fn list_published_for_client(
        &self,
        client_id: Uuid,
    ) -> PublishingResult<Vec<PublicationView>> {
        Ok(self
            .publication_repository
            .list_views(ListPublicationsFilter {
                client_id: Some(client_id),
                status: Some(PublicationStatus::Published),
            })
            .await?)
    }

    pub async fn list_published_for_user(
        &self,
        user_id: Uuid,
    ) -> PublishingResult<Vec<PublicationView>> {
        let client = self
            .client_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or(PublishingError::ClientNotFoundForUser(user_id))?;

        self.list_published_for_client(client.id).await
    }

    pub async fn stats(&self, client_id: Uuid) -> PublishingResult<Vec<PublicationStatsRow>> {
        Ok(self.publication_repository.stats_by_client(client_id).await?)
    }

    pub async fn owner_of(&self, publication_id: Uuid) -> PublishingResult<Uuid> {
        self.publication_repository
            .find_by_id(publication_id)
            .await?
            .map(|publication| publication.client_id)
            .ok_or(PublishingError::PublicationNotFound(publication_id))
    }

    /// Partial update. A content type change sweeps incompatible media in the same
    /// transaction; if that leaves the publication empty and no status was supplied, it
    /// falls back to DRAFT. Storage objects of swept media are removed after the commit.
    pub async fn update(
        &self,
        publication_id: Uuid,
        model: UpdatePublicationModel,
    ) -> PublishingResult<UpdatedPublication> {
        let update = model.validate()?;

        let applied = self
            .publication_repository
            .apply_update(publication_id, update, Utc::now())
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))?;

        let content_type = applied.publication.content_type()?;
        let removed_media: Vec<RemovedMedia> = applied
            .swept_media
            .iter()
            .map(|item| RemovedMedia::incompatible_with(item, content_type))
            .collect();

        info!(
            %publication_id,
            status = %applied.publication.status,
            removed_media = removed_media.len(),
            "publications: publication updated"
        );

        self.media_attachment
            .remove_objects(&applied.swept_media)
            .await;

        let publication = self.get(publication_id).await?;

        Ok(UpdatedPublication {
            publication,
            removed_media,
        })
    }

    pub async fn update_status(
        &self,
        publication_id: Uuid,
        status: &str,
    ) -> PublishingResult<PublicationEntity> {
        let status: PublicationStatus = status.parse()?;

        let updated = self
            .publication_repository
            .update(
                publication_id,
                UpdatePublicationEntity {
                    status: Some(status.to_string()),
                    updated_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))?;

        info!(%publication_id, %status, "publications: status updated");

        Ok(updated)
    }

    /// Hard delete. Media rows and comments cascade; their storage objects are removed
    /// once the row is gone.
    pub async fn delete(&self, publication_id: Uuid) -> PublishingResult<PublicationEntity> {
        let deleted = self
            .publication_repository
            .delete(publication_id)
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))?;

        info!(
            %publication_id,
            media = deleted.media.len(),
            "publications: publication deleted"
        );

        self.media_attachment.remove_objects(&deleted.media).await;

        Ok(deleted.publication)
    }
}
