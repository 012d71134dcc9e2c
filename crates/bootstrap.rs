use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::{
    application::usecases::{
        media_attachment::MediaAttachmentUseCase,
        publication_scheduler::PublicationSchedulerUseCase, publications::PublicationsUseCase,
    },
    domain::repositories::{
        clients::ClientRepository, media::MediaRepository,
        publication_scheduler::PublicationSchedulerRepository,
        publications::PublicationRepository, storage::MediaStorage,
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                clients::ClientPostgres, media::MediaPostgres,
                publication_scheduler::PublicationSchedulerPostgres,
                publications::PublicationPostgres,
            },
        },
        storages::{
            MediaStorageConfig, local_disk::LocalDiskStorage, s3_media::S3MediaStorage,
        },
    },
};

/// Usecases sharing one pool and one storage backend.
pub struct PublishingServices {
    pub publications: Arc<PublicationsUseCase>,
    pub media: Arc<MediaAttachmentUseCase>,
    pub scheduler: Arc<PublicationSchedulerUseCase>,
}

pub fn build_publishing_services(
    db_pool: Arc<PgPoolSquad>,
    storage: Arc<dyn MediaStorage + Send + Sync>,
) -> PublishingServices {
    let publication_repository: Arc<dyn PublicationRepository + Send + Sync> =
        Arc::new(PublicationPostgres::new(Arc::clone(&db_pool)));
    let media_repository: Arc<dyn MediaRepository + Send + Sync> =
        Arc::new(MediaPostgres::new(Arc::clone(&db_pool)));
    let client_repository: Arc<dyn ClientRepository + Send + Sync> =
        Arc::new(ClientPostgres::new(Arc::clone(&db_pool)));
    let scheduler_repository: Arc<dyn PublicationSchedulerRepository + Send + Sync> =
        Arc::new(PublicationSchedulerPostgres::new(Arc::clone(&db_pool)));

    let media = Arc::new(MediaAttachmentUseCase::new(
        Arc::clone(&publication_repository),
        media_repository,
        storage,
    ));

    let publications = Arc::new(PublicationsUseCase::new(
        publication_repository,
        client_repository,
        Arc::clone(&media),
    ));

    let scheduler = Arc::new(PublicationSchedulerUseCase::new(scheduler_repository));

    PublishingServices {
        publications,
        media,
        scheduler,
    }
}

pub async fn build_media_storage(
    config: &MediaStorageConfig,
) -> Result<Arc<dyn MediaStorage + Send + Sync>> {
    match config {
        MediaStorageConfig::Local(local) => {
            let storage = LocalDiskStorage::new(local.clone())
                .await
                .context("failed to prepare local media storage")?;
            info!(root_dir = ?local.root_dir, "media storage: local disk");
            Ok(Arc::new(storage))
        }
        MediaStorageConfig::S3(s3) => {
            let storage = S3MediaStorage::new(s3.clone())
                .await
                .context("failed to prepare s3 media storage")?;
            info!(bucket = %s3.bucket, endpoint = %s3.endpoint, "media storage: s3");
            Ok(Arc::new(storage))
        }
    }
}
