use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{
        media::{InsertMediaEntity, MediaEntity},
        publications::PublicationEntity,
    },
    errors::{PublishingError, PublishingResult},
    repositories::{
        media::MediaRepository, publications::PublicationRepository, storage::MediaStorage,
    },
    value_objects::{
        enums::content_types::ContentType,
        media::{
            AttachedMedia, DetachedMedia, GuardedMediaInsert, MediaStats, MediaUpload,
            ObjectDeletion, SweptMedia,
        },
        media_compatibility::ensure_compatible,
        publications::RemovedMedia,
    },
};

/// Creates and removes media records, keeping the publication status consistent with
/// what is attached. Storage objects are always cleaned up best effort, after the
/// database change.
pub struct MediaAttachmentUseCase {
    publication_repository: Arc<dyn PublicationRepository + Send + Sync>,
    media_repository: Arc<dyn MediaRepository + Send + Sync>,
    storage: Arc<dyn MediaStorage + Send + Sync>,
}

impl MediaAttachmentUseCase {
    pub fn new(
        publication_repository: Arc<dyn PublicationRepository + Send + Sync>,
        media_repository: Arc<dyn MediaRepository + Send + Sync>,
        storage: Arc<dyn MediaStorage + Send + Sync>,
    ) -> Self {
        Self {
            publication_repository,
            media_repository,
            storage,
        }
    }

    /// Compatibility and `publish_now` are decided against the locked publication row, in
    /// the same transaction as the insert. A failed publish leaves no media behind.
    pub async fn attach(
        &self,
        publication_id: Uuid,
        mime_type: &str,
        locator: &str,
        publish_now: bool,
    ) -> PublishingResult<AttachedMedia> {
        let now = Utc::now();
        let outcome = self
            .media_repository
            .insert_guarded(
                InsertMediaEntity {
                    publication_id,
                    media_type: mime_type.trim().to_ascii_lowercase(),
                    url: locator.to_string(),
                    created_at: now,
                },
                publish_now,
                now,
            )
            .await?;

        let attached = match outcome {
            GuardedMediaInsert::Attached(attached) => attached,
            GuardedMediaInsert::PublicationNotFound => {
                return Err(PublishingError::PublicationNotFound(publication_id));
            }
            GuardedMediaInsert::Incompatible { expected } => {
                return Err(PublishingError::IncompatibleMediaType {
                    expected,
                    got: mime_type.to_string(),
                });
            }
        };

        info!(
            %publication_id,
            media_id = %attached.media.id,
            media_type = %attached.media.media_type,
            published = attached.published,
            "media_attachment: media attached"
        );

        Ok(attached)
    }

    /// Validates before anything is written, then stores the object and attaches it.
    pub async fn upload(
        &self,
        publication_id: Uuid,
        upload: MediaUpload,
        publish_now: bool,
    ) -> PublishingResult<AttachedMedia> {
        let publication = self.require_publication(publication_id).await?;
        ensure_compatible(publication.content_type()?, &upload.mime_type)?;

        let locator = self
            .storage
            .write_object(upload.bytes, &upload.file_name, &upload.mime_type)
            .await?;

        match self
            .attach(publication_id, &upload.mime_type, &locator, publish_now)
            .await
        {
            Ok(attached) => Ok(attached),
            Err(err) => {
                warn!(
                    %publication_id,
                    %locator,
                    error = %err,
                    "media_attachment: attach failed after upload; removing stored object"
                );
                self.delete_object_best_effort(publication_id, &locator)
                    .await;
                Err(err)
            }
        }
    }

    pub async fn detach(
        &self,
        publication_id: Uuid,
        media_id: Uuid,
    ) -> PublishingResult<DetachedMedia> {
        let detached = self
            .media_repository
            .delete_and_revert(publication_id, media_id)
            .await?
            .ok_or(PublishingError::MediaNotFound {
                publication_id,
                media_id,
            })?;

        if let Some(reverted) = &detached.reverted_publication {
            info!(
                %publication_id,
                %media_id,
                status = %reverted.status,
                "media_attachment: last media removed; publication reverted"
            );
        }

        self.delete_object_best_effort(publication_id, &detached.removed.url)
            .await;

        Ok(detached)
    }

    /// Removes every media item whose family does not match `content_type`, leaving the
    /// status alone. Content type switches go through the publication update instead, which
    /// sweeps and settles the status in one transaction.
    pub async fn sweep_incompatible(
        &self,
        publication_id: Uuid,
        content_type: ContentType,
    ) -> PublishingResult<SweptMedia> {
        let removal = self
            .media_repository
            .delete_swept(publication_id, content_type)
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))?;

        if !removal.removed.is_empty() {
            info!(
                %publication_id,
                %content_type,
                removed = removal.removed.len(),
                remaining = removal.remaining,
                "media_attachment: incompatible media swept"
            );

            self.remove_objects(&removal.removed).await;
        }

        Ok(SweptMedia {
            removed: removal
                .removed
                .iter()
                .map(|item| RemovedMedia::incompatible_with(item, content_type))
                .collect(),
            remaining: removal.remaining,
        })
    }

    pub async fn list_media(&self, publication_id: Uuid) -> PublishingResult<Vec<MediaEntity>> {
        self.require_publication(publication_id).await?;

        Ok(self
            .media_repository
            .list_by_publication(publication_id)
            .await?)
    }

    pub async fn media_stats(&self, publication_id: Uuid) -> PublishingResult<MediaStats> {
        let media = self.list_media(publication_id).await?;
        Ok(MediaStats::from_media(&media))
    }

    pub(crate) async fn remove_objects(&self, media: &[MediaEntity]) {
        for item in media {
            self.delete_object_best_effort(item.publication_id, &item.url)
                .await;
        }
    }

    pub(crate) async fn delete_object_best_effort(&self, publication_id: Uuid, locator: &str) {
        match self.storage.delete_object(locator).await {
            Ok(ObjectDeletion::Deleted) => {
                info!(%publication_id, %locator, "media_attachment: storage object deleted");
            }
            Ok(ObjectDeletion::NotFound) => {
                warn!(
                    %publication_id,
                    %locator,
                    "media_attachment: storage object already missing"
                );
            }
            Err(err) => {
                error!(
                    %publication_id,
                    %locator,
                    error = ?err,
                    "media_attachment: failed to delete storage object; continuing"
                );
            }
        }
    }

    async fn require_publication(&self, publication_id: Uuid) -> PublishingResult<PublicationEntity> {
        self.publication_repository
            .find_by_id(publication_id)
            .await?
            .ok_or(PublishingError::PublicationNotFound(publication_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        repositories::{
            media::MockMediaRepository, publications::MockPublicationRepository,
            storage::MockMediaStorage,
        },
        value_objects::{
            enums::publication_statuses::PublicationStatus, media::MediaRemoval,
            media_compatibility::MediaFamily,
        },
    };
    use bytes::Bytes;
    use mockall::predicate::eq;

    fn publication(content_type: ContentType, status: PublicationStatus) -> PublicationEntity {
        let now = Utc::now();
        PublicationEntity {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "Launch teaser".to_string(),
            content_type: content_type.to_string(),
            status: status.to_string(),
            publish_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn media(publication_id: Uuid, mime: &str) -> MediaEntity {
        MediaEntity {
            id: Uuid::new_v4(),
            publication_id,
            media_type: mime.to_string(),
            url: format!("{}.bin", Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    fn expect_find(repo: &mut MockPublicationRepository, publication: &PublicationEntity) {
        let found = publication.clone();
        repo.expect_find_by_id()
            .with(eq(publication.id))
            .returning(move |_| Ok(Some(found.clone())));
    }

    fn usecase(
        publication_repository: MockPublicationRepository,
        media_repository: MockMediaRepository,
        storage: MockMediaStorage,
    ) -> MediaAttachmentUseCase {
        MediaAttachmentUseCase::new(
            Arc::new(publication_repository),
            Arc::new(media_repository),
            Arc::new(storage),
        )
    }

    fn attached_outcome(
        media: MediaEntity,
        publication: PublicationEntity,
        published: bool,
    ) -> GuardedMediaInsert {
        GuardedMediaInsert::Attached(AttachedMedia {
            media,
            published,
            publication,
        })
    }

    #[tokio::test]
    async fn attach_rejects_media_the_locked_publication_does_not_allow() {
        let publication_id = Uuid::new_v4();
        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_insert_guarded()
            .withf(move |entity, publish_now, _| {
                entity.publication_id == publication_id && !*publish_now
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(GuardedMediaInsert::Incompatible {
                    expected: MediaFamily::Video,
                })
            });

        let usecase = usecase(
            MockPublicationRepository::new(),
            media_repository,
            MockMediaStorage::new(),
        );

        let err = usecase
            .attach(publication_id, "image/png", "a.png", false)
            .await
            .unwrap_err();

        match err {
            PublishingError::IncompatibleMediaType { expected, got } => {
                assert_eq!(expected, MediaFamily::Video);
                assert_eq!(got, "image/png");
            }
            other => panic!("expected incompatible media error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn attach_to_missing_publication_is_not_found() {
        let missing = Uuid::new_v4();
        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_insert_guarded()
            .returning(|_, _, _| Ok(GuardedMediaInsert::PublicationNotFound));

        let usecase = usecase(
            MockPublicationRepository::new(),
            media_repository,
            MockMediaStorage::new(),
        );

        let err = usecase
            .attach(missing, "video/mp4", "a.mp4", false)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishingError::PublicationNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn publish_now_is_decided_inside_the_guarded_insert() {
        let draft = publication(ContentType::Post, PublicationStatus::Draft);
        let draft_id = draft.id;

        let mut published = draft.clone();
        published.status = PublicationStatus::Published.to_string();
        let inserted = media(draft_id, "image/png");

        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_insert_guarded()
            .withf(move |entity, publish_now, _| {
                entity.publication_id == draft_id && entity.media_type == "image/png" && *publish_now
            })
            .times(1)
            .returning(move |_, _, _| Ok(attached_outcome(inserted.clone(), published.clone(), true)));

        // No separate status write: the publication repository is never asked to update.
        let mut publication_repository = MockPublicationRepository::new();
        publication_repository.expect_update().times(0);

        let usecase = usecase(publication_repository, media_repository, MockMediaStorage::new());

        let attached = usecase
            .attach(draft_id, "IMAGE/PNG", "a.png", true)
            .await
            .unwrap();

        assert!(attached.published);
        assert_eq!(attached.publication.status, "PUBLISHED");
    }

    #[tokio::test]
    async fn failed_guarded_insert_surfaces_as_internal() {
        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_insert_guarded()
            .returning(|_, _, _| Err(anyhow::anyhow!("connection reset")));

        let usecase = usecase(
            MockPublicationRepository::new(),
            media_repository,
            MockMediaStorage::new(),
        );

        let err = usecase
            .attach(Uuid::new_v4(), "image/jpeg", "a.jpg", true)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishingError::Internal(_)));
    }

    #[tokio::test]
    async fn detaching_last_media_reports_reversion_and_absorbs_storage_errors() {
        let published = publication(ContentType::Post, PublicationStatus::Published);
        let publication_id = published.id;
        let removed = media(publication_id, "image/png");
        let media_id = removed.id;
        let locator = removed.url.clone();

        let mut reverted = published.clone();
        reverted.status = PublicationStatus::Draft.to_string();

        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_delete_and_revert()
            .with(eq(publication_id), eq(media_id))
            .returning(move |_, _| {
                Ok(Some(DetachedMedia {
                    removed: removed.clone(),
                    remaining: 0,
                    reverted_publication: Some(reverted.clone()),
                }))
            });

        let mut storage = MockMediaStorage::new();
        storage
            .expect_delete_object()
            .withf(move |candidate| candidate == locator)
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("bucket unreachable")));

        let usecase = usecase(MockPublicationRepository::new(), media_repository, storage);

        let detached = usecase.detach(publication_id, media_id).await.unwrap();

        assert_eq!(detached.remaining, 0);
        assert_eq!(
            detached.reverted_publication.map(|p| p.status),
            Some("DRAFT".to_string())
        );
    }

    #[tokio::test]
    async fn detaching_unknown_media_is_not_found_and_leaves_storage_alone() {
        let publication_id = Uuid::new_v4();
        let media_id = Uuid::new_v4();

        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_delete_and_revert()
            .returning(|_, _| Ok(None));

        let usecase = usecase(
            MockPublicationRepository::new(),
            media_repository,
            MockMediaStorage::new(),
        );

        let err = usecase.detach(publication_id, media_id).await.unwrap_err();
        assert!(matches!(
            err,
            PublishingError::MediaNotFound { media_id: id, .. } if id == media_id
        ));
    }

    #[tokio::test]
    async fn upload_validates_before_writing_the_object() {
        let post = publication(ContentType::Post, PublicationStatus::Draft);
        let mut publication_repository = MockPublicationRepository::new();
        expect_find(&mut publication_repository, &post);

        let mut storage = MockMediaStorage::new();
        storage.expect_write_object().times(0);

        let usecase = usecase(publication_repository, MockMediaRepository::new(), storage);

        let err = usecase
            .upload(
                post.id,
                MediaUpload {
                    bytes: Bytes::from_static(b"\x00\x00"),
                    file_name: "clip.mp4".to_string(),
                    mime_type: "video/mp4".to_string(),
                },
                false,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PublishingError::IncompatibleMediaType { .. }));
    }

    #[tokio::test]
    async fn upload_removes_the_object_when_the_publication_switched_type_meanwhile() {
        let reel = publication(ContentType::Reel, PublicationStatus::Draft);
        let reel_id = reel.id;
        let mut publication_repository = MockPublicationRepository::new();
        expect_find(&mut publication_repository, &reel);

        // Switched to POST between the upfront check and the locked insert.
        let mut media_repository = MockMediaRepository::new();
        media_repository.expect_insert_guarded().times(1).returning(|_, _, _| {
            Ok(GuardedMediaInsert::Incompatible {
                expected: MediaFamily::Image,
            })
        });

        let mut storage = MockMediaStorage::new();
        storage
            .expect_write_object()
            .times(1)
            .returning(|_, _, _| Ok("stored.mp4".to_string()));
        storage
            .expect_delete_object()
            .withf(|locator| locator == "stored.mp4")
            .times(1)
            .returning(|_| Ok(ObjectDeletion::Deleted));

        let usecase = usecase(publication_repository, media_repository, storage);

        let err = usecase
            .upload(
                reel_id,
                MediaUpload {
                    bytes: Bytes::from_static(b"\x00\x00"),
                    file_name: "clip.mp4".to_string(),
                    mime_type: "video/mp4".to_string(),
                },
                false,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishingError::IncompatibleMediaType {
                expected: MediaFamily::Image,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn upload_removes_the_object_when_the_publication_is_gone() {
        let reel = publication(ContentType::Reel, PublicationStatus::Draft);
        let reel_id = reel.id;
        let mut publication_repository = MockPublicationRepository::new();
        expect_find(&mut publication_repository, &reel);

        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_insert_guarded()
            .returning(|_, _, _| Ok(GuardedMediaInsert::PublicationNotFound));

        let mut storage = MockMediaStorage::new();
        storage
            .expect_write_object()
            .returning(|_, _, _| Ok("stored.webm".to_string()));
        storage
            .expect_delete_object()
            .withf(|locator| locator == "stored.webm")
            .times(1)
            .returning(|_| Ok(ObjectDeletion::Deleted));

        let usecase = usecase(publication_repository, media_repository, storage);

        let err = usecase
            .upload(
                reel_id,
                MediaUpload {
                    bytes: Bytes::from_static(b"\x00"),
                    file_name: "clip.webm".to_string(),
                    mime_type: "video/webm".to_string(),
                },
                true,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PublishingError::PublicationNotFound(id) if id == reel_id));
    }

    #[tokio::test]
    async fn sweep_removes_only_the_other_family() {
        let publication_id = Uuid::new_v4();
        let image = media(publication_id, "image/png");
        let image_id = image.id;

        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_delete_swept()
            .with(eq(publication_id), eq(ContentType::Reel))
            .times(1)
            .returning(move |_, _| {
                Ok(Some(MediaRemoval {
                    removed: vec![image.clone()],
                    remaining: 1,
                }))
            });

        let mut storage = MockMediaStorage::new();
        storage
            .expect_delete_object()
            .times(1)
            .returning(|_| Ok(ObjectDeletion::NotFound));

        let usecase = usecase(MockPublicationRepository::new(), media_repository, storage);

        let swept = usecase
            .sweep_incompatible(publication_id, ContentType::Reel)
            .await
            .unwrap();

        assert_eq!(swept.remaining, 1);
        assert_eq!(swept.removed.len(), 1);
        assert_eq!(swept.removed[0].id, image_id);
        assert!(swept.removed[0].reason.contains("REEL"));
    }

    #[tokio::test]
    async fn sweep_with_nothing_to_remove_leaves_storage_alone() {
        let publication_id = Uuid::new_v4();

        let mut media_repository = MockMediaRepository::new();
        media_repository.expect_delete_swept().returning(|_, _| {
            Ok(Some(MediaRemoval {
                removed: Vec::new(),
                remaining: 1,
            }))
        });

        let mut storage = MockMediaStorage::new();
        storage.expect_delete_object().times(0);

        let usecase = usecase(MockPublicationRepository::new(), media_repository, storage);

        let swept = usecase
            .sweep_incompatible(publication_id, ContentType::Reel)
            .await
            .unwrap();

        assert!(swept.removed.is_empty());
        assert_eq!(swept.remaining, 1);
    }

    #[tokio::test]
    async fn sweep_of_missing_publication_is_not_found() {
        let missing = Uuid::new_v4();
        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_delete_swept()
            .returning(|_, _| Ok(None));

        let usecase = usecase(
            MockPublicationRepository::new(),
            media_repository,
            MockMediaStorage::new(),
        );

        let err = usecase
            .sweep_incompatible(missing, ContentType::Post)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishingError::PublicationNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn media_stats_count_families() {
        let post = publication(ContentType::Post, PublicationStatus::Draft);
        let post_id = post.id;
        let mut publication_repository = MockPublicationRepository::new();
        expect_find(&mut publication_repository, &post);

        let listed = vec![media(post_id, "image/png"), media(post_id, "image/webp")];
        let mut media_repository = MockMediaRepository::new();
        media_repository
            .expect_list_by_publication()
            .returning(move |_| Ok(listed.clone()));

        let usecase = usecase(publication_repository, media_repository, MockMediaStorage::new());

        let stats = usecase.media_stats(post_id).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.images, 2);
        assert_eq!(stats.videos, 0);
    }
}
