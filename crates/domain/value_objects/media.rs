use serde::Serialize;

use crate::domain::{
    entities::{media::MediaEntity, publications::PublicationEntity},
    value_objects::{media_compatibility::MediaFamily, publications::RemovedMedia},
};

/// Outcome of removing one media item inside the publication row lock.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedMedia {
    pub removed: MediaEntity,
    pub remaining: i64,
    /// Set when the removal emptied a SCHEDULED or PUBLISHED publication and it fell back to DRAFT.
    pub reverted_publication: Option<PublicationEntity>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaRemoval {
    pub removed: Vec<MediaEntity>,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SweptMedia {
    pub removed: Vec<RemovedMedia>,
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct MediaStats {
    pub total: i64,
    pub images: i64,
    pub videos: i64,
}

impl MediaStats {
    pub fn from_media(media: &[MediaEntity]) -> Self {
        let mut stats = MediaStats {
            total: media.len() as i64,
            ..Default::default()
        };

        for item in media {
            let media_type = item.media_type.trim().to_ascii_lowercase();
            if media_type.starts_with("image/") {
                stats.images += 1;
            } else if media_type.starts_with("video/") {
                stats.videos += 1;
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttachedMedia {
    pub media: MediaEntity,
    /// True when `publish_now` moved the publication from DRAFT to PUBLISHED.
    pub published: bool,
    pub publication: PublicationEntity,
}

/// Result of the compatibility-checked insert. Both checks run against the locked
/// publication row, so a concurrent content type change cannot slip in between.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedMediaInsert {
    Attached(AttachedMedia),
    PublicationNotFound,
    Incompatible { expected: MediaFamily },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectDeletion {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub bytes: bytes::Bytes,
    pub file_name: String,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn media(mime: &str) -> MediaEntity {
        MediaEntity {
            id: Uuid::new_v4(),
            publication_id: Uuid::new_v4(),
            media_type: mime.to_string(),
            url: format!("uploads/{}", Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stats_count_by_mime_prefix() {
        let items = vec![
            media("image/png"),
            media("image/gif"),
            media("video/mp4"),
            media("application/pdf"),
        ];

        let stats = MediaStats::from_media(&items);
        assert_eq!(
            stats,
            MediaStats {
                total: 4,
                images: 2,
                videos: 1
            }
        );
    }
}
