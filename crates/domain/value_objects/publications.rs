use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        media::MediaEntity,
        publications::{InsertPublicationEntity, PublicationEntity, UpdatePublicationEntity},
    },
    errors::{PublishingError, PublishingResult},
    value_objects::enums::{content_types::ContentType, publication_statuses::PublicationStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePublicationModel {
    pub title: String,
    pub content_type: String,
    pub status: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
}

impl CreatePublicationModel {
    /// Parses the wire strings and fills defaults: DRAFT, and "now" as publish date.
    pub fn to_entity(
        &self,
        client_id: Uuid,
        now: DateTime<Utc>,
    ) -> PublishingResult<(ContentType, InsertPublicationEntity)> {
        let title = validate_title(&self.title)?;
        let content_type: ContentType = self.content_type.parse()?;
        let status = match self.status.as_deref() {
            Some(status) => status.parse::<PublicationStatus>()?,
            None => PublicationStatus::Draft,
        };

        let entity = InsertPublicationEntity {
            client_id,
            title,
            content_type: content_type.to_string(),
            status: status.to_string(),
            publish_date: self.publish_date.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };

        Ok((content_type, entity))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdatePublicationModel {
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidatedPublicationUpdate {
    pub title: Option<String>,
    pub content_type: Option<ContentType>,
    pub status: Option<PublicationStatus>,
    pub publish_date: Option<DateTime<Utc>>,
}

impl UpdatePublicationModel {
    pub fn validate(&self) -> PublishingResult<ValidatedPublicationUpdate> {
        let title = self.title.as_deref().map(validate_title).transpose()?;
        let content_type = self
            .content_type
            .as_deref()
            .map(str::parse::<ContentType>)
            .transpose()?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<PublicationStatus>)
            .transpose()?;

        Ok(ValidatedPublicationUpdate {
            title,
            content_type,
            status,
            publish_date: self.publish_date,
        })
    }
}

impl ValidatedPublicationUpdate {
    pub fn to_entity(&self, now: DateTime<Utc>) -> UpdatePublicationEntity {
        UpdatePublicationEntity {
            title: self.title.clone(),
            content_type: self.content_type.map(|content_type| content_type.to_string()),
            status: self.status.map(|status| status.to_string()),
            publish_date: self.publish_date,
            updated_at: Some(now),
        }
    }
}

fn validate_title(title: &str) -> PublishingResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PublishingError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListPublicationsFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<PublicationStatus>,
}

/// A publication as read back by callers: the row, its media (oldest first) and
/// the number of comments left on it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicationView {
    #[serde(flatten)]
    pub publication: PublicationEntity,
    pub media: Vec<MediaEntity>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RemovedMedia {
    pub id: Uuid,
    pub url: String,
    pub media_type: String,
    pub reason: String,
}

impl RemovedMedia {
    pub fn incompatible_with(media: &MediaEntity, content_type: ContentType) -> Self {
        Self {
            id: media.id,
            url: media.url.clone(),
            media_type: media.media_type.clone(),
            reason: format!(
                "{} is not allowed on a {} publication",
                media.media_type, content_type
            ),
        }
    }
}

/// A partial update as committed under the publication row lock, with the media rows a
/// content type switch removed in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    pub publication: PublicationEntity,
    pub swept_media: Vec<MediaEntity>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpdatedPublication {
    pub publication: PublicationView,
    pub removed_media: Vec<RemovedMedia>,
}

/// Result of the quota-checked insert. The repository reports policy rejections as data so
/// the check and the insert can share one transaction.
#[derive(Debug)]
pub enum GuardedInsertOutcome {
    Created(PublicationEntity),
    ClientNotFound,
    ClientInactive,
    QuotaExceeded {
        rejection: PublishingError,
        current_count: i64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicationStatsRow {
    pub content_type: String,
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletedPublication {
    pub publication: PublicationEntity,
    pub media: Vec<MediaEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_draft_now() {
        let now = Utc::now();
        let client_id = Uuid::new_v4();
        let model = CreatePublicationModel {
            title: "  Spring launch ".to_string(),
            content_type: "REEL".to_string(),
            status: None,
            publish_date: None,
        };

        let (content_type, entity) = model.to_entity(client_id, now).unwrap();

        assert_eq!(content_type, ContentType::Reel);
        assert_eq!(entity.title, "Spring launch");
        assert_eq!(entity.status, "DRAFT");
        assert_eq!(entity.publish_date, now);
        assert_eq!(entity.client_id, client_id);
    }

    #[test]
    fn create_rejects_bad_enum_values() {
        let model = CreatePublicationModel {
            title: "t".to_string(),
            content_type: "STORY".to_string(),
            status: None,
            publish_date: None,
        };
        assert!(matches!(
            model.to_entity(Uuid::new_v4(), Utc::now()),
            Err(PublishingError::Validation(_))
        ));

        let model = CreatePublicationModel {
            content_type: "POST".to_string(),
            status: Some("ARCHIVED".to_string()),
            ..model
        };
        assert!(matches!(
            model.to_entity(Uuid::new_v4(), Utc::now()),
            Err(PublishingError::Validation(_))
        ));
    }

    #[test]
    fn update_only_carries_provided_fields() {
        let model = UpdatePublicationModel {
            status: Some("SCHEDULED".to_string()),
            ..Default::default()
        };

        let validated = model.validate().unwrap();
        assert_eq!(validated.status, Some(PublicationStatus::Scheduled));
        assert!(validated.title.is_none());
        assert!(validated.content_type.is_none());

        let now = Utc::now();
        let entity = validated.to_entity(now);
        assert_eq!(entity.status.as_deref(), Some("SCHEDULED"));
        assert!(entity.title.is_none());
        assert_eq!(entity.updated_at, Some(now));
    }

    #[test]
    fn update_rejects_blank_title_and_lowercase_enums() {
        let blank = UpdatePublicationModel {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());

        let lowercase = UpdatePublicationModel {
            content_type: Some("post".to_string()),
            ..Default::default()
        };
        assert!(lowercase.validate().is_err());
    }
}
