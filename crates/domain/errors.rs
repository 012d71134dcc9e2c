use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{
    enums::content_types::ContentType, media_compatibility::MediaFamily,
};

/// Errors raised by the publication and media usecases.
///
/// Presentation layers map these to their own codes; the variants stay distinct so a
/// quota rejection never looks like a validation failure or a missing record.
#[derive(Debug, Error)]
pub enum PublishingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("publication {0} not found")]
    PublicationNotFound(Uuid),

    #[error("media {media_id} not found under publication {publication_id}")]
    MediaNotFound { publication_id: Uuid, media_id: Uuid },

    #[error("client {0} not found")]
    ClientNotFound(Uuid),

    #[error("no client record for user {0}")]
    ClientNotFoundForUser(Uuid),

    #[error("client {0} is inactive and cannot create publications")]
    InactiveClient(Uuid),

    #[error("quota reached: plan {plan} allows at most {limit} {content_type} publications")]
    QuotaExceeded {
        plan: String,
        content_type: ContentType,
        limit: i64,
    },

    #[error("incompatible media type: expected {expected} file, got `{got}`")]
    IncompatibleMediaType { expected: MediaFamily, got: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type PublishingResult<T> = std::result::Result<T, PublishingError>;
