use serde::Serialize;
use std::fmt::Display;

use crate::domain::{errors::PublishingError, value_objects::enums::content_types::ContentType};

pub const IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/jpg"];
pub const VIDEO_MIME_TYPES: [&str; 2] = ["video/mp4", "video/webm"];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaFamily {
    Image,
    Video,
}

impl Display for MediaFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let family = match self {
            MediaFamily::Image => "image",
            MediaFamily::Video => "video",
        };
        write!(f, "{}", family)
    }
}

impl MediaFamily {
    /// Only the accepted upload formats belong to a family; other MIME types have none.
    pub fn of_mime(mime_type: &str) -> Option<Self> {
        let mime_type = mime_type.trim().to_ascii_lowercase();

        if IMAGE_MIME_TYPES.contains(&mime_type.as_str()) {
            Some(MediaFamily::Image)
        } else if VIDEO_MIME_TYPES.contains(&mime_type.as_str()) {
            Some(MediaFamily::Video)
        } else {
            None
        }
    }

    pub fn other(self) -> Self {
        match self {
            MediaFamily::Image => MediaFamily::Video,
            MediaFamily::Video => MediaFamily::Image,
        }
    }
}

impl ContentType {
    pub fn media_family(self) -> MediaFamily {
        match self {
            ContentType::Post => MediaFamily::Image,
            ContentType::Reel => MediaFamily::Video,
        }
    }
}

pub fn is_compatible(content_type: ContentType, mime_type: &str) -> bool {
    MediaFamily::of_mime(mime_type) == Some(content_type.media_family())
}

pub fn ensure_compatible(content_type: ContentType, mime_type: &str) -> Result<(), PublishingError> {
    if is_compatible(content_type, mime_type) {
        return Ok(());
    }

    Err(PublishingError::IncompatibleMediaType {
        expected: content_type.media_family(),
        got: mime_type.to_string(),
    })
}

/// Media that must go when a publication switches to `content_type`: anything in the
/// opposite family. Unrecognised MIME types are left alone.
pub fn is_swept_by(content_type: ContentType, mime_type: &str) -> bool {
    MediaFamily::of_mime(mime_type) == Some(content_type.media_family().other())
}
