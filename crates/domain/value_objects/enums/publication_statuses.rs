use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::domain::errors::PublishingError;

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
}

impl Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PublicationStatus::Draft => "DRAFT",
            PublicationStatus::Scheduled => "SCHEDULED",
            PublicationStatus::Published => "PUBLISHED",
        };
        write!(f, "{}", status)
    }
}

impl FromStr for PublicationStatus {
    type Err = PublishingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DRAFT" => Ok(PublicationStatus::Draft),
            "SCHEDULED" => Ok(PublicationStatus::Scheduled),
            "PUBLISHED" => Ok(PublicationStatus::Published),
            other => Err(PublishingError::Validation(format!(
                "invalid status `{other}`; use DRAFT, SCHEDULED or PUBLISHED"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip_through_display() {
        for status in [
            PublicationStatus::Draft,
            PublicationStatus::Scheduled,
            PublicationStatus::Published,
        ] {
            assert_eq!(status.to_string().parse::<PublicationStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        for raw in ["draft", "Published", " SCHEDULED", ""] {
            let err = raw.parse::<PublicationStatus>().unwrap_err();
            assert!(
                matches!(err, PublishingError::Validation(_)),
                "expected validation error for {raw:?}, got: {err}"
            );
        }
    }

    #[test]
    fn serializes_as_uppercase_string() {
        let json = serde_json::to_string(&PublicationStatus::Scheduled).unwrap();
        assert_eq!(json, "\"SCHEDULED\"");
    }
}
