use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::domain::errors::PublishingError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Post,
    Reel,
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content_type = match self {
            ContentType::Post => "POST",
            ContentType::Reel => "REEL",
        };
        write!(f, "{}", content_type)
    }
}

impl FromStr for ContentType {
    type Err = PublishingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "POST" => Ok(ContentType::Post),
            "REEL" => Ok(ContentType::Reel),
            other => Err(PublishingError::Validation(format!(
                "invalid content type `{other}`; only POST or REEL are allowed"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_values_only() {
        assert_eq!("POST".parse::<ContentType>().unwrap(), ContentType::Post);
        assert_eq!("REEL".parse::<ContentType>().unwrap(), ContentType::Reel);
        assert!("reel".parse::<ContentType>().is_err());
        assert!("STORY".parse::<ContentType>().is_err());
    }
}
