use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanTier {
    Basic,
    Standard,
    Full,
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan = match self {
            PlanTier::Basic => "BASIC",
            PlanTier::Standard => "STANDARD",
            PlanTier::Full => "FULL",
        };
        write!(f, "{}", plan)
    }
}

impl PlanTier {
    /// Plans are stored as free text by the client module; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "BASIC" => Some(PlanTier::Basic),
            "STANDARD" => Some(PlanTier::Standard),
            "FULL" => Some(PlanTier::Full),
            _ => None,
        }
    }
}
