pub mod content_types;
pub mod plan_tiers;
pub mod publication_statuses;
