pub mod enums;
pub mod media;
pub mod media_compatibility;
pub mod plan_quota;
pub mod publication_lifecycle;
pub mod publications;
