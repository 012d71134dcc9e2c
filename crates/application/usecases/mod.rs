pub mod media_attachment;
pub mod publication_scheduler;
pub mod publications;
