pub mod clients;
pub mod media;
pub mod publication_scheduler;
pub mod publications;
pub mod storage;
