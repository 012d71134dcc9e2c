use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;

use crate::domain::value_objects::media::ObjectDeletion;

#[automock]
#[async_trait]
pub trait MediaStorage {
    /// Stores the bytes under a fresh object name and returns the locator to persist.
    async fn write_object(&self, bytes: Bytes, file_name: &str, mime_type: &str)
    -> Result<String>;

    async fn delete_object(&self, locator: &str) -> Result<ObjectDeletion>;
}
