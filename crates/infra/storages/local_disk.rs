use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::domain::{repositories::storage::MediaStorage, value_objects::media::ObjectDeletion};

use super::object_name;

#[derive(Debug, Clone)]
pub struct LocalDiskConfig {
    pub root_dir: PathBuf,
}

/// Media objects as plain files under one directory. Locators are the bare file names.
pub struct LocalDiskStorage {
    root_dir: PathBuf,
}

impl LocalDiskStorage {
    pub async fn new(config: LocalDiskConfig) -> Result<Self> {
        fs::create_dir_all(&config.root_dir)
            .await
            .with_context(|| format!("failed to create media directory {:?}", config.root_dir))?;

        Ok(Self {
            root_dir: config.root_dir,
        })
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf> {
        let path = Path::new(locator);
        let mut components = path.components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root_dir.join(path)),
            _ => bail!("invalid media locator `{}`", locator),
        }
    }
}

#[async_trait]
impl MediaStorage for LocalDiskStorage {
    async fn write_object(&self, bytes: Bytes, file_name: &str, mime_type: &str) -> Result<String> {
        let locator = object_name(file_name, mime_type);
        let path = self.root_dir.join(&locator);

        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write media file {:?}", path))?;

        debug!(%locator, size = bytes.len(), "local_disk: object written");

        Ok(locator)
    }

    async fn delete_object(&self, locator: &str) -> Result<ObjectDeletion> {
        let path = self.resolve(locator)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(ObjectDeletion::Deleted),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ObjectDeletion::NotFound),
            Err(err) => {
                Err(anyhow::Error::new(err).context(format!("failed to delete media file {:?}", path)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn temp_storage() -> Result<(LocalDiskStorage, PathBuf)> {
        let root_dir = std::env::temp_dir().join(format!("publishing-media-{}", Uuid::new_v4()));
        let storage = LocalDiskStorage::new(LocalDiskConfig {
            root_dir: root_dir.clone(),
        })
        .await?;
        Ok((storage, root_dir))
    }

    #[tokio::test]
    async fn write_then_delete_round_trip() -> Result<()> {
        let (storage, root_dir) = temp_storage().await?;

        let locator = storage
            .write_object(Bytes::from_static(b"frame"), "clip.mp4", "video/mp4")
            .await?;
        assert!(locator.ends_with(".mp4"));
        assert_eq!(fs::read(root_dir.join(&locator)).await?, b"frame");

        assert_eq!(storage.delete_object(&locator).await?, ObjectDeletion::Deleted);
        assert_eq!(storage.delete_object(&locator).await?, ObjectDeletion::NotFound);

        fs::remove_dir_all(&root_dir).await?;
        Ok(())
    }

    #[tokio::test]
    async fn refuses_locators_outside_the_root() -> Result<()> {
        let (storage, root_dir) = temp_storage().await?;

        assert!(storage.delete_object("../etc/passwd").await.is_err());
        assert!(storage.delete_object("/etc/passwd").await.is_err());
        assert!(storage.delete_object("nested/file.png").await.is_err());

        fs::remove_dir_all(&root_dir).await?;
        Ok(())
    }
}
