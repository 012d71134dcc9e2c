use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
};
use bytes::Bytes;
use tracing::debug;

use crate::domain::{repositories::storage::MediaStorage, value_objects::media::ObjectDeletion};

use super::{
    object_name,
    s3::{S3Config, build_s3_client},
};

#[derive(Clone)]
pub struct S3MediaStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub prefix: String,
}

impl std::fmt::Debug for S3MediaStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3MediaStorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Media objects in an S3-compatible bucket. The locator stored on the media row is the object key.
pub struct S3MediaStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3MediaStorage {
    pub async fn new(config: S3MediaStorageConfig) -> Result<Self> {
        let client = build_s3_client(&S3Config::new(
            config.endpoint,
            config.region,
            config.access_key,
            config.secret_key,
        ))
        .await
        .context("failed to build media s3 client")?;

        Ok(Self {
            client,
            bucket: config.bucket,
            prefix: normalize_prefix(&config.prefix),
        })
    }

    async fn object_exists(&self, object_key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err)) if service_err.err().is_not_found() => {
                Ok(false)
            }
            Err(err) => Err(describe_sdk_error(err, "inspect", &self.bucket, object_key)),
        }
    }
}

#[async_trait]
impl MediaStorage for S3MediaStorage {
    async fn write_object(&self, bytes: Bytes, file_name: &str, mime_type: &str) -> Result<String> {
        let object_key = format!("{}{}", self.prefix, object_name(file_name, mime_type));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type(mime_type)
            .send()
            .await
            .map_err(|err| describe_sdk_error(err, "upload", &self.bucket, &object_key))?;

        debug!(%object_key, bucket = %self.bucket, "s3_media: object written");

        Ok(object_key)
    }

    async fn delete_object(&self, locator: &str) -> Result<ObjectDeletion> {
        // DeleteObject succeeds for missing keys, so existence is checked first.
        if !self.object_exists(locator).await? {
            return Ok(ObjectDeletion::NotFound);
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(locator)
            .send()
            .await
            .map_err(|err| describe_sdk_error(err, "delete", &self.bucket, locator))?;

        Ok(ObjectDeletion::Deleted)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn describe_sdk_error<E, R>(
    err: SdkError<E, R>,
    action: &str,
    bucket: &str,
    object_key: &str,
) -> anyhow::Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if let SdkError::ServiceError(service_err) = &err {
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();

        let mut detail = format!("failed to {} media object (code {})", action, code);
        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }
        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context(format!(
        "failed to {} media object [bucket={}, key={}]",
        action, bucket, object_key
    ))
}
