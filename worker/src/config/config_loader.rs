use anyhow::{Context, Result, bail};
use publishing::infra::storages::{
    MediaStorageConfig, local_disk::LocalDiskConfig, s3_media::S3MediaStorageConfig,
};
use std::{path::PathBuf, str::FromStr};

use super::config_model::{Database, DotEnvyConfig, Scheduler, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

pub(crate) fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<DotEnvyConfig> {
    let env = Env { lookup };

    let worker_server = WorkerServer {
        port: env.required_parsed("SERVER_PORT_WORKER")?,
        body_limit: env.parsed_or("SERVER_BODY_LIMIT", 1)?,
        timeout: env.parsed_or("SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: env.required("DATABASE_URL")?,
    };

    let scheduler = Scheduler {
        enabled: env.parsed_or("SCHEDULER_ENABLED", true)?,
        interval_secs: env.parsed_or("SCHEDULER_INTERVAL_SECS", 300)?,
    };
    if scheduler.interval_secs == 0 {
        bail!("SCHEDULER_INTERVAL_SECS must be greater than zero");
    }

    let backend = env
        .optional("MEDIA_STORAGE_BACKEND")
        .unwrap_or_else(|| "local".to_string());

    let media_storage = match backend.to_ascii_lowercase().as_str() {
        "local" => MediaStorageConfig::Local(LocalDiskConfig {
            root_dir: PathBuf::from(
                env.optional("MEDIA_LOCAL_DIR")
                    .unwrap_or_else(|| "uploads".to_string()),
            ),
        }),
        "s3" => MediaStorageConfig::S3(S3MediaStorageConfig {
            endpoint: env.required("MEDIA_S3_ENDPOINT")?,
            region: env
                .optional("MEDIA_S3_REGION")
                .unwrap_or_else(|| "us-east-1".to_string()),
            bucket: env.required("MEDIA_S3_BUCKET")?,
            access_key: env.required("MEDIA_S3_ACCESS_KEY_ID")?,
            secret_key: env.required("MEDIA_S3_SECRET_ACCESS_KEY")?,
            prefix: env
                .optional("MEDIA_S3_PREFIX")
                .unwrap_or_else(|| "media".to_string()),
        }),
        other => bail!("MEDIA_STORAGE_BACKEND is invalid: `{}` (expected local or s3)", other),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        scheduler,
        media_storage,
    })
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("{} is required", key))
    }

    fn required_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.required(key)?
            .parse()
            .with_context(|| format!("{} is invalid", key))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.optional(key) {
            Some(value) => value.parse().with_context(|| format!("{} is invalid", key)),
            None => Ok(default),
        }
    }
}
