use publishing::infra::storages::MediaStorageConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub scheduler: Scheduler,
    pub media_storage: MediaStorageConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    /// Megabytes.
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    pub enabled: bool,
    pub interval_secs: u64,
}
