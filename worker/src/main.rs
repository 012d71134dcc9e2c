use anyhow::Result;
use publishing::{
    bootstrap::{build_media_storage, build_publishing_services},
    infra::db::postgres::postgres_connection,
};
use std::sync::Arc;
use tracing::{error, info};
use worker::{axum_http, config, publication_scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    publishing::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);
    let media_storage = build_media_storage(&dotenvy_env.media_storage).await?;
    let services = build_publishing_services(Arc::clone(&db_pool_arc), media_storage);

    let scheduler_loop = tokio::spawn(publication_scheduler::worker::run(
        Arc::clone(&services.scheduler),
        dotenvy_env.scheduler.clone(),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server = tokio::spawn(async move { axum_http::http_serve::start(server_config).await });

    // The HTTP server owns shutdown; once it returns the scheduler loop is dropped with the runtime.
    tokio::select! {
        result = scheduler_loop => result??,
        result = http_server => result??,
    };

    info!("Worker stopped");
    Ok(())
}
