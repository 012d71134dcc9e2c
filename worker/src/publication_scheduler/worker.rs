use anyhow::Result;
use publishing::application::usecases::publication_scheduler::{
    PublicationSchedulerUseCase, TickOutcome,
};
use std::{sync::Arc, time::Duration};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::config_model::Scheduler;

/// Fires a tick every interval. Each tick runs in its own task, so a slow tick really does
/// overlap with the next one and the usecase guard decides which runs.
pub async fn run(usecase: Arc<PublicationSchedulerUseCase>, config: Scheduler) -> Result<()> {
    if !config.enabled {
        info!("publication_scheduler: disabled by configuration");
        std::future::pending::<()>().await;
        return Ok(());
    }

    info!(
        interval_secs = config.interval_secs,
        "publication_scheduler: starting worker loop"
    );

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let usecase = Arc::clone(&usecase);
        tokio::spawn(async move {
            let handle = tokio::spawn(async move { usecase.tick().await });
            match handle.await {
                Ok(TickOutcome::Promoted { .. }) | Ok(TickOutcome::Skipped) => {}
                Ok(outcome) => debug!(?outcome, "publication_scheduler: tick finished"),
                Err(err) => error!(error = %err, "publication_scheduler: tick task panicked"),
            }
        });
    }
}
