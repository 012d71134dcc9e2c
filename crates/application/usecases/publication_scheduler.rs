use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, error, info, warn};

use crate::domain::repositories::publication_scheduler::PublicationSchedulerRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick still held the guard.
    Skipped,
    Idle,
    Promoted { candidates: usize, promoted: usize },
    Failed,
}

/// One scheduler tick: promote every due SCHEDULED publication that has media.
///
/// Ticks never overlap within a process; a tick that finds the previous one still running
/// is skipped rather than queued. Errors end the tick and are logged, the next tick retries.
pub struct PublicationSchedulerUseCase {
    repository: Arc<dyn PublicationSchedulerRepository + Send + Sync>,
    running: AtomicBool,
}

impl PublicationSchedulerUseCase {
    pub fn new(repository: Arc<dyn PublicationSchedulerRepository + Send + Sync>) -> Self {
        Self {
            repository,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now()).await
    }

    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let Some(_guard) = TickGuard::acquire(&self.running) else {
            warn!("publication_scheduler: previous tick still running; skipping");
            return TickOutcome::Skipped;
        };

        match self.promote_due(now).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = ?err, "publication_scheduler: tick failed");
                TickOutcome::Failed
            }
        }
    }

    async fn promote_due(&self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let due_ids = self.repository.list_due_scheduled_ids(now).await?;

        if due_ids.is_empty() {
            debug!("publication_scheduler: nothing due");
            return Ok(TickOutcome::Idle);
        }

        let candidates = due_ids.len();
        let promoted = self.repository.promote_scheduled(due_ids, now).await?;

        info!(
            candidates,
            promoted,
            "publication_scheduler: scheduled publications published"
        );

        Ok(TickOutcome::Promoted {
            candidates,
            promoted,
        })
    }
}

/// Holds the running flag for the duration of a tick and clears it on drop, panics included.
struct TickGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
