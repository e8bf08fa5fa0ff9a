//! Expiry sweeper
//!
//! Periodic background task that batches refresh-token rows whose rolling
//! expiry has passed, force-logs-out their owners over the push channel,
//! and deletes them. One run is active at a time; a failed delete is logged
//! and the sweep continues with the next row.

use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use session_common::{AppError, AppResult, SweeperConfig};
use session_core::{Database, PushChannel, PushMessage, RepoResult, Session};

/// Reason carried by the forced-logout notification
const REASON_SESSION_EXPIRED: &str = "session-expired";

/// Counters for one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Expired rows fetched this run
    pub scanned: usize,
    /// Rows successfully deleted
    pub deleted: usize,
    /// Rows whose delete failed (retried next run)
    pub failed: usize,
}

/// Background sweeper for expired refresh tokens
pub struct ExpirySweeper {
    database: Arc<dyn Database>,
    push: Arc<dyn PushChannel>,
    config: SweeperConfig,
}

impl ExpirySweeper {
    /// Create a new sweeper
    pub fn new(
        database: Arc<dyn Database>,
        push: Arc<dyn PushChannel>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            database,
            push,
            config,
        }
    }

    /// Run the sweep loop until cancelled. Runs never overlap: the next
    /// tick is not polled while a sweep is in flight.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(std::time::Duration::from_secs(self.config.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_seconds = self.config.interval_seconds,
            batch_size = self.config.batch_size,
            "Expiry sweeper started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("Expiry sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.run_once(&cancel).await {
                        error!(error = %err, "Sweep run failed");
                    }
                }
            }
        }
    }

    /// Execute one sweep: fetch a bounded batch of expired rows, then
    /// notify-and-delete each. Cancellation is honoured between rows, never
    /// mid-row.
    #[instrument(skip(self, cancel))]
    pub async fn run_once(&self, cancel: &CancellationToken) -> AppResult<SweepStats> {
        let mut stats = SweepStats::default();

        let batch = self.fetch_expired_batch().await.map_err(AppError::from)?;
        stats.scanned = batch.len();

        for session in batch {
            if cancel.is_cancelled() {
                break;
            }

            // Notify before deleting. Delivery is fire-and-forget: a push
            // failure does not block the delete.
            let message = PushMessage::forced_logout(REASON_SESSION_EXPIRED);
            if let Err(err) = self
                .push
                .send(session.perso_id, session.session_id, &message)
                .await
            {
                warn!(
                    perso_id = %session.perso_id,
                    session_id = %session.session_id,
                    error = %err,
                    "Forced-logout notification failed"
                );
            }

            match self.delete_session(&session).await {
                Ok(()) => stats.deleted += 1,
                Err(err) => {
                    stats.failed += 1;
                    error!(
                        session_id = %session.session_id,
                        error = %err,
                        "Failed to delete expired session"
                    );
                }
            }
        }

        if stats.scanned > 0 {
            info!(
                scanned = stats.scanned,
                deleted = stats.deleted,
                failed = stats.failed,
                "Sweep completed"
            );
        }

        Ok(stats)
    }

    async fn fetch_expired_batch(&self) -> RepoResult<Vec<Session>> {
        let mut uow = self.database.begin().await?;
        match uow.get_expired_batch(self.config.batch_size).await {
            Ok(batch) => {
                uow.commit().await?;
                Ok(batch)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Delete one row in its own unit of work, so a single failure cannot
    /// poison the rest of the batch.
    async fn delete_session(&self, session: &Session) -> RepoResult<()> {
        let mut uow = self.database.begin().await?;
        match uow.delete_by_hash(&session.hashed_token).await {
            Ok(_) => uow.commit().await,
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ExpirySweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
