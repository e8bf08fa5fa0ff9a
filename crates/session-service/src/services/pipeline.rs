//! Transaction pipeline
//!
//! Brackets every state-changing flow: one unit of work is opened per flow
//! invocation, committed when the flow returns success, rolled back on any
//! failure. Business failures and infrastructure failures both roll back;
//! the difference is only how they surface (typed value vs genericised
//! `Internal`). A rollback failure is logged but never masks the original
//! failure being reported.

use std::sync::Arc;

use session_common::{AppError, AppResult};
use session_core::{Database, UnitOfWork};

/// Wrapper owning the begin/commit/rollback bracket around flows
#[derive(Clone)]
pub struct TransactionPipeline {
    database: Arc<dyn Database>,
}

impl TransactionPipeline {
    /// Create a new pipeline over the given database
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self { database }
    }

    /// Open a unit of work for one flow invocation
    pub async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.database.begin().await.map_err(AppError::from)
    }

    /// Close the unit of work according to the flow's outcome: commit on
    /// success, roll back on failure. The failure value is propagated
    /// unchanged either way.
    pub async fn finish<T>(
        &self,
        uow: Box<dyn UnitOfWork>,
        result: AppResult<T>,
    ) -> AppResult<T> {
        match result {
            Ok(value) => {
                uow.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    // Secondary failure; the original error still propagates
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TransactionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionPipeline").finish_non_exhaustive()
    }
}
