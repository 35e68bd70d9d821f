//! Explicit transaction boundaries.
//!
//! A unit of work is begun, handed to the code that writes through it, and
//! completed with [`complete`]: commit when the work succeeded and nobody
//! called `set_rollback_only`, roll back otherwise. A rollback requested with
//! `set_rollback_only` is not an error; a failed step is, and its error is
//! returned after the rollback.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};

/// A transaction shared by every repository opened inside one unit of work
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// How a completed unit of work ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome<T> {
    Committed(T),
    /// The work finished but was marked rollback-only; nothing was persisted.
    RolledBack(T),
}

impl<T> TxOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, TxOutcome::Committed(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            TxOutcome::Committed(value) | TxOutcome::RolledBack(value) => value,
        }
    }
}

/// Whether a successful unit of work should be kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitMode {
    #[default]
    Commit,
    RollbackOnly,
}

#[async_trait]
pub trait Transactional: Send + Sync {
    /// Mark the unit of work so that completing it rolls back instead of committing
    fn set_rollback_only(&mut self);

    fn is_rollback_only(&self) -> bool;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Finish a unit of work according to the result of the work done inside it.
pub async fn complete<U, T>(uow: Box<U>, result: Result<T>) -> Result<TxOutcome<T>>
where
    U: Transactional + ?Sized,
    T: Send,
{
    match result {
        Ok(value) if uow.is_rollback_only() => {
            uow.rollback().await?;
            tracing::info!("Transaction rolled back (rollback-only)");
            Ok(TxOutcome::RolledBack(value))
        }
        Ok(value) => {
            uow.commit().await?;
            tracing::debug!("Transaction committed");
            Ok(TxOutcome::Committed(value))
        }
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!(
                    "Failed to roll back after error ({}): {:?}",
                    e,
                    rollback_err
                );
            } else {
                tracing::warn!("Transaction rolled back: {}", e);
            }
            Err(e)
        }
    }
}

/// Owns the shared transaction handle and the rollback-only flag.
pub struct PgTransaction {
    tx: SharedTx,
    rollback_only: bool,
}

impl PgTransaction {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        let tx = pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            rollback_only: false,
        })
    }

    /// Executor bound to this transaction
    pub fn executor(&self) -> PgExecutor {
        PgExecutor::Tx(Arc::clone(&self.tx))
    }

    async fn take(&self) -> Result<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::Internal("Transaction already completed".to_string()))
    }
}

#[async_trait]
impl Transactional for PgTransaction {
    fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.take().await?.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.take().await?.rollback().await.map_err(|e| {
            tracing::error!("Failed to roll back transaction: {:?}", e);
            AppError::Database(e)
        })
    }
}

/// Where a repository sends its statements: the pool, or an open transaction.
#[derive(Clone)]
pub enum PgExecutor {
    Pool(PgPool),
    Tx(SharedTx),
}

impl PgExecutor {
    pub async fn fetch_all<'q, O>(&self, query: QueryAs<'q, Postgres, O, PgArguments>) -> Result<Vec<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            PgExecutor::Pool(pool) => Ok(query.fetch_all(pool).await?),
            PgExecutor::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(closed)?;
                Ok(query.fetch_all(&mut **conn).await?)
            }
        }
    }

    pub async fn fetch_optional<'q, O>(
        &self,
        query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> Result<Option<O>>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            PgExecutor::Pool(pool) => Ok(query.fetch_optional(pool).await?),
            PgExecutor::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(closed)?;
                Ok(query.fetch_optional(&mut **conn).await?)
            }
        }
    }

    pub async fn fetch_one<'q, O>(&self, query: QueryAs<'q, Postgres, O, PgArguments>) -> Result<O>
    where
        O: Send + Unpin + for<'r> FromRow<'r, PgRow>,
    {
        match self {
            PgExecutor::Pool(pool) => Ok(query.fetch_one(pool).await?),
            PgExecutor::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(closed)?;
                Ok(query.fetch_one(&mut **conn).await?)
            }
        }
    }

    pub async fn execute<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Result<PgQueryResult> {
        match self {
            PgExecutor::Pool(pool) => Ok(query.execute(pool).await?),
            PgExecutor::Tx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or_else(closed)?;
                Ok(query.execute(&mut **conn).await?)
            }
        }
    }
}

fn closed() -> AppError {
    AppError::Internal("Transaction already completed".to_string())
}
