//! Database handle and runners.
//!
//! [`Db`] is the only value modules keep. It hands out a [`DbConn`] for plain
//! reads and writes, or a [`DbTx`] inside [`Db::transaction_with_config`].
//! While a transaction closure runs, `Db::conn()` fails on every handle of the
//! current task so a write cannot slip out of the transaction.

use std::{cell::Cell, future::Future, pin::Pin, sync::Arc};

use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use super::tx_config::TxConfig;
use crate::DbError;

tokio::task_local! {
    static IN_TX: Cell<bool>;
}

fn is_in_transaction() -> bool {
    IN_TX.try_with(Cell::get).unwrap_or(false)
}

async fn with_tx_guard<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    IN_TX.scope(Cell::new(true), f).await
}

/// Shared database handle.
#[derive(Clone)]
pub struct Db {
    conn: Arc<DatabaseConnection>,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("engine", &self.db_engine())
            .finish_non_exhaustive()
    }
}

impl Db {
    pub(crate) fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    /// Privileged connection for migrations inside this crate.
    pub(crate) fn sea_internal_ref(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Non-transactional runner.
    ///
    /// # Errors
    /// Returns [`DbError::ConnRequestedInsideTx`] when called from inside a
    /// transaction closure.
    pub fn conn(&self) -> Result<DbConn<'_>, DbError> {
        if is_in_transaction() {
            return Err(DbError::ConnRequestedInsideTx);
        }
        Ok(DbConn { conn: &self.conn })
    }

    /// Run `f` in a transaction configured by `config`.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back otherwise.
    /// Nothing is retried: a serialization failure surfaces as the commit
    /// (or statement) error.
    ///
    /// # Errors
    /// Returns the closure's error, or a `DbError` (converted into `E`) when
    /// the transaction cannot begin or commit.
    pub async fn transaction_with_config<T, E, F>(&self, config: TxConfig, f: F) -> Result<T, E>
    where
        E: From<DbError> + Send,
        T: Send,
        F: for<'a> FnOnce(&'a DbTx<'a>) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>
            + Send,
    {
        let isolation: Option<IsolationLevel> = config.isolation.map(Into::into);

        let txn = self
            .conn
            .begin_with_config(isolation, None)
            .await
            .map_err(DbError::from)
            .map_err(E::from)?;
        let tx = DbTx { tx: &txn };

        let res = with_tx_guard(f(&tx)).await;

        match res {
            Ok(v) => {
                txn.commit().await.map_err(DbError::from).map_err(E::from)?;
                Ok(v)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "transaction rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Database engine identifier for logging.
    #[must_use]
    pub fn db_engine(&self) -> &'static str {
        crate::backend_name(&self.conn)
    }
}

/// Non-transactional runner borrowed from a [`Db`].
pub struct DbConn<'a> {
    pub(crate) conn: &'a DatabaseConnection,
}

impl std::fmt::Debug for DbConn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConn").finish_non_exhaustive()
    }
}

/// Transactional runner, only reachable inside a transaction closure.
pub struct DbTx<'a> {
    pub(crate) tx: &'a DatabaseTransaction,
}

impl std::fmt::Debug for DbTx<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbTx").finish_non_exhaustive()
    }
}
