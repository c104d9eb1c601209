//! Transaction settings without `SeaORM` types.
//!
//! Services state the isolation they need (`TxConfig::serializable()` for the
//! plan-territory write path) and the conversion to `SeaORM` happens here.
//! `SQLite` ignores the level: its transactions are already serializable.

use sea_orm::IsolationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxIsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// `None` fields keep the backend default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxConfig {
    pub isolation: Option<TxIsolationLevel>,
}

impl TxConfig {
    #[must_use]
    pub fn with_isolation(isolation: TxIsolationLevel) -> Self {
        Self {
            isolation: Some(isolation),
        }
    }

    #[must_use]
    pub fn serializable() -> Self {
        Self::with_isolation(TxIsolationLevel::Serializable)
    }
}

impl From<TxIsolationLevel> for IsolationLevel {
    fn from(level: TxIsolationLevel) -> Self {
        match level {
            TxIsolationLevel::ReadUncommitted => IsolationLevel::ReadUncommitted,
            TxIsolationLevel::ReadCommitted => IsolationLevel::ReadCommitted,
            TxIsolationLevel::RepeatableRead => IsolationLevel::RepeatableRead,
            TxIsolationLevel::Serializable => IsolationLevel::Serializable,
        }
    }
}
