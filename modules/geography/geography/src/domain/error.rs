use geography_sdk::GeographyError;
use rb_db::DbError;
use rb_db::secure::ScopeError;
use rb_security::GeographicLevel;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("dangling {pointer} reference '{code}'")]
    DanglingReference {
        pointer: GeographicLevel,
        code: String,
    },

    #[error("invalid geography dataset: {0}")]
    InvalidDataset(String),

    #[error("geography dataset unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl From<ScopeError> for DomainError {
    fn from(e: ScopeError) -> Self {
        match e {
            ScopeError::Db(db) => Self::Database(DbError::Sea(db)),
            ScopeError::Invalid(msg) | ScopeError::Denied(msg) => {
                Self::Unavailable(msg.to_owned())
            }
        }
    }
}

impl From<GeographyError> for DomainError {
    fn from(e: GeographyError) -> Self {
        match e {
            GeographyError::DanglingReference { pointer, code } => {
                Self::DanglingReference { pointer, code }
            }
            GeographyError::InvalidDataset(msg) => Self::InvalidDataset(msg),
            GeographyError::Unavailable(msg) | GeographyError::Internal(msg) => {
                Self::Unavailable(msg)
            }
        }
    }
}

impl From<DomainError> for GeographyError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::DanglingReference { pointer, code } => {
                Self::DanglingReference { pointer, code }
            }
            DomainError::InvalidDataset(msg) => Self::InvalidDataset(msg),
            DomainError::Unavailable(msg) => Self::Unavailable(msg),
            DomainError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}
