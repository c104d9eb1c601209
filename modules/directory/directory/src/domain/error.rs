use geography_sdk::GeographyError;
use rb_db::DbError;
use rb_db::secure::ScopeError;
use rb_security::InvalidGeoScope;
use sea_orm::SqlErr;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// The candidate location sets more than one geo pointer.
    #[error(transparent)]
    InvalidGeoScope(#[from] InvalidGeoScope),

    /// The location names a row missing from the geography.
    #[error(transparent)]
    Geography(#[from] GeographyError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("validation error on field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("access forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<ScopeError> for DomainError {
    fn from(e: ScopeError) -> Self {
        match e {
            ScopeError::Denied(msg) => Self::Forbidden(msg.to_owned()),
            ScopeError::Invalid(msg) => Self::Internal(format!("scope invalid: {msg}")),
            ScopeError::Db(db) => match db.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Conflict(msg),
                _ => Self::Database(DbError::Sea(db)),
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rb_security::GeographicLevel;

    #[test]
    fn denied_scope_is_forbidden() {
        let e = DomainError::from(ScopeError::Denied("outside"));
        assert!(matches!(e, DomainError::Forbidden(msg) if msg == "outside"));
    }

    #[test]
    fn plain_db_error_stays_a_database_error() {
        let e = DomainError::from(ScopeError::Db(sea_orm::DbErr::Custom("boom".to_owned())));
        assert!(matches!(e, DomainError::Database(DbError::Sea(_))));
    }

    #[test]
    fn invalid_geo_scope_keeps_its_message() {
        let e = DomainError::from(InvalidGeoScope {
            set: vec![GeographicLevel::Region, GeographicLevel::City],
        });
        assert_eq!(e.to_string(), "at most one geo pointer may be set, found: region, city");
    }
}
