use authz_resolver_sdk::EnforcerError;
use geography_sdk::GeographyError;
use rb_db::DbError;
use rb_db::secure::ScopeError;
use sea_orm::SqlErr;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// The plan already covers a département of another region.
    #[error(
        "plan {plan_id}: departement '{departement_code}' is in region '{found_region}', \
         the plan covers region '{expected_region}'"
    )]
    RegionMismatch {
        plan_id: i64,
        departement_code: String,
        expected_region: String,
        found_region: String,
    },

    #[error(transparent)]
    Geography(#[from] GeographyError),

    #[error("plan {0} not found")]
    PlanNotFound(i64),

    #[error("plan {plan_id} does not cover departement '{departement_code}'")]
    TerritoryNotAttached {
        plan_id: i64,
        departement_code: String,
    },

    #[error("validation error on field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authentication required")]
    Unauthenticated,

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

impl From<EnforcerError> for DomainError {
    fn from(e: EnforcerError) -> Self {
        match e {
            EnforcerError::Unauthenticated => Self::Unauthenticated,
            EnforcerError::Unauthorized { .. } | EnforcerError::CompileFailed(_) => {
                Self::Forbidden(e.deny_code().map_or_else(|| e.to_string(), str::to_owned))
            }
            EnforcerError::EvaluationFailed(_) => {
                tracing::error!(error = %e, "plan authorization failed");
                Self::Internal(e.to_string())
            }
        }
    }
}
