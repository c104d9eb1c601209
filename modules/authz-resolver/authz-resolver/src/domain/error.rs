//! Domain errors for the `AuthZ` resolver.

use authz_resolver_sdk::AuthZResolverError;
use geography_sdk::GeographyError;

use super::matrix::MatrixError;

#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("geography: {0}")]
    Geography(#[from] GeographyError),

    #[error("permission matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthZResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Geography(g @ GeographyError::DanglingReference { .. }) => {
                Self::InvalidScope(g.to_string())
            }
            DomainError::Geography(GeographyError::Unavailable(msg)) => {
                Self::ServiceUnavailable(msg)
            }
            DomainError::Geography(g) => Self::Internal(g.to_string()),
            DomainError::Matrix(m) => Self::Internal(m.to_string()),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}
