//! Error types for the `AuthZ` resolver module.

use thiserror::Error;

/// Errors that can occur when using the `AuthZ` resolver API.
///
/// These represent evaluation failures only. Access denial is expressed via
/// `EvaluationResponse.decision == false`, not as an error variant.
#[derive(Debug, Error)]
pub enum AuthZResolverError {
    /// A geo pointer of the principal or of the target could not be
    /// resolved (dangling reference). Never treated as "no scope".
    #[error("invalid geographic scope: {0}")]
    InvalidScope(String),

    /// The resolver is not ready.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
