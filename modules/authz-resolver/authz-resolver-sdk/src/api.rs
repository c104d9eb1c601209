//! Public API trait for the `AuthZ` resolver.

use async_trait::async_trait;

use crate::error::AuthZResolverError;
use crate::models::{EvaluationRequest, EvaluationResponse};

/// Public API trait for the `AuthZ` resolver (the PDP).
///
/// Consumed by modules acting as PEPs, usually through
/// [`PolicyEnforcer`](crate::PolicyEnforcer):
///
/// ```ignore
/// let response = authz.evaluate(request).await?;
/// ```
#[async_trait]
pub trait AuthZResolverClient: Send + Sync {
    /// Evaluate an authorization request.
    ///
    /// Denials are expressed as `decision == false`, not as errors.
    ///
    /// # Errors
    ///
    /// - `InvalidScope` when the principal's or the target's geography
    ///   cannot be resolved
    /// - `ServiceUnavailable` if the resolver is not ready
    /// - `Internal` for unexpected errors
    async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResponse, AuthZResolverError>;
}
