/// Errors that can occur during scoped query execution.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    /// Database error occurred during query execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// Invalid scope usage.
    #[error("invalid scope: {0}")]
    Invalid(&'static str),

    /// Row values fall outside the current scope.
    #[error("access denied: {0}")]
    Denied(&'static str),
}
