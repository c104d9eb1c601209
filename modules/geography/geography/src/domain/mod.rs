pub mod error;
pub mod local_client;
pub mod resolver;
pub mod service;

pub use error::DomainError;
pub use service::Service;
