pub mod consistency;
pub mod error;
pub mod model;
pub mod service;
