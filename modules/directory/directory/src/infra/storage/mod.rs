pub mod entity;
pub mod migrations;
pub mod sea_orm_repo;

pub use migrations::Migrator;
