//! Reference tables. Readable by every principal, so each entity is
//! unrestricted for scope checks but still maps its code columns.

pub mod city;
pub mod departement;
pub mod epci;
pub mod region;
