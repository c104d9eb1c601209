pub mod plan;
pub mod plan_territory;
