use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
}

/// One département covered by a plan. `region_code` is the département's
/// region, identical across the rows of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanTerritory {
    pub plan_id: i64,
    pub departement_code: String,
    pub region_code: String,
}
