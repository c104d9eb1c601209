//! Constraint types for authorization decisions.
//!
//! Constraints are the row-level filters the PDP returns for list requests.
//! The PEP compiler turns them into an `AccessScope`.
//!
//! Only `Eq` and `In` predicates exist: a geographic authority is always one
//! region (as the set of its départements), département, EPCI or city.

use crate::pep::IntoPropertyValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A constraint on resource properties.
///
/// Multiple constraints within a response are `ORed`. A constraint with no
/// predicates matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// All predicates are `ANDed`.
    pub predicates: Vec<Predicate>,
}

impl Constraint {
    /// The constraint that filters nothing (national authority).
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn single(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
        }
    }
}

/// A predicate comparing a resource property to a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Equality: `resource_property = value`
    Eq(EqPredicate),
    /// Set membership: `resource_property IN (values)`
    In(InPredicate),
}

/// Equality predicate: `property = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqPredicate {
    /// Resource property name (e.g. `pep_properties::CITY_CODE`).
    pub property: String,
    pub value: Value,
}

impl EqPredicate {
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl IntoPropertyValue) -> Self {
        Self {
            property: property.into(),
            value: value.into_filter_value(),
        }
    }
}

/// Set membership predicate: `property IN (values)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InPredicate {
    /// Resource property name (e.g. `pep_properties::DEPARTEMENT_CODE`).
    pub property: String,
    pub values: Vec<Value>,
}

impl InPredicate {
    #[must_use]
    pub fn new<V: IntoPropertyValue>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            property: property.into(),
            values: values
                .into_iter()
                .map(IntoPropertyValue::into_filter_value)
                .collect(),
        }
    }
}
