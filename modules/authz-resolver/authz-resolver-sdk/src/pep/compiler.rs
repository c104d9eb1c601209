//! PEP constraint compiler.
//!
//! Compiles PDP evaluation responses into an `AccessScope` for the secure ORM.
//!
//! ## Compilation matrix (decision=true assumed)
//!
//! | `require_constraints` | constraints | Result |
//! |-------------------|-------------|--------|
//! | false             | empty       | `allow_all()` |
//! | false             | present     | compile |
//! | true              | empty       | `ConstraintsRequiredButAbsent` |
//! | true              | present     | compile |
//!
//! A constraint naming a property the PEP does not support is dropped
//! (fail-closed). When every constraint is dropped the compilation fails.
//! A constraint without predicates is the national authority: allow all.

use rb_security::{AccessScope, ScopeConstraint, ScopeFilter, ScopeValue};

use crate::constraints::{Constraint, Predicate};
use crate::models::EvaluationResponse;

#[derive(Debug, thiserror::Error)]
pub enum ConstraintCompileError {
    #[error("constraints required but PDP returned none (fail-closed)")]
    ConstraintsRequiredButAbsent,

    #[error("all constraints failed compilation (fail-closed): {reason}")]
    AllConstraintsFailed { reason: String },
}

/// Compile the constraints of an allowing response.
///
/// **Precondition:** `response.decision == true`.
///
/// # Errors
///
/// - `ConstraintsRequiredButAbsent` if constraints were required but empty
/// - `AllConstraintsFailed` if every constraint names an unsupported
///   property or carries an unsupported value
pub fn compile_to_access_scope(
    response: &EvaluationResponse,
    require_constraints: bool,
    supported_properties: &[&str],
) -> Result<AccessScope, ConstraintCompileError> {
    if response.context.constraints.is_empty() {
        if require_constraints {
            return Err(ConstraintCompileError::ConstraintsRequiredButAbsent);
        }
        return Ok(AccessScope::allow_all());
    }

    let mut constraints = Vec::new();
    let mut fail_reasons: Vec<String> = Vec::new();

    for constraint in &response.context.constraints {
        match compile_constraint(constraint, supported_properties) {
            Ok(sc) => constraints.push(sc),
            Err(reason) => {
                tracing::warn!(
                    reason = %reason,
                    "constraint dropped (fail-closed), possible PDP contract violation",
                );
                fail_reasons.push(reason);
            }
        }
    }

    if constraints.is_empty() {
        return Err(ConstraintCompileError::AllConstraintsFailed {
            reason: fail_reasons.join("; "),
        });
    }

    if constraints.iter().any(ScopeConstraint::is_empty) {
        return Ok(AccessScope::allow_all());
    }

    Ok(AccessScope::from_constraints(constraints))
}

fn compile_constraint(
    constraint: &Constraint,
    supported_properties: &[&str],
) -> Result<ScopeConstraint, String> {
    let mut filters = Vec::new();

    for predicate in &constraint.predicates {
        let (property, filter) = match predicate {
            Predicate::Eq(eq) => {
                let value = json_to_scope_value(&eq.value)?;
                (eq.property.as_str(), ScopeFilter::eq(&eq.property, value))
            }
            Predicate::In(p) => {
                let values: Vec<ScopeValue> = p
                    .values
                    .iter()
                    .map(json_to_scope_value)
                    .collect::<Result<_, _>>()?;
                (p.property.as_str(), ScopeFilter::r#in(&p.property, values))
            }
        };

        if !supported_properties.contains(&property) {
            return Err(format!("unsupported property: {property}"));
        }

        filters.push(filter);
    }

    Ok(ScopeConstraint::new(filters))
}

fn json_to_scope_value(v: &serde_json::Value) -> Result<ScopeValue, String> {
    match v {
        serde_json::Value::String(s) => Ok(ScopeValue::String(s.clone())),
        serde_json::Value::Number(n) => n.as_i64().map(ScopeValue::Int).ok_or_else(|| {
            format!("only integer JSON numbers are supported for scope filters, got: {n}")
        }),
        serde_json::Value::Bool(b) => Ok(ScopeValue::Bool(*b)),
        other => Err(format!(
            "unsupported JSON value type for scope filter: {other}"
        )),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::constraints::{EqPredicate, InPredicate};
    use crate::models::EvaluationResponseContext;
    use rb_security::pep_properties;
    use serde_json::json;

    const GEO: &[&str] = pep_properties::GEOGRAPHIC;

    fn allowed(constraints: Vec<Constraint>) -> EvaluationResponse {
        EvaluationResponse {
            decision: true,
            context: EvaluationResponseContext {
                constraints,
                ..Default::default()
            },
        }
    }

    #[test]
    fn no_require_constraints_empty_returns_allow_all() {
        let scope = compile_to_access_scope(&allowed(vec![]), false, GEO).unwrap();
        assert!(scope.is_unconstrained());
    }

    #[test]
    fn require_constraints_empty_fails_closed() {
        let err = compile_to_access_scope(&allowed(vec![]), true, GEO).unwrap_err();
        assert!(matches!(
            err,
            ConstraintCompileError::ConstraintsRequiredButAbsent
        ));
    }

    #[test]
    fn empty_constraint_is_national_authority() {
        let scope =
            compile_to_access_scope(&allowed(vec![Constraint::unrestricted()]), true, GEO).unwrap();
        assert!(scope.is_unconstrained());
    }

    #[test]
    fn regional_authority_compiles_to_departement_set() {
        let response = allowed(vec![Constraint::single(Predicate::In(InPredicate::new(
            pep_properties::DEPARTEMENT_CODE,
            ["75", "92", "93", "94"],
        )))]);
        let scope = compile_to_access_scope(&response, true, GEO).unwrap();
        assert!(scope.contains_code(pep_properties::DEPARTEMENT_CODE, "92"));
        assert!(!scope.contains_code(pep_properties::DEPARTEMENT_CODE, "13"));
    }

    #[test]
    fn unsupported_property_drops_only_that_constraint() {
        let response = allowed(vec![
            Constraint::single(Predicate::Eq(EqPredicate::new("owner_id", 7_i64))),
            Constraint::single(Predicate::Eq(EqPredicate::new(
                pep_properties::CITY_CODE,
                "75056",
            ))),
        ]);
        let scope = compile_to_access_scope(&response, true, GEO).unwrap();
        assert_eq!(scope.constraints().len(), 1);
        assert!(scope.contains_code(pep_properties::CITY_CODE, "75056"));
    }

    #[test]
    fn all_dropped_fails_closed() {
        let response = allowed(vec![Constraint::single(Predicate::Eq(EqPredicate::new(
            pep_properties::EPCI_CODE,
            "200054781",
        )))]);
        let err =
            compile_to_access_scope(&response, true, &[pep_properties::DEPARTEMENT_CODE])
                .unwrap_err();
        assert!(
            matches!(err, ConstraintCompileError::AllConstraintsFailed { reason } if reason.contains("epci_code"))
        );
    }

    #[test]
    fn float_values_are_rejected() {
        let response = allowed(vec![Constraint::single(Predicate::Eq(EqPredicate {
            property: pep_properties::CITY_CODE.to_owned(),
            value: json!(1.5),
        }))]);
        assert!(compile_to_access_scope(&response, true, GEO).is_err());
    }
}
