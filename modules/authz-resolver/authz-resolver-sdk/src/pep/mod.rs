//! PEP (Policy Enforcement Point) helpers.
//!
//! - [`PolicyEnforcer`]: PEP object (build, evaluate, compile)
//! - [`ResourceType`]: static descriptor for an entity kind and the
//!   properties its storage can filter on
//! - [`compile_to_access_scope`]: low-level, compiles an evaluation
//!   response into an `AccessScope`
//! - [`IntoPropertyValue`]: converts typed values into `serde_json::Value`

use serde_json::Value;

pub mod compiler;
pub mod enforcer;

pub use compiler::{ConstraintCompileError, compile_to_access_scope};
pub use enforcer::{EnforcerError, PolicyEnforcer, ResourceType};

/// Types that can be converted into `serde_json::Value` for predicates.
///
/// Post-compilation values are [`rb_security::ScopeValue`]s.
pub trait IntoPropertyValue {
    fn into_filter_value(self) -> Value;
}

impl IntoPropertyValue for String {
    #[inline]
    fn into_filter_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoPropertyValue for &String {
    #[inline]
    fn into_filter_value(self) -> Value {
        Value::String(self.clone())
    }
}

impl IntoPropertyValue for &str {
    #[inline]
    fn into_filter_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoPropertyValue for i64 {
    #[inline]
    fn into_filter_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoPropertyValue for bool {
    #[inline]
    fn into_filter_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoPropertyValue for Value {
    #[inline]
    fn into_filter_value(self) -> Value {
        self
    }
}
