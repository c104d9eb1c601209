use std::fmt;

/// A scalar value for scope filtering.
///
/// Geographic codes are strings (`"75"`, `"2A"`, `"75056"`). Integer values
/// cover serial row identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeValue {
    /// String value (region, département, EPCI or city codes).
    String(String),
    /// Integer value (row identifiers).
    Int(i64),
    /// Boolean value.
    Bool(bool),
}

impl ScopeValue {
    /// Borrow the value as a string slice when it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for ScopeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<String> for ScopeValue {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ScopeValue {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<&String> for ScopeValue {
    #[inline]
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i64> for ScopeValue {
    #[inline]
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for ScopeValue {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Well-known authorization property names.
///
/// Shared between the PEP compiler and the ORM condition builder
/// (`ScopableEntity::resolve_property()`).
pub mod pep_properties {
    /// Region code of the row. Typically maps to a `region_code` column.
    pub const REGION_CODE: &str = "region_code";

    /// Département code of the row. Typically maps to a `departement_code` column.
    pub const DEPARTEMENT_CODE: &str = "departement_code";

    /// EPCI code of the row. Typically maps to an `epci_code` column.
    pub const EPCI_CODE: &str = "epci_code";

    /// City code of the row. Typically maps to a `city_code` column.
    pub const CITY_CODE: &str = "city_code";

    /// Resource identity property. Typically maps to the primary key column.
    pub const RESOURCE_ID: &str = "id";

    /// All geographic properties, broadest first.
    pub const GEOGRAPHIC: &[&str] = &[REGION_CODE, DEPARTEMENT_CODE, EPCI_CODE, CITY_CODE];
}

/// A single scope filter: a typed predicate on a named resource property.
///
/// The property name (e.g. `"departement_code"`) is an authorization concept.
/// Mapping to DB columns is done by `ScopableEntity::resolve_property()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Equality: `property = value`.
    Eq(EqScopeFilter),
    /// Set membership: `property IN (values)`.
    In(InScopeFilter),
}

/// Equality scope filter: `property = value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EqScopeFilter {
    property: String,
    value: ScopeValue,
}

/// Set membership scope filter: `property IN (values)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InScopeFilter {
    property: String,
    values: Vec<ScopeValue>,
}

impl EqScopeFilter {
    /// Create an equality scope filter.
    #[must_use]
    pub fn new(property: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// The authorization property name.
    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The filter value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &ScopeValue {
        &self.value
    }
}

impl InScopeFilter {
    /// Create a set membership scope filter.
    #[must_use]
    pub fn new(property: impl Into<String>, values: Vec<ScopeValue>) -> Self {
        Self {
            property: property.into(),
            values,
        }
    }

    /// Create from an iterator of convertible values.
    #[must_use]
    pub fn from_values<V: Into<ScopeValue>>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            property: property.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The authorization property name.
    #[inline]
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The filter values.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[ScopeValue] {
        &self.values
    }
}

impl ScopeFilter {
    /// Create an equality filter (`property = value`).
    #[must_use]
    pub fn eq(property: impl Into<String>, value: impl Into<ScopeValue>) -> Self {
        Self::Eq(EqScopeFilter::new(property, value))
    }

    /// Create a set membership filter (`property IN (values)`).
    #[must_use]
    pub fn r#in(property: impl Into<String>, values: Vec<ScopeValue>) -> Self {
        Self::In(InScopeFilter::new(property, values))
    }

    /// Create a set membership filter from string codes.
    #[must_use]
    pub fn in_codes<S: Into<String>>(
        property: impl Into<String>,
        codes: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::In(InScopeFilter::from_values(
            property,
            codes.into_iter().map(|c| ScopeValue::String(c.into())),
        ))
    }

    /// The authorization property name.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Eq(f) => f.property(),
            Self::In(f) => f.property(),
        }
    }

    /// Uniform view over the filter values.
    #[must_use]
    pub fn values(&self) -> ScopeFilterValues<'_> {
        match self {
            Self::Eq(f) => ScopeFilterValues::Single(&f.value),
            Self::In(f) => ScopeFilterValues::Multiple(&f.values),
        }
    }

    /// Returns `true` when a row whose `property` equals `value` passes this filter.
    #[must_use]
    pub fn matches(&self, property: &str, value: &ScopeValue) -> bool {
        self.property() == property && self.values().contains(value)
    }
}

/// Iterator adapter for [`ScopeFilter::values()`].
#[derive(Clone, Debug)]
pub enum ScopeFilterValues<'a> {
    /// Single value from an `Eq` filter.
    Single(&'a ScopeValue),
    /// Multiple values from an `In` filter.
    Multiple(&'a [ScopeValue]),
}

impl<'a> ScopeFilterValues<'a> {
    /// Returns an iterator over the values.
    #[must_use]
    pub fn iter(&self) -> ScopeFilterValuesIter<'a> {
        match self {
            Self::Single(v) => ScopeFilterValuesIter::Single(Some(v)),
            Self::Multiple(vs) => ScopeFilterValuesIter::Multiple(vs.iter()),
        }
    }

    /// Returns `true` if any value equals `value`.
    #[must_use]
    pub fn contains(&self, value: &ScopeValue) -> bool {
        self.iter().any(|v| v == value)
    }
}

impl<'a> IntoIterator for ScopeFilterValues<'a> {
    type Item = &'a ScopeValue;
    type IntoIter = ScopeFilterValuesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &ScopeFilterValues<'a> {
    type Item = &'a ScopeValue;
    type IntoIter = ScopeFilterValuesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`ScopeFilterValues`].
pub enum ScopeFilterValuesIter<'a> {
    /// Yields a single value.
    Single(Option<&'a ScopeValue>),
    /// Yields from a slice.
    Multiple(std::slice::Iter<'a, ScopeValue>),
}

impl<'a> Iterator for ScopeFilterValuesIter<'a> {
    type Item = &'a ScopeValue;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Single(v) => v.take(),
            Self::Multiple(iter) => iter.next(),
        }
    }
}

/// A conjunction (AND) of scope filters: one access path.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeConstraint {
    filters: Vec<ScopeFilter>,
}

impl ScopeConstraint {
    /// Create a new scope constraint from a list of filters.
    #[must_use]
    pub fn new(filters: Vec<ScopeFilter>) -> Self {
        Self { filters }
    }

    /// The filters in this constraint (AND-ed together).
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &[ScopeFilter] {
        &self.filters
    }

    /// Returns `true` if this constraint has no filters.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// A disjunction (OR) of scope constraints defining what data is accessible.
///
/// Each constraint is an independent access path (OR-ed). Filters within a
/// constraint are AND-ed. An unconstrained scope bypasses row-level filtering,
/// which is what a national authority compiles to.
///
/// # Examples
///
/// ```
/// use rb_security::access_scope::{AccessScope, pep_properties};
///
/// // deny-all (default)
/// let scope = AccessScope::default();
/// assert!(scope.is_deny_all());
///
/// // one département
/// let scope = AccessScope::for_departement("75");
/// assert!(!scope.is_deny_all());
/// assert!(scope.contains_code(pep_properties::DEPARTEMENT_CODE, "75"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AccessScope {
    constraints: Vec<ScopeConstraint>,
    unconstrained: bool,
}

impl Default for AccessScope {
    /// Default is deny-all: no constraints and not unconstrained.
    fn default() -> Self {
        Self::deny_all()
    }
}

impl AccessScope {
    // ── Constructors ────────────────────────────────────────────────

    /// Create an access scope from a list of constraints (OR-ed).
    #[must_use]
    pub fn from_constraints(constraints: Vec<ScopeConstraint>) -> Self {
        Self {
            constraints,
            unconstrained: false,
        }
    }

    /// Create an access scope with a single constraint.
    #[must_use]
    pub fn single(constraint: ScopeConstraint) -> Self {
        Self::from_constraints(vec![constraint])
    }

    /// Create an "allow all" (unconstrained) scope.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            constraints: Vec::new(),
            unconstrained: true,
        }
    }

    /// Create a "deny all" scope (no access).
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            constraints: Vec::new(),
            unconstrained: false,
        }
    }

    // ── Convenience constructors ────────────────────────────────────

    /// Scope limited to a set of départements.
    #[must_use]
    pub fn for_departements<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self::single(ScopeConstraint::new(vec![ScopeFilter::in_codes(
            pep_properties::DEPARTEMENT_CODE,
            codes,
        )]))
    }

    /// Scope limited to one département.
    #[must_use]
    pub fn for_departement(code: &str) -> Self {
        Self::single(ScopeConstraint::new(vec![ScopeFilter::eq(
            pep_properties::DEPARTEMENT_CODE,
            code,
        )]))
    }

    /// Scope limited to one EPCI.
    #[must_use]
    pub fn for_epci(code: &str) -> Self {
        Self::single(ScopeConstraint::new(vec![ScopeFilter::eq(
            pep_properties::EPCI_CODE,
            code,
        )]))
    }

    /// Scope limited to one city.
    #[must_use]
    pub fn for_city(code: &str) -> Self {
        Self::single(ScopeConstraint::new(vec![ScopeFilter::eq(
            pep_properties::CITY_CODE,
            code,
        )]))
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The constraints in this scope (OR-ed).
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &[ScopeConstraint] {
        &self.constraints
    }

    /// Returns `true` if this scope is unconstrained (allow-all).
    #[inline]
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }

    /// Returns `true` if this scope denies all access.
    ///
    /// A scope is deny-all when it is not unconstrained and has no constraints.
    #[must_use]
    pub fn is_deny_all(&self) -> bool {
        !self.unconstrained && self.constraints.is_empty()
    }

    /// Check if any constraint has a filter matching the given property and value.
    #[must_use]
    pub fn contains_value(&self, property: &str, value: &ScopeValue) -> bool {
        self.constraints
            .iter()
            .any(|c| c.filters().iter().any(|f| f.matches(property, value)))
    }

    /// Check if any constraint has a filter matching the given property and code.
    #[must_use]
    pub fn contains_code(&self, property: &str, code: &str) -> bool {
        self.contains_value(property, &ScopeValue::from(code))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    // --- ScopeFilter::Eq ---

    #[test]
    fn scope_filter_eq_constructor() {
        let f = ScopeFilter::eq(pep_properties::DEPARTEMENT_CODE, "75");
        assert_eq!(f.property(), pep_properties::DEPARTEMENT_CODE);
        assert!(matches!(f, ScopeFilter::Eq(_)));
        assert!(f.values().contains(&ScopeValue::from("75")));
    }

    #[test]
    fn in_codes_collects_every_code() {
        let f = ScopeFilter::in_codes(pep_properties::DEPARTEMENT_CODE, ["75", "92", "93"]);
        let values: Vec<_> = f.values().iter().filter_map(ScopeValue::as_str).collect();
        assert_eq!(values, ["75", "92", "93"]);
    }

    #[test]
    fn contains_code_respects_property() {
        let scope = AccessScope::for_city("75056");
        assert!(scope.contains_code(pep_properties::CITY_CODE, "75056"));
        assert!(!scope.contains_code(pep_properties::DEPARTEMENT_CODE, "75056"));
        assert!(!scope.contains_code(pep_properties::CITY_CODE, "13055"));
    }

    #[test]
    fn default_is_deny_all_and_allow_all_is_unconstrained() {
        assert!(AccessScope::default().is_deny_all());
        let all = AccessScope::allow_all();
        assert!(all.is_unconstrained());
        assert!(!all.is_deny_all());
        assert!(all.constraints().is_empty());
    }

    #[test]
    fn for_departements_builds_in_filter() {
        let scope = AccessScope::for_departements(["75", "92"]);
        assert_eq!(
            scope.constraints()[0].filters()[0].property(),
            pep_properties::DEPARTEMENT_CODE
        );
        assert!(matches!(
            scope.constraints()[0].filters()[0],
            ScopeFilter::In(_)
        ));
    }
}
