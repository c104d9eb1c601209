//! Domain models for the `AuthZ` resolver module.
//!
//! Permission rules are keyed by closed enums; a request names a subject, the
//! entity kind and feature it wants, and optionally the target's location.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rb_security::{GeoPointer, GeographicLevel, Role};
use serde::{Deserialize, Serialize};

use crate::constraints::Constraint;

/// A string that names no variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

fn parse_variant<T: Copy>(
    all: &[T],
    as_str: impl Fn(T) -> &'static str,
    kind: &'static str,
    s: &str,
) -> Result<T, UnknownVariant> {
    all.iter()
        .copied()
        .find(|v| as_str(*v) == s)
        .ok_or_else(|| UnknownVariant {
            kind,
            value: s.to_owned(),
        })
}

/// Kinds of business objects the gate protects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Shantytown,
    ShantytownComment,
    CovidComment,
    Plan,
    User,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::Shantytown,
        Self::ShantytownComment,
        Self::CovidComment,
        Self::Plan,
        Self::User,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shantytown => "shantytown",
            Self::ShantytownComment => "shantytown_comment",
            Self::CovidComment => "covid_comment",
            Self::Plan => "plan",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "entity", s)
    }
}

/// Operations on an entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    List,
    Read,
    Create,
    Update,
    Delete,
    Moderate,
    Export,
}

impl Feature {
    pub const ALL: [Self; 7] = [
        Self::List,
        Self::Read,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Moderate,
        Self::Export,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Moderate => "moderate",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(&Self::ALL, Self::as_str, "feature", s)
    }
}

/// Geographic reach of a rule.
///
/// A fixed level widens the principal's scope to that level; `Local` keeps
/// the principal's own scope widened to the configured local anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleLevel {
    Nation,
    Region,
    Departement,
    Epci,
    City,
    Local,
}

impl RuleLevel {
    /// The fixed geographic level, `None` for `Local`.
    #[must_use]
    pub const fn fixed(self) -> Option<GeographicLevel> {
        match self {
            Self::Nation => Some(GeographicLevel::Nation),
            Self::Region => Some(GeographicLevel::Region),
            Self::Departement => Some(GeographicLevel::Departement),
            Self::Epci => Some(GeographicLevel::Epci),
            Self::City => Some(GeographicLevel::City),
            Self::Local => None,
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed() {
            Some(level) => write!(f, "{level}"),
            None => f.write_str("local"),
        }
    }
}

/// Sensitive data categories a rule may reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFlag {
    DataJustice,
    DataFinances,
    DataOwner,
}

/// Composite key of the permission matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey {
    pub role: Role,
    pub entity: EntityKind,
    pub feature: Feature,
}

impl RuleKey {
    #[must_use]
    pub const fn new(role: Role, entity: EntityKind, feature: Feature) -> Self {
        Self {
            role,
            entity,
            feature,
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.entity, self.feature)
    }
}

/// What a role may do with an entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionRule {
    pub allowed: bool,
    pub geographic_level: RuleLevel,
    #[serde(default)]
    pub data_flags: BTreeMap<DataFlag, bool>,
}

impl PermissionRule {
    /// An allowing rule reaching `level`, revealing no flagged data.
    #[must_use]
    pub fn allow(level: RuleLevel) -> Self {
        Self {
            allowed: true,
            geographic_level: level,
            data_flags: BTreeMap::new(),
        }
    }

    /// An explicit refusal.
    #[must_use]
    pub fn deny() -> Self {
        Self {
            allowed: false,
            geographic_level: RuleLevel::Local,
            data_flags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_flag(mut self, flag: DataFlag, visible: bool) -> Self {
        self.data_flags.insert(flag, visible);
        self
    }
}

/// Machine-readable deny codes carried by [`DenyReason::error_code`].
pub mod deny_codes {
    /// No rule for `(role, entity, feature)`.
    pub const NO_MATCHING_RULE: &str = "no_matching_rule";
    /// The matching rule has `allowed = false`.
    pub const RULE_DENIES: &str = "rule_denies";
    /// The principal sits above the rule's level and cannot be narrowed to it.
    pub const SCOPE_NOT_APPLICABLE: &str = "scope_not_applicable";
    /// The target lies outside the principal's authority.
    pub const OUT_OF_SCOPE: &str = "out_of_scope";
}

/// Reason for an explicit deny from the PDP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyReason {
    /// Machine-readable error code (see [`deny_codes`]).
    pub error_code: String,
    /// Human-readable details (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl DenyReason {
    #[must_use]
    pub fn new(error_code: &str, details: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_owned(),
            details: Some(details.into()),
        }
    }
}

/// The authenticated principal making the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub role: Role,
    /// Selects organization-specific rule overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    /// The principal's stored geo pointer.
    #[serde(default)]
    pub location: GeoPointer,
}

/// Authorization evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub subject: Subject,
    pub entity: EntityKind,
    pub feature: Feature,
    /// Location of the single object being accessed. `None` for list
    /// requests and creations without a target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<GeoPointer>,
    pub context: EvaluationRequestContext,
}

/// Additional evaluation request context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationRequestContext {
    /// Whether the PDP should return row-level constraints.
    /// - `true` for list queries (need scope filtering)
    /// - `false` for single-object checks (just need decision)
    #[serde(default)]
    pub require_constraints: bool,
    /// Properties the PEP can filter on.
    #[serde(default)]
    pub supported_properties: Vec<String>,
}

/// Authorization evaluation response context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponseContext {
    /// Row-level constraints (OR-ed) when `decision` is `true` and
    /// constraints were requested. A constraint without predicates means
    /// unrestricted.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Reason for denial (present when `decision` is `false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_reason: Option<DenyReason>,
    /// Data categories the rule reveals (present when `decision` is `true`).
    #[serde(default)]
    pub data_flags: BTreeMap<DataFlag, bool>,
}

/// Authorization evaluation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub decision: bool,
    #[serde(default)]
    pub context: EvaluationResponseContext,
}

impl EvaluationResponse {
    #[must_use]
    pub fn deny(reason: DenyReason) -> Self {
        Self {
            decision: false,
            context: EvaluationResponseContext {
                deny_reason: Some(reason),
                ..Default::default()
            },
        }
    }
}

/// Outcome of a single-object check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub visible_data_flags: BTreeMap<DataFlag, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_reason: Option<DenyReason>,
}

impl Decision {
    /// `true` only when the flag is present and set.
    #[must_use]
    pub fn can_see(&self, flag: DataFlag) -> bool {
        self.allowed && self.visible_data_flags.get(&flag).copied().unwrap_or(false)
    }
}

impl From<EvaluationResponse> for Decision {
    fn from(r: EvaluationResponse) -> Self {
        if r.decision {
            Self {
                allowed: true,
                visible_data_flags: r.context.data_flags,
                deny_reason: None,
            }
        } else {
            Self {
                allowed: false,
                visible_data_flags: BTreeMap::new(),
                deny_reason: r.context.deny_reason,
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntityKind::ShantytownComment).unwrap(),
            r#""shantytown_comment""#
        );
        assert_eq!(
            serde_json::to_string(&DataFlag::DataFinances).unwrap(),
            r#""data_finances""#
        );
        assert_eq!(
            serde_json::from_str::<RuleLevel>(r#""local""#).unwrap(),
            RuleLevel::Local
        );
    }

    #[test]
    fn entity_and_feature_parse_from_str() {
        for e in EntityKind::ALL {
            assert_eq!(e.as_str().parse::<EntityKind>().unwrap(), e);
        }
        for f in Feature::ALL {
            assert_eq!(f.as_str().parse::<Feature>().unwrap(), f);
        }
        let err = "town".parse::<EntityKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown entity 'town'");
    }

    #[test]
    fn can_see_is_false_for_absent_flag() {
        let decision = Decision::from(EvaluationResponse {
            decision: true,
            context: EvaluationResponseContext {
                data_flags: BTreeMap::from([(DataFlag::DataJustice, true)]),
                ..Default::default()
            },
        });
        assert!(decision.can_see(DataFlag::DataJustice));
        assert!(!decision.can_see(DataFlag::DataOwner));
    }

    #[test]
    fn denied_decision_reveals_nothing() {
        let decision = Decision::from(EvaluationResponse::deny(DenyReason::new(
            deny_codes::OUT_OF_SCOPE,
            "target outside authority",
        )));
        assert!(!decision.allowed);
        assert!(!decision.can_see(DataFlag::DataJustice));
        assert_eq!(
            decision.deny_reason.map(|r| r.error_code),
            Some("out_of_scope".to_owned())
        );
    }

    #[test]
    fn rule_data_flags_serialize_as_map() {
        let rule = PermissionRule::allow(RuleLevel::Local).with_flag(DataFlag::DataOwner, true);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["data_flags"]["data_owner"], serde_json::json!(true));
        assert_eq!(json["geographic_level"], serde_json::json!("local"));
    }

    #[test]
    fn fixed_levels() {
        assert_eq!(RuleLevel::Region.fixed(), Some(GeographicLevel::Region));
        assert_eq!(RuleLevel::Local.fixed(), None);
        assert_eq!(
            RuleKey::new(Role::Association, EntityKind::Plan, Feature::Read).to_string(),
            "association/plan/read"
        );
    }
}
