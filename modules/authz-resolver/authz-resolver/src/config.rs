//! Configuration for the `AuthZ` resolver.

use std::collections::BTreeMap;

use authz_resolver_sdk::{DataFlag, EntityKind, Feature, PermissionRule, RuleKey, RuleLevel};
use geography_sdk::ResolvedScope;
use rb_security::{GeographicLevel, Role};
use serde::{Deserialize, Serialize};

/// How far a `local` rule reaches from the principal's own scope.
///
/// The principal's scope is widened to the anchor, never narrowed: a region
/// principal anchored at `departement` keeps its region, a nation principal
/// keeps the nation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalAnchor {
    #[default]
    Region,
    Departement,
    /// The principal's own resolved scope, unchanged.
    Own,
}

impl LocalAnchor {
    const fn level(self) -> GeographicLevel {
        match self {
            Self::Region => GeographicLevel::Region,
            Self::Departement => GeographicLevel::Departement,
            Self::Own => GeographicLevel::City,
        }
    }

    /// The authority a `local` rule grants to `principal`.
    #[must_use]
    pub fn anchor(self, principal: &ResolvedScope) -> Option<ResolvedScope> {
        principal.widen_to(principal.level.broadest(self.level()))
    }
}

/// A rule supplied through configuration.
///
/// With `organization_id` it overrides the role default for that
/// organization; without it, it adds a role default. Either way a second
/// rule for the same key is rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverride {
    pub role: Role,
    pub entity: EntityKind,
    pub feature: Feature,
    #[serde(default)]
    pub organization_id: Option<i64>,
    pub allowed: bool,
    pub geographic_level: RuleLevel,
    #[serde(default)]
    pub data_flags: BTreeMap<DataFlag, bool>,
}

impl RuleOverride {
    #[must_use]
    pub fn key(&self) -> RuleKey {
        RuleKey::new(self.role, self.entity, self.feature)
    }

    #[must_use]
    pub fn rule(&self) -> PermissionRule {
        PermissionRule {
            allowed: self.allowed,
            geographic_level: self.geographic_level,
            data_flags: self.data_flags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthZResolverConfig {
    pub local_anchor: LocalAnchor,
    pub overrides: Vec<RuleOverride>,
}
