//! Permission matrix: `(role, entity, feature)` to rule, with per-organization
//! overrides.

use std::collections::HashMap;

use authz_resolver_sdk::{
    DataFlag, EntityKind, Feature, PermissionRule, RuleKey, RuleLevel,
};
use rb_security::Role;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("duplicate rule for {key}{}", .organization_id.map(|o| format!(" (organization {o})")).unwrap_or_default())]
    DuplicateRule {
        key: RuleKey,
        organization_id: Option<i64>,
    },
}

/// Immutable rule set. Built once through [`PermissionMatrixBuilder`] and
/// replaced wholesale when amended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionMatrix {
    defaults: HashMap<RuleKey, PermissionRule>,
    overrides: HashMap<(i64, RuleKey), PermissionRule>,
}

impl PermissionMatrix {
    #[must_use]
    pub fn builder() -> PermissionMatrixBuilder {
        PermissionMatrixBuilder::default()
    }

    /// The rule for `(role, entity, feature)`; an organization override
    /// wins over the role default. `None` means deny.
    #[must_use]
    pub fn find_rule(
        &self,
        role: Role,
        entity: EntityKind,
        feature: Feature,
        organization_id: Option<i64>,
    ) -> Option<&PermissionRule> {
        let key = RuleKey::new(role, entity, feature);
        organization_id
            .and_then(|org| self.overrides.get(&(org, key)))
            .or_else(|| self.defaults.get(&key))
    }

    /// Number of rules, overrides included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defaults.len() + self.overrides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a builder holding every current rule, for amendments.
    #[must_use]
    pub fn to_builder(&self) -> PermissionMatrixBuilder {
        PermissionMatrixBuilder {
            matrix: self.clone(),
        }
    }
}

/// Accumulates rules and rejects a second rule for the same key.
#[derive(Debug, Default)]
pub struct PermissionMatrixBuilder {
    matrix: PermissionMatrix,
}

impl PermissionMatrixBuilder {
    /// Add a role-default rule.
    ///
    /// # Errors
    /// [`MatrixError::DuplicateRule`] when `key` already has a default.
    pub fn rule(&mut self, key: RuleKey, rule: PermissionRule) -> Result<&mut Self, MatrixError> {
        if self.matrix.defaults.contains_key(&key) {
            return Err(MatrixError::DuplicateRule {
                key,
                organization_id: None,
            });
        }
        self.matrix.defaults.insert(key, rule);
        Ok(self)
    }

    /// Add an organization override.
    ///
    /// # Errors
    /// [`MatrixError::DuplicateRule`] when the organization already overrides `key`.
    pub fn org_override(
        &mut self,
        organization_id: i64,
        key: RuleKey,
        rule: PermissionRule,
    ) -> Result<&mut Self, MatrixError> {
        if self.matrix.overrides.contains_key(&(organization_id, key)) {
            return Err(MatrixError::DuplicateRule {
                key,
                organization_id: Some(organization_id),
            });
        }
        self.matrix.overrides.insert((organization_id, key), rule);
        Ok(self)
    }

    /// Route to [`rule`](Self::rule) or [`org_override`](Self::org_override).
    ///
    /// # Errors
    /// See those methods.
    pub fn add(
        &mut self,
        organization_id: Option<i64>,
        key: RuleKey,
        rule: PermissionRule,
    ) -> Result<&mut Self, MatrixError> {
        match organization_id {
            Some(org) => self.org_override(org, key, rule),
            None => self.rule(key, rule),
        }
    }

    #[must_use]
    pub fn build(self) -> PermissionMatrix {
        self.matrix
    }
}

const ALL_FLAGS: [DataFlag; 3] = [
    DataFlag::DataJustice,
    DataFlag::DataFinances,
    DataFlag::DataOwner,
];

fn allow(level: RuleLevel, flags: &[DataFlag]) -> PermissionRule {
    flags
        .iter()
        .fold(PermissionRule::allow(level), |rule, flag| rule.with_flag(*flag, true))
}

/// The rules seeded at setup.
///
/// National admins act everywhere and see everything. Other roles act within
/// their local scope; interveners only read towns of their département and
/// can never delete.
///
/// # Errors
/// [`MatrixError::DuplicateRule`] if the seed table names a key twice.
pub fn default_matrix() -> Result<PermissionMatrix, MatrixError> {
    use EntityKind::{CovidComment, Plan, Shantytown, ShantytownComment, User};
    use Feature::{Create, Delete, Export, List, Moderate, Read, Update};
    use RuleLevel::{Departement, Local, Nation};

    let mut b = PermissionMatrix::builder();

    for entity in EntityKind::ALL {
        for feature in Feature::ALL {
            b.rule(
                RuleKey::new(Role::NationalAdmin, entity, feature),
                allow(Nation, &ALL_FLAGS),
            )?;
        }
    }

    let justice_owner = [DataFlag::DataJustice, DataFlag::DataOwner];
    let seeds: &[(Role, EntityKind, &[Feature], PermissionRule)] = &[
        (
            Role::LocalAdmin,
            Shantytown,
            &[List, Read, Create, Update, Delete, Export],
            allow(Local, &justice_owner),
        ),
        (
            Role::LocalAdmin,
            ShantytownComment,
            &[List, Read, Create, Moderate],
            allow(Local, &[]),
        ),
        (Role::LocalAdmin, CovidComment, &[List, Read, Create], allow(Local, &[])),
        (
            Role::LocalAdmin,
            Plan,
            &[List, Read, Create, Update, Delete],
            allow(Local, &[DataFlag::DataFinances]),
        ),
        (Role::LocalAdmin, User, &[List, Read, Create, Update], allow(Local, &[])),
        (
            Role::DirectCollaborator,
            Shantytown,
            &[List, Read, Create, Update, Export],
            allow(Local, &justice_owner),
        ),
        (
            Role::DirectCollaborator,
            ShantytownComment,
            &[List, Read, Create],
            allow(Local, &[]),
        ),
        (Role::DirectCollaborator, CovidComment, &[List, Read, Create], allow(Local, &[])),
        (
            Role::DirectCollaborator,
            Plan,
            &[List, Read],
            allow(Local, &[DataFlag::DataFinances]),
        ),
        (Role::DirectCollaborator, User, &[List, Read], allow(Local, &[])),
        (
            Role::Association,
            Shantytown,
            &[List, Read, Create, Update],
            allow(Local, &[DataFlag::DataOwner]),
        ),
        (Role::Association, ShantytownComment, &[List, Read, Create], allow(Local, &[])),
        (Role::Association, CovidComment, &[List, Read, Create], allow(Local, &[])),
        (Role::Association, Plan, &[List, Read, Update], allow(Local, &[])),
        (Role::Association, User, &[Read], allow(Local, &[])),
        (Role::Intervener, Shantytown, &[List, Read], allow(Departement, &[])),
        (Role::Intervener, Shantytown, &[Delete], PermissionRule::deny()),
        (Role::Intervener, ShantytownComment, &[List, Read, Create], allow(Local, &[])),
        (Role::Intervener, Plan, &[List, Read], allow(Local, &[])),
        (Role::Intervener, User, &[Read], allow(Local, &[])),
    ];

    for (role, entity, features, rule) in seeds {
        for feature in *features {
            b.rule(RuleKey::new(*role, *entity, *feature), rule.clone())?;
        }
    }

    Ok(b.build())
}
