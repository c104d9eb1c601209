#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Gate behaviour over the embedded reference geography.

use std::sync::Arc;

use authz_resolver::{AuthZResolverConfig, AuthZResolverModule, LocalAnchor, RuleOverride};
use authz_resolver_sdk::{
    DataFlag, EntityKind, EnforcerError, Feature, ResourceType, RuleLevel, deny_codes,
};
use geography::{GeographyModule, Service as GeographyService, embedded_snapshot};
use rb_security::{GeoPointer, Role, SecurityContext, pep_properties};
use tracing_test::traced_test;

const SHANTYTOWN: ResourceType = ResourceType {
    entity: EntityKind::Shantytown,
    supported_properties: pep_properties::GEOGRAPHIC,
};

fn geography() -> GeographyModule {
    GeographyModule::from_service(Arc::new(GeographyService::new(
        embedded_snapshot().unwrap(),
    )))
}

fn module(cfg: &AuthZResolverConfig) -> AuthZResolverModule {
    AuthZResolverModule::init(geography().client(), cfg).unwrap()
}

fn paris_association() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(1)
        .role(Role::Association)
        .organization_id(3)
        .location(GeoPointer::City("75056".to_owned()))
        .build()
}

#[tokio::test]
async fn city_principal_reads_within_region_only() {
    let enforcer = module(&AuthZResolverConfig::default()).enforcer();
    let ctx = paris_association();

    let in_92 = GeoPointer::Departement("92".to_owned());
    let decision = enforcer
        .require(&ctx, &SHANTYTOWN, Feature::Read, Some(&in_92))
        .await
        .unwrap();
    assert!(decision.can_see(DataFlag::DataOwner));
    assert!(!decision.can_see(DataFlag::DataJustice));

    let in_13 = GeoPointer::Departement("13".to_owned());
    let err = enforcer
        .require(&ctx, &SHANTYTOWN, Feature::Read, Some(&in_13))
        .await
        .unwrap_err();
    assert_eq!(err.deny_code(), Some(deny_codes::OUT_OF_SCOPE));
}

#[tokio::test]
async fn list_scope_is_the_departements_of_the_region() {
    let enforcer = module(&AuthZResolverConfig::default()).enforcer();
    let scope = enforcer
        .access_scope(&paris_association(), &SHANTYTOWN, Feature::List)
        .await
        .unwrap();
    for d in ["75", "92", "93", "94"] {
        assert!(scope.contains_code(pep_properties::DEPARTEMENT_CODE, d));
    }
    assert!(!scope.contains_code(pep_properties::DEPARTEMENT_CODE, "13"));
}

#[tokio::test]
async fn departement_anchor_narrows_local_rules() {
    let cfg = AuthZResolverConfig {
        local_anchor: LocalAnchor::Departement,
        overrides: Vec::new(),
    };
    let enforcer = module(&cfg).enforcer();
    let decision = enforcer
        .authorize(
            &paris_association(),
            &SHANTYTOWN,
            Feature::Read,
            Some(&GeoPointer::City("92050".to_owned())),
        )
        .await
        .unwrap();
    assert!(!decision.allowed);
}

#[tokio::test]
async fn national_admin_lists_everything() {
    let enforcer = module(&AuthZResolverConfig::default()).enforcer();
    let ctx = SecurityContext::builder()
        .subject_id(9)
        .role(Role::NationalAdmin)
        .build();
    let scope = enforcer
        .access_scope(&ctx, &SHANTYTOWN, Feature::List)
        .await
        .unwrap();
    assert!(scope.is_unconstrained());
}

#[tokio::test]
async fn configured_override_is_merged() {
    let cfg = AuthZResolverConfig {
        local_anchor: LocalAnchor::Region,
        overrides: vec![RuleOverride {
            role: Role::Association,
            entity: EntityKind::Shantytown,
            feature: Feature::Export,
            organization_id: Some(3),
            allowed: true,
            geographic_level: RuleLevel::Departement,
            data_flags: Default::default(),
        }],
    };
    let enforcer = module(&cfg).enforcer();
    let scope = enforcer
        .access_scope(&paris_association(), &SHANTYTOWN, Feature::Export)
        .await
        .unwrap();
    assert!(scope.contains_code(pep_properties::DEPARTEMENT_CODE, "75"));
    assert!(!scope.contains_code(pep_properties::DEPARTEMENT_CODE, "92"));
}

#[test]
fn duplicate_configured_rule_fails_startup() {
    let rule = RuleOverride {
        role: Role::LocalAdmin,
        entity: EntityKind::Plan,
        feature: Feature::Read,
        organization_id: None,
        allowed: false,
        geographic_level: RuleLevel::Local,
        data_flags: Default::default(),
    };
    let cfg = AuthZResolverConfig {
        local_anchor: LocalAnchor::Region,
        overrides: vec![rule],
    };
    let err = AuthZResolverModule::init(geography().client(), &cfg)
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("duplicate rule"));
}

#[tokio::test]
#[traced_test]
async fn dangling_principal_fails_without_allowing() {
    let enforcer = module(&AuthZResolverConfig::default()).enforcer();
    let ctx = SecurityContext::builder()
        .subject_id(1)
        .role(Role::LocalAdmin)
        .location(GeoPointer::City("00000".to_owned()))
        .build();
    let err = enforcer
        .authorize(&ctx, &SHANTYTOWN, Feature::Read, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EnforcerError::EvaluationFailed(_)));
    assert!(logs_contain("policy evaluation failed"));
}
