//! One function per subcommand. Each returns the JSON document printed on
//! stdout.

use std::sync::Arc;

use anyhow::Context;
use authz_resolver::AuthZResolverModule;
use authz_resolver_sdk::{EntityKind, Feature, ResourceType};
use geography::{GeographyModule, SnapshotSource};
use geography_sdk::{GeoDataset, GeoSnapshot};
use rb_security::{GeoPointer, GeoPointerColumns, pep_properties};
use serde_json::{Value, json};
use tracing::info;

use crate::app::App;
use crate::config::AppConfig;

/// The principal's security context and the scope its pointer resolves to.
///
/// # Errors
/// Fails for an unknown user or a dangling pointer.
pub async fn resolve_scope(app: &App, user_id: i64) -> anyhow::Result<Value> {
    let ctx = app.directory.service().security_context_for(user_id).await?;
    let scope = app.geography.resolve_scope(ctx.location()).await?;
    Ok(json!({ "context": ctx, "scope": scope }))
}

/// Evaluate one permission for a user against a target location.
///
/// Without a target only the rule and the principal's scope are checked. A
/// denial is a regular result (`"allowed": false`), not an error.
///
/// # Errors
/// Fails for an unknown user, a target naming more than one pointer, or an
/// evaluation failure.
pub async fn authorize(
    app: &App,
    user_id: i64,
    entity: EntityKind,
    feature: Feature,
    target: &GeoPointerColumns,
) -> anyhow::Result<Value> {
    let target = target.check_geo_consistency()?;
    let ctx = app.directory.service().security_context_for(user_id).await?;
    let resource = ResourceType {
        entity,
        supported_properties: pep_properties::GEOGRAPHIC,
    };
    let target = match &target {
        GeoPointer::Nation => None,
        located => Some(located),
    };

    let decision = app
        .authz
        .enforcer()
        .authorize(&ctx, &resource, feature, target)
        .await?;
    info!(user_id, %entity, %feature, allowed = decision.allowed, "authorization evaluated");
    Ok(serde_json::to_value(decision)?)
}

/// Attach départements to a plan and list the resulting territories.
///
/// # Errors
/// Fails, with nothing written, when any département breaks the plan's
/// region.
pub async fn attach_territory(
    app: &App,
    plan_id: i64,
    departements: &[String],
) -> anyhow::Result<Value> {
    let plans = app.plans.service();
    let attached = plans.attach_departements(plan_id, departements).await?;
    let territories = plans.list_territories(plan_id).await?;
    Ok(json!({ "attached": attached, "territories": territories }))
}

/// Validate the configuration without touching the database.
///
/// The geography snapshot comes from the configured file, or from the
/// embedded dataset for the other sources (the database is seeded from it).
/// Permission overrides are merged into the default matrix exactly as at
/// startup.
///
/// # Errors
/// Fails when the dataset is unreadable or inconsistent, or when an
/// override conflicts with an existing rule.
pub async fn check_config(cfg: &AppConfig) -> anyhow::Result<Value> {
    let snapshot = match cfg.geography.source {
        SnapshotSource::File => {
            let path = cfg
                .geography
                .dataset_path
                .as_ref()
                .context("geography.dataset_path is required when source is 'file'")?;
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            GeoSnapshot::from_dataset(GeoDataset::from_json(&raw)?)?
        }
        SnapshotSource::Database | SnapshotSource::Embedded => geography::embedded_snapshot()?,
    };
    let (regions, departements, epcis, cities) = snapshot.counts();

    let geography =
        GeographyModule::from_service(Arc::new(geography::Service::new(snapshot))).client();
    let authz = AuthZResolverModule::init(geography, &cfg.authz)?;

    Ok(json!({
        "db": {
            "dsn": cfg.db.redacted_dsn(),
            "max_conns": cfg.db.max_conns,
            "min_conns": cfg.db.min_conns,
            "acquire_timeout_secs": cfg.db.acquire_timeout_secs,
        },
        "logging": cfg.logging,
        "geography": {
            "config": cfg.geography,
            "regions": regions,
            "departements": departements,
            "epcis": epcis,
            "cities": cities,
        },
        "authz": {
            "local_anchor": cfg.authz.local_anchor,
            "overrides": cfg.authz.overrides.len(),
            "rules": authz.service().matrix().len(),
        },
        "plans": cfg.plans,
    }))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use directory::NewUser;
    use rb_security::Role;

    use super::*;
    use crate::app;

    async fn started() -> App {
        let cfg = AppConfig::default();
        let db = app::connect(&cfg).await.unwrap();
        app::migrate(&db).await.unwrap();
        App::start(&db, &cfg).await.unwrap()
    }

    async fn user_at(app: &App, org: &str, city: &str, role: Role, email: &str) -> i64 {
        let directory = app.directory.service();
        let org = directory
            .create_organization(
                org,
                &GeoPointerColumns {
                    city_code: Some(city.to_owned()),
                    ..GeoPointerColumns::default()
                },
            )
            .await
            .unwrap();
        directory
            .create_user(NewUser::new(email, role, org.id))
            .await
            .unwrap()
            .id
    }

    fn departement(code: &str) -> GeoPointerColumns {
        GeoPointerColumns {
            departement_code: Some(code.to_owned()),
            ..GeoPointerColumns::default()
        }
    }

    #[tokio::test]
    async fn local_admin_in_paris_reads_hauts_de_seine_but_not_bouches_du_rhone() {
        let app = started().await;
        let user = user_at(&app, "Ville de Paris", "75056", Role::LocalAdmin, "a@paris.fr").await;

        let allowed = authorize(&app, user, EntityKind::Shantytown, Feature::Read, &departement("92"))
            .await
            .unwrap();
        assert_eq!(allowed["allowed"], json!(true));
        assert_eq!(allowed["visible_data_flags"]["data_justice"], json!(true));

        let denied = authorize(&app, user, EntityKind::Shantytown, Feature::Read, &departement("13"))
            .await
            .unwrap();
        assert_eq!(denied["allowed"], json!(false));
        assert_eq!(denied["deny_reason"]["error_code"], json!("out_of_scope"));
    }

    #[tokio::test]
    async fn without_target_only_the_rule_is_checked() {
        let app = started().await;
        let admin = user_at(&app, "Ville de Paris", "75056", Role::LocalAdmin, "a@paris.fr").await;
        let res = authorize(
            &app,
            admin,
            EntityKind::Shantytown,
            Feature::Read,
            &GeoPointerColumns::default(),
        )
        .await
        .unwrap();
        assert_eq!(res["allowed"], json!(true));

        let association = user_at(&app, "Association", "13055", Role::Association, "b@asso.fr").await;
        let res = authorize(
            &app,
            association,
            EntityKind::Shantytown,
            Feature::Export,
            &GeoPointerColumns::default(),
        )
        .await
        .unwrap();
        assert_eq!(res["allowed"], json!(false));
        assert_eq!(res["deny_reason"]["error_code"], json!("no_matching_rule"));
    }

    #[tokio::test]
    async fn target_with_two_pointers_is_rejected() {
        let app = started().await;
        let user = user_at(&app, "Ville de Paris", "75056", Role::LocalAdmin, "a@paris.fr").await;
        let target = GeoPointerColumns {
            region_code: Some("11".to_owned()),
            departement_code: Some("75".to_owned()),
            ..GeoPointerColumns::default()
        };
        let err = authorize(&app, user, EntityKind::Plan, Feature::Read, &target)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("region"), "{err}");
    }

    #[tokio::test]
    async fn resolve_scope_reports_every_ancestor() {
        let app = started().await;
        let user = user_at(&app, "Nanterre", "92050", Role::Intervener, "i@nanterre.fr").await;
        let out = resolve_scope(&app, user).await.unwrap();
        assert_eq!(out["context"]["role"], json!("intervener"));
        assert_eq!(out["scope"]["level"], json!("city"));
        assert_eq!(out["scope"]["departement"]["code"], json!("92"));
        assert_eq!(out["scope"]["region"]["code"], json!("11"));
        assert_eq!(out["scope"]["epci"]["code"], json!("200054781"));

        assert!(resolve_scope(&app, 999).await.is_err());
    }

    #[tokio::test]
    async fn attach_territory_keeps_plans_in_one_region() {
        let app = started().await;
        let plan = app.plans.service().create_plan("Plan IdF").await.unwrap();

        let out = attach_territory(&app, plan.id, &["75".to_owned(), "92".to_owned()])
            .await
            .unwrap();
        assert_eq!(out["attached"].as_array().map(Vec::len), Some(2));
        assert_eq!(out["territories"].as_array().map(Vec::len), Some(2));

        let err = attach_territory(&app, plan.id, &["13".to_owned()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("93"), "{err}");
        let territories = app.plans.service().list_territories(plan.id).await.unwrap();
        assert_eq!(territories.len(), 2);
    }

    #[tokio::test]
    async fn check_config_summarizes_defaults() {
        let out = check_config(&AppConfig::default()).await.unwrap();
        assert_eq!(out["db"]["dsn"], json!("sqlite::memory:"));
        assert_eq!(out["geography"]["regions"], json!(3));
        assert_eq!(out["geography"]["cities"], json!(6));
        assert_eq!(out["authz"]["overrides"], json!(0));
        assert!(out["authz"]["rules"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn check_config_rejects_duplicate_default_rule() {
        let mut cfg = AppConfig::default();
        cfg.authz.overrides = vec![
            serde_json::from_value(json!({
                "role": "national_admin",
                "entity": "plan",
                "feature": "read",
                "allowed": false,
                "geographic_level": "nation",
            }))
            .unwrap(),
        ];
        assert!(check_config(&cfg).await.is_err());
    }

    #[tokio::test]
    async fn check_config_reads_dataset_file() {
        let dataset = geography::embedded_snapshot().unwrap().to_dataset();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&dataset).unwrap().as_bytes())
            .unwrap();

        let mut cfg = AppConfig::default();
        cfg.geography.source = SnapshotSource::File;
        cfg.geography.dataset_path = Some(file.path().to_path_buf());
        let out = check_config(&cfg).await.unwrap();
        assert_eq!(out["geography"]["departements"], json!(7));

        cfg.geography.dataset_path = None;
        assert!(check_config(&cfg).await.is_err());
    }
}
