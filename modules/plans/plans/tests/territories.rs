#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Plan territories against an in-memory database, the embedded geography
//! and the default permission matrix.

use std::sync::Arc;

use authz_resolver::{AuthZResolverConfig, AuthZResolverModule};
use geography::{GeographyConfig, GeographyModule, SnapshotSource};
use geography_sdk::GeographyError;
use plans::{DomainError, MODULE_NAME, Migrator, PlanTerritory, PlansConfig, PlansModule, Service};
use rb_db::migration_runner::run_migrations;
use rb_db::{ConnectOpts, connect_db};
use rb_security::{GeoPointer, GeographicLevel, Role, SecurityContext};
use tracing_test::traced_test;

async fn service_with(cfg: &PlansConfig) -> Arc<Service> {
    let opts = ConnectOpts {
        max_conns: Some(1),
        min_conns: Some(1),
        ..Default::default()
    };
    service_on("sqlite::memory:", opts, cfg).await
}

async fn service_on(dsn: &str, opts: ConnectOpts, cfg: &PlansConfig) -> Arc<Service> {
    let db = connect_db(dsn, opts).await.expect("connect");
    run_migrations::<Migrator>(&db, MODULE_NAME).await.expect("migrate");

    let geo = GeographyModule::init(
        &db,
        &GeographyConfig {
            source: SnapshotSource::Embedded,
            ..Default::default()
        },
    )
    .await
    .expect("geography");
    let authz = AuthZResolverModule::init(geo.client(), &AuthZResolverConfig::default())
        .expect("authz");

    PlansModule::new(&db, geo.client(), authz.enforcer(), cfg).service()
}

async fn service() -> Arc<Service> {
    service_with(&PlansConfig::default()).await
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| (*c).to_owned()).collect()
}

fn departements(rows: &[PlanTerritory]) -> Vec<&str> {
    rows.iter().map(|t| t.departement_code.as_str()).collect()
}

fn principal(role: Role, location: GeoPointer) -> SecurityContext {
    SecurityContext::builder()
        .subject_id(1)
        .role(role)
        .organization_id(1)
        .location(location)
        .build()
}

#[tokio::test]
async fn same_region_departements_are_attached() {
    let svc = service().await;
    let plan = svc.create_plan("Plan Ile-de-France").await.unwrap();

    let attached = svc
        .attach_departements(plan.id, &codes(&["75", "92"]))
        .await
        .unwrap();
    assert_eq!(departements(&attached), vec!["75", "92"]);
    assert!(attached.iter().all(|t| t.region_code == "11"));

    let stored = svc.list_territories(plan.id).await.unwrap();
    assert_eq!(stored, attached);
}

#[tokio::test]
#[traced_test]
async fn cross_region_batch_fails_on_second_departement_and_rolls_back() {
    let svc = service().await;
    let plan = svc.create_plan("Plan mixte").await.unwrap();

    let err = svc
        .attach_departements(plan.id, &codes(&["75", "13"]))
        .await
        .unwrap_err();
    match err {
        DomainError::RegionMismatch {
            plan_id,
            departement_code,
            expected_region,
            found_region,
        } => {
            assert_eq!(plan_id, plan.id);
            assert_eq!(departement_code, "13");
            assert_eq!(expected_region, "11");
            assert_eq!(found_region, "93");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(svc.list_territories(plan.id).await.unwrap().is_empty());
    assert!(logs_contain("plan territory rejected"));
}

#[tokio::test]
async fn later_write_is_checked_against_committed_rows() {
    let svc = service().await;
    let plan = svc.create_plan("Plan Paris").await.unwrap();
    svc.attach_departements(plan.id, &codes(&["75"])).await.unwrap();

    assert!(matches!(
        svc.attach_departements(plan.id, &codes(&["13"])).await.unwrap_err(),
        DomainError::RegionMismatch { .. }
    ));
    assert_eq!(
        departements(&svc.list_territories(plan.id).await.unwrap()),
        vec!["75"]
    );
}

#[tokio::test]
async fn attaching_again_is_a_no_op() {
    let svc = service().await;
    let plan = svc.create_plan("Plan 93").await.unwrap();
    svc.attach_departements(plan.id, &codes(&["93"])).await.unwrap();

    let again = svc
        .attach_departements(plan.id, &codes(&["93", "93"]))
        .await
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(svc.list_territories(plan.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_plan_and_departement_are_errors() {
    let svc = service().await;
    assert!(matches!(
        svc.attach_departements(404, &codes(&["75"])).await.unwrap_err(),
        DomainError::PlanNotFound(404)
    ));

    let plan = svc.create_plan("Plan").await.unwrap();
    assert!(matches!(
        svc.attach_departements(plan.id, &codes(&["2A"])).await.unwrap_err(),
        DomainError::Geography(GeographyError::DanglingReference {
            pointer: GeographicLevel::Departement,
            ..
        })
    ));
}

#[tokio::test]
async fn batch_size_is_bounded() {
    let svc = service_with(&PlansConfig {
        max_batch_size: 1,
        ..Default::default()
    })
    .await;
    let plan = svc.create_plan("Plan").await.unwrap();
    assert!(matches!(
        svc.attach_departements(plan.id, &codes(&["75", "92"]))
            .await
            .unwrap_err(),
        DomainError::Validation {
            field: "departements",
            ..
        }
    ));
    assert!(matches!(
        svc.create_plan("   ").await.unwrap_err(),
        DomainError::Validation { field: "name", .. }
    ));
}

#[tokio::test]
async fn managers_contribute_their_departement() {
    let svc = service().await;
    let plan = svc.create_plan("Plan metropole").await.unwrap();

    let managers = [
        GeoPointer::City("75056".to_owned()),
        GeoPointer::Epci("200054781".to_owned()),
        GeoPointer::City("92050".to_owned()),
    ];
    let attached = svc.attach_from_managers(plan.id, &managers).await.unwrap();
    assert_eq!(departements(&attached), vec!["75", "92"]);

    let err = svc
        .attach_from_managers(plan.id, &[GeoPointer::Region("11".to_owned())])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "managers", .. }));

    let err = svc
        .attach_from_managers(plan.id, &[GeoPointer::City("13055".to_owned())])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::RegionMismatch { .. }));
}

#[tokio::test]
async fn moving_a_territory_ignores_the_replaced_row() {
    let svc = service().await;
    let single = svc.create_plan("Plan unique").await.unwrap();
    svc.attach_departements(single.id, &codes(&["75"])).await.unwrap();
    let moved = svc.move_territory(single.id, "75", "13").await.unwrap();
    assert_eq!(moved.region_code, "93");
    assert_eq!(
        departements(&svc.list_territories(single.id).await.unwrap()),
        vec!["13"]
    );

    let pair = svc.create_plan("Plan double").await.unwrap();
    svc.attach_departements(pair.id, &codes(&["75", "92"]))
        .await
        .unwrap();
    assert!(matches!(
        svc.move_territory(pair.id, "92", "13").await.unwrap_err(),
        DomainError::RegionMismatch { .. }
    ));
    assert!(matches!(
        svc.move_territory(pair.id, "94", "93").await.unwrap_err(),
        DomainError::TerritoryNotAttached { .. }
    ));
    assert!(matches!(
        svc.move_territory(pair.id, "75", "92").await.unwrap_err(),
        DomainError::Conflict(_)
    ));
    svc.move_territory(pair.id, "92", "94").await.unwrap();
    assert_eq!(
        departements(&svc.list_territories(pair.id).await.unwrap()),
        vec!["75", "94"]
    );
}

#[tokio::test]
async fn plans_are_listed_within_the_principal_authority() {
    let svc = service().await;
    let idf = svc.create_plan("Plan IdF").await.unwrap();
    svc.attach_departements(idf.id, &codes(&["93"])).await.unwrap();
    let paca = svc.create_plan("Plan PACA").await.unwrap();
    svc.attach_departements(paca.id, &codes(&["13", "06"]))
        .await
        .unwrap();
    let empty = svc.create_plan("Plan vide").await.unwrap();

    let paris_association = principal(Role::Association, GeoPointer::City("75056".to_owned()));
    let visible = svc.list_plans_for(&paris_association).await.unwrap();
    assert_eq!(visible, vec![idf.clone()]);

    let admin = principal(Role::NationalAdmin, GeoPointer::Nation);
    let all = svc.list_plans_for(&admin).await.unwrap();
    assert_eq!(all, vec![idf, paca, empty]);

    assert!(matches!(
        svc.list_plans_for(&SecurityContext::anonymous())
            .await
            .unwrap_err(),
        DomainError::Unauthenticated
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_writers_never_mix_regions() {
    let dir = tempfile::tempdir().unwrap();
    let dsn = format!("sqlite://{}?mode=rwc", dir.path().join("plans.db").display());
    let opts = ConnectOpts {
        max_conns: Some(2),
        min_conns: Some(2),
        ..Default::default()
    };
    let svc = service_on(&dsn, opts, &PlansConfig::default()).await;

    for round in 0..5 {
        let plan = svc.create_plan(&format!("Plan {round}")).await.unwrap();
        let writers: Vec<_> = ["75", "13"]
            .into_iter()
            .map(|code| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.attach_departements(plan.id, &codes(&[code])).await })
            })
            .collect();

        let mut succeeded = 0;
        for writer in writers {
            if writer.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert!(succeeded <= 1, "round {round}: both writers committed");

        let stored = svc.list_territories(plan.id).await.unwrap();
        assert_eq!(stored.len(), succeeded, "round {round}");
        let mut regions: Vec<_> = stored.iter().map(|t| t.region_code.as_str()).collect();
        regions.dedup();
        assert!(regions.len() <= 1, "round {round}: {regions:?}");
    }
}
