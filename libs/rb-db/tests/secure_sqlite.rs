#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Scoped queries, transactions and the in-transaction guard on `SQLite`.

use rb_db::migration_runner::{applied_migrations, run_migrations};
use rb_db::secure::{
    AccessScope, Db, ScopableEntity, ScopeError, SecureSelectExt, SecureUpdateExt, TxConfig,
    pep_properties, secure_insert,
};
use rb_db::{ConnectOpts, DbError, connect_db};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm_migration::prelude as mig;

mod ent {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "territory_test")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub region_code: String,
        pub departement_code: String,
        pub label: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl ScopableEntity for ent::Entity {
    fn resolve_property(property: &str) -> Option<ent::Column> {
        match property {
            pep_properties::REGION_CODE => Some(ent::Column::RegionCode),
            pep_properties::DEPARTEMENT_CODE => Some(ent::Column::DepartementCode),
            pep_properties::RESOURCE_ID => Some(ent::Column::Id),
            _ => None,
        }
    }
}

struct CreateTerritoryTest;

impl mig::MigrationName for CreateTerritoryTest {
    fn name(&self) -> &str {
        "m001_create_territory_test"
    }
}

#[async_trait::async_trait]
impl mig::MigrationTrait for CreateTerritoryTest {
    async fn up(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .create_table(
                mig::Table::create()
                    .table(mig::Alias::new("territory_test"))
                    .if_not_exists()
                    .col(
                        mig::ColumnDef::new(mig::Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        mig::ColumnDef::new(mig::Alias::new("region_code"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        mig::ColumnDef::new(mig::Alias::new("departement_code"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        mig::ColumnDef::new(mig::Alias::new("label"))
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .drop_table(
                mig::Table::drop()
                    .table(mig::Alias::new("territory_test"))
                    .to_owned(),
            )
            .await
    }
}

struct TestMigrator;

#[async_trait::async_trait]
impl mig::MigratorTrait for TestMigrator {
    fn migrations() -> Vec<Box<dyn mig::MigrationTrait>> {
        vec![Box::new(CreateTerritoryTest)]
    }

    fn migration_table_name() -> mig::DynIden {
        mig::IntoIden::into_iden(mig::Alias::new("territory_test_migrations"))
    }
}

async fn setup() -> Db {
    let opts = ConnectOpts {
        max_conns: Some(1),
        min_conns: Some(1),
        ..Default::default()
    };
    let db = connect_db("sqlite::memory:", opts).await.expect("connect");
    run_migrations::<TestMigrator>(&db, "test").await.expect("migrate");
    db
}

fn row(region: &str, departement: &str, label: &str) -> ent::ActiveModel {
    ent::ActiveModel {
        region_code: Set(region.to_owned()),
        departement_code: Set(departement.to_owned()),
        label: Set(label.to_owned()),
        ..Default::default()
    }
}

async fn seed(db: &Db) {
    let conn = db.conn().unwrap();
    let all = AccessScope::allow_all();
    for (region, departement, label) in [
        ("11", "75", "paris"),
        ("11", "92", "nanterre"),
        ("93", "13", "marseille"),
    ] {
        secure_insert::<ent::Entity>(row(region, departement, label), &all, &conn)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = setup().await;
    run_migrations::<TestMigrator>(&db, "test").await.unwrap();
    let applied = applied_migrations::<TestMigrator>(&db).await.unwrap();
    assert_eq!(applied, vec!["m001_create_territory_test".to_owned()]);
}

#[tokio::test]
async fn scoped_select_filters_rows() {
    let db = setup().await;
    seed(&db).await;
    let conn = db.conn().unwrap();

    let rows = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::for_departements(["75", "92"]))
        .order_by(ent::Column::Id, sea_orm::Order::Asc)
        .all(&conn)
        .await
        .unwrap();
    let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["paris", "nanterre"]);

    let none = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::deny_all())
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(none, 0);

    let all = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(all, 3);
}

#[tokio::test]
async fn insert_outside_scope_is_rejected() {
    let db = setup().await;
    let conn = db.conn().unwrap();
    let err = secure_insert::<ent::Entity>(
        row("93", "13", "marseille"),
        &AccessScope::for_departement("75"),
        &conn,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScopeError::Denied(_)));
}

#[tokio::test]
async fn scoped_update_stays_in_scope() {
    let db = setup().await;
    seed(&db).await;
    let conn = db.conn().unwrap();
    let paris = AccessScope::for_departement("75");

    let updated = ent::Entity::update_many()
        .secure()
        .col_expr(ent::Column::Label, Expr::value("paris-centre"))
        .scope_with(&paris)
        .exec(&conn)
        .await
        .unwrap();
    assert_eq!(updated.rows_affected, 1);

    let renamed = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .filter(sea_orm::Condition::all().add(ent::Column::Label.eq("paris-centre")))
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(renamed, 1);
}

#[tokio::test]
async fn transaction_commits_on_ok() {
    let db = setup().await;
    db.transaction_with_config(TxConfig::serializable(), |tx| {
        Box::pin(async move {
            secure_insert::<ent::Entity>(row("11", "75", "tx"), &AccessScope::allow_all(), tx)
                .await
                .map_err(anyhow::Error::from)?;
            Ok::<_, anyhow::Error>(())
        })
    })
    .await
    .unwrap();

    let conn = db.conn().unwrap();
    let count = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn transaction_rolls_back_on_err() {
    let db = setup().await;
    let res: anyhow::Result<()> = db
        .transaction_with_config(TxConfig::default(), |tx| {
            Box::pin(async move {
                secure_insert::<ent::Entity>(
                    row("11", "75", "rolled-back"),
                    &AccessScope::allow_all(),
                    tx,
                )
                .await?;
                anyhow::bail!("abort");
            })
        })
        .await;
    assert!(res.is_err());

    let conn = db.conn().unwrap();
    let count = ent::Entity::find()
        .secure()
        .scope_with(&AccessScope::allow_all())
        .count(&conn)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn conn_is_refused_inside_transaction() {
    let db = setup().await;
    let other = db.clone();
    let res: anyhow::Result<()> = db
        .transaction_with_config(TxConfig::default(), move |_tx| {
            Box::pin(async move {
                let err = other.conn().expect_err("conn() must fail inside a transaction");
                assert!(matches!(err, DbError::ConnRequestedInsideTx));
                Ok(())
            })
        })
        .await;
    res.unwrap();
    assert!(db.conn().is_ok());
}
