#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `rb-server`: operator front end of the scope and permission core.
//!
//! Every subcommand prints one JSON document on stdout; logs go to stderr.

mod app;
mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use authz_resolver_sdk::{EntityKind, Feature};
use clap::{Args, Parser, Subcommand};
use rb_security::GeoPointerColumns;
use serde_json::Value;

use crate::app::App;
use crate::config::AppConfig;

/// Geographic scope and permission core for Resorption Bidonvilles
#[derive(Parser)]
#[command(name = "rb-server", version)]
struct Cli {
    /// Path to configuration file [default: config/rb-server.yaml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations and seed the geography reference tables
    Migrate,
    /// Print a user's security context and resolved scope
    ResolveScope {
        #[arg(long)]
        user: i64,
    },
    /// Evaluate one permission of a user, optionally against a location
    Authorize {
        #[arg(long)]
        user: i64,
        /// Entity kind, e.g. `shantytown`, `plan`
        #[arg(long)]
        entity: EntityKind,
        /// Feature, e.g. `read`, `list`, `export`
        #[arg(long)]
        feature: Feature,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Attach départements to a plan
    AttachTerritory {
        #[arg(long)]
        plan: i64,
        /// Département code; repeat for several
        #[arg(long = "departement", required = true)]
        departements: Vec<String>,
    },
    /// Validate configuration and exit
    CheckConfig,
}

/// Location of the object being accessed. At most one may be given.
#[derive(Args)]
#[group(multiple = false)]
struct TargetArgs {
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    departement: Option<String>,
    #[arg(long)]
    epci: Option<String>,
    #[arg(long)]
    city: Option<String>,
}

impl From<TargetArgs> for GeoPointerColumns {
    fn from(t: TargetArgs) -> Self {
        Self {
            region_code: t.region,
            departement_code: t.departement,
            epci_code: t.epci,
            city_code: t.city,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_verbosity(cli.verbose);
    logging::init(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rb-server starting");

    let output = run(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(command: Commands, config: &AppConfig) -> Result<Value> {
    match command {
        Commands::Migrate => {
            let db = app::connect(config).await?;
            Ok(serde_json::to_value(app::migrate(&db).await?)?)
        }
        Commands::ResolveScope { user } => {
            commands::resolve_scope(&start(config).await?, user).await
        }
        Commands::Authorize {
            user,
            entity,
            feature,
            target,
        } => {
            let app = start(config).await?;
            commands::authorize(&app, user, entity, feature, &target.into()).await
        }
        Commands::AttachTerritory { plan, departements } => {
            commands::attach_territory(&start(config).await?, plan, &departements).await
        }
        Commands::CheckConfig => commands::check_config(config).await,
    }
}

async fn start(config: &AppConfig) -> Result<App> {
    let db = app::connect(config).await?;
    App::start(&db, config).await
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn authorize_parses_typed_arguments() {
        let cli = Cli::try_parse_from([
            "rb-server", "-vv", "authorize", "--user", "3", "--entity", "shantytown",
            "--feature", "read", "--departement", "92",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Authorize {
            user,
            entity,
            feature,
            target,
        } = cli.command
        else {
            panic!("expected authorize");
        };
        assert_eq!(user, 3);
        assert_eq!(entity, EntityKind::Shantytown);
        assert_eq!(feature, Feature::Read);
        let cols = GeoPointerColumns::from(target);
        assert_eq!(cols.departement_code.as_deref(), Some("92"));
        assert_eq!(cols.city_code, None);
    }

    #[test]
    fn authorize_rejects_two_targets_and_unknown_entities() {
        assert!(
            Cli::try_parse_from([
                "rb-server", "authorize", "--user", "1", "--entity", "plan", "--feature", "read",
                "--region", "11", "--city", "75056",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from([
                "rb-server", "authorize", "--user", "1", "--entity", "camp", "--feature", "read",
            ])
            .is_err()
        );
    }

    #[test]
    fn attach_territory_collects_repeated_departements() {
        let cli = Cli::try_parse_from([
            "rb-server", "attach-territory", "--plan", "4", "--departement", "75",
            "--departement", "92",
        ])
        .unwrap();
        let Commands::AttachTerritory { plan, departements } = cli.command else {
            panic!("expected attach-territory");
        };
        assert_eq!(plan, 4);
        assert_eq!(departements, vec!["75", "92"]);
        assert!(Cli::try_parse_from(["rb-server", "attach-territory", "--plan", "4"]).is_err());
    }

    #[tokio::test]
    async fn check_config_runs_without_a_database() {
        let cfg = AppConfig {
            db: rb_db::DbConfig {
                dsn: String::from("postgres://rb:pw@unreachable.invalid/rb").into(),
                ..rb_db::DbConfig::default()
            },
            ..AppConfig::default()
        };
        let out = run(Commands::CheckConfig, &cfg).await.unwrap();
        assert_eq!(out["db"]["dsn"], "postgres://***@unreachable.invalid/rb");
    }

    #[tokio::test]
    async fn migrate_then_start_on_in_memory_sqlite() {
        let cfg = AppConfig::default();
        let out = run(Commands::Migrate, &cfg).await.unwrap();
        assert_eq!(out.as_array().map(Vec::len), Some(3));
        assert_eq!(out[0]["module"], "geography");
    }
}
