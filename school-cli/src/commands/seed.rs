//! Load the fixture roster into an empty database

use anyhow::{Context, Result};
use clap::Parser;

use school_server::db::{create_pool, schema};
use school_server::seed::load_fixtures;
use school_server::AppState;

use crate::config::{SchoolConfig, ServerOverrides, Settings};

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

pub async fn run_seed(args: SeedArgs, file: &SchoolConfig) -> Result<()> {
    let flags = ServerOverrides {
        database_url: args.database_url,
        ..Default::default()
    };
    let settings = Settings::resolve(&file.server, &flags)?;
    let database_url = settings.require_database_url()?;

    let pool = create_pool(database_url)
        .await
        .context("Failed to create database pool")?;
    schema::bootstrap(&pool)
        .await
        .context("Failed to create database schema")?;

    let state = AppState::postgres(pool);
    match load_fixtures(&state).await.context("Seeding failed")? {
        Some(report) => println!(
            "Seeded {} courses, {} students, {} enrollments",
            report.courses, report.students, report.enrollments
        ),
        None => anyhow::bail!("Database already contains records; refusing to seed"),
    }

    Ok(())
}
