//! school CLI - serve and administer the school records API
//!
//! - `serve`: run the HTTP API on PostgreSQL or an in-memory store
//! - `seed`: load a small fixture roster into an empty database
//! - `config`: inspect the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::SchoolConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "school",
    author,
    version,
    about = "Student and course records over a JSON HTTP API"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Path to the TOML config file
    #[arg(long, global = true, env = "SCHOOL_CONFIG", default_value = "school.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Load fixture courses and students into an empty database
    Seed(commands::seed::SeedArgs),
    /// Inspect configuration (show, path)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before parsing so clap sees DATABASE_URL
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let file = SchoolConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &file).await?,
        Commands::Seed(args) => commands::run_seed(args, &file).await?,
        Commands::Config(args) => config::run_config(args, &cli.config, &file)?,
    }

    Ok(())
}
