//! HTTP server command
//!
//! Runs the school records API on PostgreSQL or, with `--in-memory`, on a
//! process-local store that is discarded at shutdown.

use anyhow::{Context, Result};
use clap::Parser;

use school_server::db::{create_pool, schema};
use school_server::http::{run_server, ServerConfig};
use school_server::AppState;

use crate::config::{SchoolConfig, ServerOverrides, Settings};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub server: ServerOverrides,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, file: &SchoolConfig) -> Result<()> {
    let settings = Settings::resolve(&file.server, &args.server)?;

    let state = if settings.in_memory {
        tracing::warn!("Using in-memory store; records are lost at shutdown");
        AppState::in_memory()
    } else {
        let database_url = settings.require_database_url()?;
        let pool = create_pool(database_url)
            .await
            .context("Failed to create database pool")?;
        schema::bootstrap(&pool)
            .await
            .context("Failed to create database schema")?;
        AppState::postgres(pool)
    }
    .with_max_page_size(settings.max_page_size);

    tracing::info!(
        max_page_size = settings.max_page_size,
        "Starting school server on {}",
        settings.bind
    );

    let config = ServerConfig {
        bind_addr: settings.bind,
        cors_permissive: settings.cors_permissive,
    };

    // Blocks until shutdown
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
