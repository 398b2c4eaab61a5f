//! compreg-reconcile - Component registry reconciliation
//!
//! Scans every tenant's stored page layouts, compares the component types in
//! use with the canonical registry, and fills the gaps: descriptor records,
//! UI component sources and registry index entries. Each run leaves a JSON
//! and a markdown report behind.
//!
//! Exits non-zero when the run did not complete or recorded errors.

use anyhow::{Context, Result};
use clap::Parser;
use compreg_common::config::ConfigResolver;
use compreg_common::db::{connect_shared_store, create_shared_schema};
use compreg_reconcile::db::{SqlLayoutStore, SqliteTenantDirectory};
use compreg_reconcile::services::credentials::CredentialChain;
use compreg_reconcile::services::pipeline_orchestrator::{PipelineOrchestrator, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for compreg-reconcile
#[derive(Parser, Debug)]
#[command(name = "compreg-reconcile")]
#[command(about = "Reconcile CMS component usage against the component registry")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analyse and report without writing descriptors, artifacts or the index
    #[arg(long)]
    dry_run: bool,

    /// Scan only this tenant id (repeatable)
    #[arg(long = "tenant", value_name = "TENANT_ID")]
    tenants: Vec<String>,

    /// Log level when RUST_LOG is unset (overrides logging.level)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let resolver = ConfigResolver::new(args.config.clone());
    let config = resolver.load().context("Failed to load configuration")?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    info!(
        "Starting compreg-reconcile v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match resolver.config_path() {
        Some((path, _)) if path.exists() => info!("Configuration: {}", path.display()),
        _ => info!("Configuration: compiled defaults"),
    }
    info!("Output root: {}", config.paths.root.display());

    let pool = connect_shared_store(&config.database.shared_url)
        .await
        .context("Failed to connect to shared CMS store")?;
    if config.database.create_schema {
        create_shared_schema(&pool)
            .await
            .context("Failed to create shared schema")?;
    }

    let directory = Arc::new(SqliteTenantDirectory::new(pool.clone()));
    let layouts = Arc::new(SqlLayoutStore::new(
        pool.clone(),
        config.isolated_pool.clone(),
        CredentialChain::default_chain(),
    ));
    let options = RunOptions {
        dry_run: args.dry_run,
        tenant_filter: args.tenants.into_iter().collect(),
    };

    let orchestrator = PipelineOrchestrator::new(directory, layouts, &config, options);
    let outcome = orchestrator.run().await;
    pool.close().await;

    let summary = outcome.context("Reconciliation run aborted")?;
    if summary.is_clean() {
        info!(run_id = %summary.run_id, "Run clean");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(
            run_id = %summary.run_id,
            errors = summary.errors.len(),
            "Run finished with errors; see report"
        );
        Ok(ExitCode::FAILURE)
    }
}
