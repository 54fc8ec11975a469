//! Aurora Cluster Backup Tool
//!
//! Takes a manual snapshot of the PAC Aurora cluster and prunes old ones.

// aurora-backup/src/main.rs
mod backup;
mod config;
mod errors;
mod provider;
mod utils;

use anyhow::{Context, Result};
use backup::BackupService;
use config::AppConfig;
use provider::aws_rds::AwsRds;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Main entry point for the backup tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    utils::init_tracing();

    match run_app().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = ?e, "App could not start");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when a backup operation ran but reported a failure.
async fn run_app() -> Result<bool> {
    // config.json is optional; everything can come from the environment.
    let config_path = PathBuf::from("config.json");
    let app_config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load application configuration from {}", config_path.display()))?;

    info!("[Startup] {} is starting", app_config.app_system_code);
    info!(
        "System code: {}, App Name: {}, Pac environment: {}",
        app_config.app_system_code, app_config.app_name, app_config.pac_environment
    );

    let choice = env::args().nth(1).map(|a| a.trim().to_string()).unwrap_or_else(|| "all".to_string());

    let rds = Arc::new(AwsRds::connect(&app_config.aws).await);
    let service = BackupService::new(rds, app_config.backup.clone());

    let succeeded = match choice.as_str() {
        "backup" => service.make_backup().await.is_ok(),
        "cleanup" => service.clean_up_old_backups().await.is_ok(),
        "all" => {
            // cleanup runs even when the backup failed
            let backup_ok = service.make_backup().await.is_ok();
            let cleanup_ok = service.clean_up_old_backups().await.is_ok();
            backup_ok && cleanup_ok
        }
        other => anyhow::bail!("Invalid operation '{}'. Expected 'backup', 'cleanup' or 'all'.", other),
    };

    Ok(succeeded)
}
