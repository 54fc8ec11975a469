// aurora-backup/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::backup::BackupSettings;
use crate::errors::BackupError;

const PAC_AURORA_PREFIX: &str = "pac-aurora-";
const DEFAULT_APP_SYSTEM_CODE: &str = "pac-aurora-backup";
const DEFAULT_APP_NAME: &str = "pac-aurora-backup";
const DEFAULT_BACKUPS_RETENTION: i64 = 35;
const DEFAULT_STATUS_CHECK_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_STATUS_CHECK_ATTEMPTS: i64 = 60;

// Structs for deserializing config.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonAwsConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub app_system_code: Option<String>,
    pub app_name: Option<String>,
    pub pac_environment: Option<String>,
    pub backups_retention: Option<i64>,
    pub status_check_interval: Option<String>,
    pub status_check_attempts: Option<i64>,
    pub wait_for_cluster: Option<bool>,
    pub aws: Option<JsonAwsConfig>,
}

// Application's internal configuration structs
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_system_code: String,
    pub app_name: String,
    pub pac_environment: String,
    pub aws: AwsConfig,
    pub backup: BackupSettings,
}

impl AppConfig {
    /// Reads `config_path` when it exists, then applies environment overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let raw_json_config = read_raw_config(config_path)?;
        Self::resolve(raw_json_config, |key| std::env::var(key).ok())
    }

    /// Merges file values with `env` lookups; the environment wins.
    pub fn resolve<F>(raw: RawJsonConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let raw_aws = raw.aws.unwrap_or_default();

        let app_system_code = lookup("APP_SYSTEM_CODE")
            .or(raw.app_system_code)
            .unwrap_or_else(|| DEFAULT_APP_SYSTEM_CODE.to_string());
        let app_name = lookup("APP_NAME")
            .or(raw.app_name)
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let pac_environment = lookup("PAC_ENVIRONMENT")
            .or(raw.pac_environment)
            .context("PAC_ENVIRONMENT (or pac_environment in config.json) must be set")?;

        let region = lookup("AWS_REGION")
            .or(raw_aws.region)
            .context("AWS_REGION (or aws.region in config.json) must be set")?;
        let aws = AwsConfig {
            region,
            access_key_id: lookup("AWS_ACCESS_KEY_ID").or(raw_aws.access_key_id),
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY").or(raw_aws.secret_access_key),
            endpoint_url: lookup("AWS_ENDPOINT_URL").or(raw_aws.endpoint_url),
        };

        let backups_retention = match lookup("BACKUPS_RETENTION") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("BACKUPS_RETENTION is not an integer: {}", v))?,
            None => raw.backups_retention.unwrap_or(DEFAULT_BACKUPS_RETENTION),
        };
        if backups_retention < 0 {
            return Err(BackupError::Config(format!(
                "backups retention cannot be negative: {}",
                backups_retention
            ))
            .into());
        }

        let status_check_attempts = match lookup("STATUS_CHECK_ATTEMPTS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("STATUS_CHECK_ATTEMPTS is not an integer: {}", v))?,
            None => raw
                .status_check_attempts
                .unwrap_or(DEFAULT_STATUS_CHECK_ATTEMPTS),
        };
        let status_check_attempts = u32::try_from(status_check_attempts)
            .ok()
            .filter(|attempts| *attempts >= 1)
            .ok_or_else(|| {
                BackupError::Config(format!(
                    "status check attempts must be at least 1: {}",
                    status_check_attempts
                ))
            })?;

        let status_check_interval = match lookup("STATUS_CHECK_INTERVAL").or(raw.status_check_interval) {
            Some(v) => parse_duration(&v).unwrap_or_else(|e| {
                warn!(error = %e, "Error in parsing status-check-interval parameter. Setting the value as 30s");
                DEFAULT_STATUS_CHECK_INTERVAL
            }),
            None => DEFAULT_STATUS_CHECK_INTERVAL,
        };

        let wait_for_cluster = match lookup("WAIT_FOR_CLUSTER") {
            Some(v) => parse_flag(&v)?,
            None => raw.wait_for_cluster.unwrap_or(false),
        };

        let env_level = extract_environment_level(&pac_environment)?;
        let cluster_id_prefix = format!("{}{}", PAC_AURORA_PREFIX, env_level);
        let snapshot_id_prefix = format!("{}-backup", cluster_id_prefix);

        Ok(AppConfig {
            app_system_code,
            app_name,
            pac_environment,
            aws,
            backup: BackupSettings {
                cluster_id_prefix,
                snapshot_id_prefix,
                status_check_interval,
                status_check_attempts,
                backups_retention: backups_retention as usize,
                wait_for_cluster,
            },
        })
    }
}

/// A missing file is an empty config; every field can come from the environment.
pub fn read_raw_config(config_path: &Path) -> Result<RawJsonConfig> {
    if !config_path.exists() {
        return Ok(RawJsonConfig::default());
    }
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    serde_json::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse JSON from config file at {}",
            config_path.display()
        )
    })
}

/// Takes the level out of a PAC environment label: `pac-staging-eu` -> `staging`.
pub fn extract_environment_level(env: &str) -> Result<String> {
    let (first, last) = match (env.find('-'), env.rfind('-')) {
        (Some(first), Some(last)) if first != last => (first, last),
        _ => return Err(BackupError::Config(format!("environment label is invalid: {}", env)).into()),
    };
    let level = &env[first + 1..last];
    if level.is_empty() {
        return Err(BackupError::Config(format!("environment label is invalid: {}", env)).into());
    }
    Ok(level.to_string())
}

/// Parses durations such as "30s", "1m30s", "500ms" or "2h". A bare "0" is zero.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s).with_context(|| format!("Invalid duration: {}", s))
}

fn parse_flag(v: &str) -> Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => anyhow::bail!("Invalid boolean value: {}", other),
    }
}
