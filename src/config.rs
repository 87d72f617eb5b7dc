//! Advisor configuration.
//!
//! Backend selection is resolved in priority order: CLI flag, then the
//! user config file, then environment variables. The config file lives in
//! the platform config directory (`voltplan/config.json`).

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::request::DetailLevel;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

const ENDPOINT_ENV: &str = "VOLTPLAN_ENDPOINT";
const BACKEND_ENV: &str = "VOLTPLAN_BACKEND";

/// User-owned configuration for the advisor CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub schema_version: u32,

    /// HTTP endpoint of the hosted schedule service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Local backend command (reads request JSON on stdin).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_command: Option<String>,

    /// Nominal fidelity selection; generate requests pin the highest
    /// setting regardless.
    #[serde(default)]
    pub detail_level: DetailLevel,
}

/// How the CLI should reach the schedule service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendChoice {
    Http(String),
    Command(String),
}

/// Build the default config used when no file exists yet.
pub fn default_config() -> AdvisorConfig {
    AdvisorConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        endpoint: None,
        backend_command: None,
        detail_level: DetailLevel::Detailed,
    }
}

/// Render a pretty JSON config stub for `voltplan init`.
pub fn config_stub() -> String {
    serde_json::to_string_pretty(&default_config()).expect("serialize config stub")
}

/// Default location of the user config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("voltplan").join("config.json"))
}

pub fn load_config(path: &Path) -> Result<AdvisorConfig> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: AdvisorConfig =
        serde_json::from_slice(&bytes).context("parse advisor config JSON")?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(path: &Path, config: &AdvisorConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("create config dir")?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize advisor config")?;
    std::fs::write(path, text.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &AdvisorConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if let Some(endpoint) = config.endpoint.as_deref() {
        if endpoint.trim().is_empty() {
            return Err(anyhow!("endpoint must be non-empty"));
        }
    }
    if let Some(command) = config.backend_command.as_deref() {
        if command.trim().is_empty() {
            return Err(anyhow!("backend_command must be non-empty"));
        }
    }
    Ok(())
}

/// Pick a backend from explicit flags, a loaded config, and environment
/// values, in that order. A configured command wins over an endpoint at the
/// same priority level.
pub fn choose_backend(
    flag_endpoint: Option<&str>,
    flag_command: Option<&str>,
    config: Option<&AdvisorConfig>,
    env_endpoint: Option<String>,
    env_command: Option<String>,
) -> Result<BackendChoice> {
    if let Some(command) = flag_command {
        return Ok(BackendChoice::Command(command.to_string()));
    }
    if let Some(endpoint) = flag_endpoint {
        return Ok(BackendChoice::Http(endpoint.to_string()));
    }
    if let Some(config) = config {
        if let Some(command) = config.backend_command.as_deref() {
            return Ok(BackendChoice::Command(command.to_string()));
        }
        if let Some(endpoint) = config.endpoint.as_deref() {
            return Ok(BackendChoice::Http(endpoint.to_string()));
        }
    }
    if let Some(command) = env_command {
        return Ok(BackendChoice::Command(command));
    }
    if let Some(endpoint) = env_endpoint {
        return Ok(BackendChoice::Http(endpoint));
    }
    Err(anyhow!(
        "no backend configured; pass --endpoint or --backend-command, or run `voltplan init`"
    ))
}

/// Resolve the backend choice for a CLI invocation.
pub fn resolve_backend_choice(
    flag_endpoint: Option<&str>,
    flag_command: Option<&str>,
) -> Result<BackendChoice> {
    let config = match config_path() {
        Some(path) if path.exists() => {
            let config = load_config(&path)?;
            validate_config(&config)?;
            Some(config)
        }
        _ => None,
    };
    choose_backend(
        flag_endpoint,
        flag_command,
        config.as_ref(),
        env::var(ENDPOINT_ENV).ok(),
        env::var(BACKEND_ENV).ok(),
    )
}
