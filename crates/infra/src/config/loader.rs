//! Environment and file configuration sources

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use provisor_domain::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BASE_BACKOFF_MS, DEFAULT_MAX_PAGES, DEFAULT_RETRY_BUDGET,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_VALIDITY_SECS, MAX_PAGE_SIZE,
};
use provisor_domain::{ApiConfig, Config, ConnectConfig, ProvisorError, Result};

const ENV_ISSUER_ID: &str = "PROVISOR_ISSUER_ID";
const ENV_KEY_ID: &str = "PROVISOR_KEY_ID";
const ENV_PRIVATE_KEY: &str = "PROVISOR_PRIVATE_KEY";
const ENV_TOKEN_VALIDITY: &str = "PROVISOR_TOKEN_VALIDITY";
const ENV_API_BASE_URL: &str = "PROVISOR_API_BASE_URL";
const ENV_API_TIMEOUT: &str = "PROVISOR_API_TIMEOUT";
const ENV_RETRY_BUDGET: &str = "PROVISOR_RETRY_BUDGET";
const ENV_BASE_BACKOFF_MS: &str = "PROVISOR_BASE_BACKOFF_MS";
const ENV_MAX_PAGES: &str = "PROVISOR_MAX_PAGES";
const ENV_PAGE_SIZE: &str = "PROVISOR_PAGE_SIZE";

/// File names probed in order within each candidate directory
const CONFIG_FILE_NAMES: &[&str] =
    &["provisor.toml", "provisor.json", "config.toml", "config.json"];

/// Load configuration, environment first
///
/// When `PROVISOR_ISSUER_ID` is set the environment must carry the whole
/// credential triple; otherwise a config file is probed.
///
/// # Errors
/// Returns `ProvisorError::Config` when neither source yields a complete
/// configuration.
pub fn load() -> Result<Config> {
    if env::var(ENV_ISSUER_ID).is_ok() {
        info!("Loading configuration from environment");
        return load_from_env();
    }

    debug!("{ENV_ISSUER_ID} not set, probing for a config file");
    load_from_file(None)
}

/// Load configuration from environment variables
///
/// `PROVISOR_ISSUER_ID`, `PROVISOR_KEY_ID` and `PROVISOR_PRIVATE_KEY` are
/// required; every tuning knob falls back to its default.
///
/// # Errors
/// Returns `ProvisorError::Config` for a missing required variable or an
/// unparseable numeric value.
pub fn load_from_env() -> Result<Config> {
    let connect = ConnectConfig {
        issuer_id: env_var(ENV_ISSUER_ID)?,
        key_id: env_var(ENV_KEY_ID)?,
        private_key: env_var(ENV_PRIVATE_KEY)?,
        token_validity_seconds: env_parse(ENV_TOKEN_VALIDITY, DEFAULT_TOKEN_VALIDITY_SECS)?,
    };

    let api = ApiConfig {
        base_url: env::var(ENV_API_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        timeout_seconds: env_parse(ENV_API_TIMEOUT, DEFAULT_TIMEOUT_SECS)?,
        retry_budget: env_parse(ENV_RETRY_BUDGET, DEFAULT_RETRY_BUDGET)?,
        base_backoff_ms: env_parse(ENV_BASE_BACKOFF_MS, DEFAULT_BASE_BACKOFF_MS)?,
        max_pages: env_parse(ENV_MAX_PAGES, DEFAULT_MAX_PAGES)?,
        page_size: env_parse(ENV_PAGE_SIZE, MAX_PAGE_SIZE)?,
    };

    Ok(Config { connect, api })
}

/// Load configuration from a file
///
/// With no explicit path the candidate locations are probed: the working
/// directory and two parents, then the executable's directory, each for
/// `provisor.{toml,json}` and `config.{toml,json}`.
///
/// # Errors
/// Returns `ProvisorError::Config` when no file is found, the file cannot
/// be read, or its contents do not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => probe_config_paths().ok_or_else(|| {
            ProvisorError::Config(format!(
                "no configuration found: set {ENV_ISSUER_ID} or add a config file"
            ))
        })?,
    };

    if !path.exists() {
        return Err(ProvisorError::Config(format!("config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ProvisorError::Config(format!("reading {}: {e}", path.display())))?;
    parse_config(&path, &contents)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("toml") => toml::from_str(contents)
            .map_err(|e| ProvisorError::Config(format!("parsing {}: {e}", path.display()))),
        Some("json") => serde_json::from_str(contents)
            .map_err(|e| ProvisorError::Config(format!("parsing {}: {e}", path.display()))),
        _ => Err(ProvisorError::Config(format!(
            "unsupported config format: {} (expected .toml or .json)",
            path.display()
        ))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        let mut dir = cwd.as_path();
        for _ in 0..3 {
            for name in CONFIG_FILE_NAMES {
                candidates.push(dir.join(name));
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
    }

    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            for name in CONFIG_FILE_NAMES {
                candidates.push(dir.join(name));
            }
        }
    }

    candidates.into_iter().find(|candidate| candidate.exists())
}

fn env_var(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| ProvisorError::Config(format!("missing required environment variable {key}")))
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ProvisorError::Config(format!("invalid value for {key}: '{value}'"))),
        Err(_) => Ok(default),
    }
}
