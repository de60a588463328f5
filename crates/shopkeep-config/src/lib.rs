//! Shared configuration for the shopkeep CLI and TUI.
//!
//! TOML profiles (one backend endpoint each), figment layering with
//! `SHOPKEEP_` environment overrides, and the file-backed session store.
//! Both binaries depend on this crate; the CLI adds flag-aware wrappers.

mod session_file;

pub use session_file::FileSessionStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use shopkeep_core::TransportConfig;

/// Endpoint used when no profile names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/query";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in {path}")]
    UnknownProfile { name: String, path: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// GraphQL endpoint (e.g., "http://localhost:8080/query").
    pub endpoint: String,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout in seconds.
    pub timeout: Option<u64>,

    /// Where this profile's session is persisted. Defaults to
    /// `<config dir>/sessions/<profile>.toml`.
    pub session_file: Option<PathBuf>,
}

impl Profile {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            insecure: None,
            timeout: None,
            session_file: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Configuration directory: `SHOPKEEP_CONFIG_DIR`, else platform conventions.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("SHOPKEEP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("dev", "shopkeep", "shopkeep").map_or_else(dirs_fallback, |dirs| {
        dirs.config_dir().to_path_buf()
    })
}

/// Resolve the config file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of a profile's persisted session.
pub fn session_path(profile_name: &str) -> PathBuf {
    config_dir()
        .join("sessions")
        .join(format!("{profile_name}.toml"))
}

/// Directory for log files (TUI).
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("SHOPKEEP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("dev", "shopkeep", "shopkeep").map_or_else(dirs_fallback, |dirs| {
        dirs.data_local_dir().to_path_buf()
    })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("shopkeep");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Nested keys use a double underscore, e.g.
/// `SHOPKEEP_DEFAULTS__TIMEOUT=5`.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("SHOPKEEP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}

// ── Profile resolution ──────────────────────────────────────────────

/// Everything a front end needs to talk to one backend.
#[derive(Debug, Clone)]
pub struct ProfileSettings {
    pub name: String,
    pub endpoint: Url,
    pub transport: TransportConfig,
    pub session_file: PathBuf,
}

impl ProfileSettings {
    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(self.session_file.clone())
    }
}

/// Name of the profile to use when none is given.
pub fn active_profile_name(cfg: &Config) -> String {
    cfg.default_profile
        .clone()
        .unwrap_or_else(|| "default".into())
}

/// Resolve a profile by name.
///
/// An unconfigured `default` profile resolves to [`DEFAULT_ENDPOINT`],
/// so a fresh install works against a local backend without setup.
pub fn resolve_profile(cfg: &Config, name: &str) -> Result<ProfileSettings, ConfigError> {
    let profile = match cfg.profiles.get(name) {
        Some(profile) => profile.clone(),
        None if name == "default" => Profile::new(DEFAULT_ENDPOINT),
        None => {
            return Err(ConfigError::UnknownProfile {
                name: name.into(),
                path: config_path().display().to_string(),
            });
        }
    };

    let endpoint = parse_endpoint(&profile.endpoint)?;
    let transport = TransportConfig::default()
        .with_timeout(Duration::from_secs(
            profile.timeout.unwrap_or(cfg.defaults.timeout),
        ))
        .with_insecure(profile.insecure.unwrap_or(cfg.defaults.insecure));

    Ok(ProfileSettings {
        name: name.into(),
        endpoint,
        transport,
        session_file: profile
            .session_file
            .clone()
            .unwrap_or_else(|| session_path(name)),
    })
}

/// Parse and check an endpoint URL (http or https only).
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_falls_back_to_local_backend() {
        let cfg = Config::default();
        let settings = resolve_profile(&cfg, "default").unwrap();
        assert_eq!(settings.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(settings.transport.timeout, Duration::from_secs(30));
        assert!(settings.session_file.ends_with("sessions/default.toml"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            resolve_profile(&cfg, "staging"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_overrides_defaults() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://admin.example.com/query");
        profile.timeout = Some(5);
        profile.insecure = Some(true);
        cfg.profiles.insert("prod".into(), profile);

        let settings = resolve_profile(&cfg, "prod").unwrap();
        assert_eq!(settings.transport.timeout, Duration::from_secs(5));
        assert!(settings.transport.accept_invalid_certs);
    }

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(parse_endpoint("ftp://example.com/query").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new(DEFAULT_ENDPOINT));
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.profiles["default"].endpoint, DEFAULT_ENDPOINT);
    }
}
