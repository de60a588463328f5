//! CLI-specific configuration wrappers.
//!
//! Re-exports the shared config crate and layers the `--profile` and
//! `--endpoint` flags on top, then wires up the console.

use std::sync::Arc;

use tracing::debug;

pub use shopkeep_config::{
    Config, ConfigError, Profile, ProfileSettings, config_path, load_config,
    load_config_or_default, parse_endpoint, save_config,
};
use shopkeep_core::{Console, GraphQlClient, RemoteGateway, SessionState};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The console every resource command runs against.
pub type CliConsole = Console<RemoteGateway>;

/// Profile selected by `--profile`, else the config's default.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| shopkeep_config::active_profile_name(cfg))
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Resolve the active profile with CLI flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<ProfileSettings, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut settings = match shopkeep_config::resolve_profile(&cfg, &name) {
        Ok(settings) => settings,
        Err(ConfigError::UnknownProfile { name, .. }) => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref endpoint) = global.endpoint {
        settings.endpoint = parse_endpoint(endpoint)?;
    }
    Ok(settings)
}

/// Build the console for the active profile and restore its session.
pub fn connect(global: &GlobalOpts) -> Result<CliConsole, CliError> {
    let settings = resolve(global)?;
    let client = GraphQlClient::new(settings.endpoint.clone(), &settings.transport).map_err(|e| {
        CliError::Transport {
            message: e.to_string(),
        }
    })?;

    let session = SessionState::new(Arc::new(settings.session_store()));
    let gateway = RemoteGateway::new(Arc::new(client), session.clone());
    let console = Console::new(Arc::new(gateway), session);

    let restored = console.initialize();
    debug!(
        profile = %settings.name,
        endpoint = %settings.endpoint,
        restored,
        "console ready"
    );
    Ok(console)
}
