//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use shopkeep_config::ConfigError;
use shopkeep_core::{CoreError, ResourceKind};

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const VALIDATION: i32 = 4;
    pub const TRANSPORT: i32 = 5;
    pub const CONFIG: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Session ──────────────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(shopkeep::not_signed_in),
        help("Sign in first with: shopkeep login --email <EMAIL>")
    )]
    NotSignedIn,

    #[error("{message}")]
    #[diagnostic(
        code(shopkeep::auth_failed),
        help("Sign in with: shopkeep login --email <EMAIL>")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(shopkeep::not_found),
        help("Run: shopkeep {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(shopkeep::refused))]
    Refused { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shopkeep::validation))]
    Validation { field: String, reason: String },

    // ── Transport ────────────────────────────────────────────────────

    #[error("Could not reach the backend: {message}")]
    #[diagnostic(
        code(shopkeep::transport),
        help(
            "Check that the backend is running and the endpoint is right.\n\
             Show it with: shopkeep config show"
        )
    )]
    Transport { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(shopkeep::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: shopkeep config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(shopkeep::config))]
    Config(#[from] ConfigError),

    #[error("Session storage failed: {message}")]
    #[diagnostic(code(shopkeep::session_store))]
    SessionStore { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(shopkeep::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(shopkeep::prompt))]
    Prompt(String),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotSignedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::Transport { .. } => exit_code::TRANSPORT,
            Self::ProfileNotFound { .. } | Self::Config(_) | Self::SessionStore { .. } => {
                exit_code::CONFIG
            }
            Self::Refused { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Prompt(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

fn list_command(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Account => "accounts list",
        ResourceKind::CatalogItem => "items list",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => CliError::Validation {
                field: field.unwrap_or("input").into(),
                reason: message,
            },

            CoreError::NotFound { kind, identifier } => CliError::NotFound {
                resource_type: kind.to_string(),
                identifier,
                list_command: list_command(kind).into(),
            },

            e @ CoreError::Auth { .. } if e.is_not_signed_in() => CliError::NotSignedIn,
            CoreError::Auth { message } => CliError::AuthFailed { message },

            CoreError::Transport { message } => CliError::Transport { message },

            CoreError::Config { message } => CliError::Validation {
                field: "endpoint".into(),
                reason: message,
            },

            CoreError::Store { message } => CliError::SessionStore { message },
        }
    }
}
