//! `shopkeep-tui`: terminal console for shop accounts and the product
//! catalog.
//!
//! Two screens (1 Accounts, 2 Catalog) behind a sign-in screen. Each
//! collection is refetched after every write; a background data bridge
//! forwards the console's view snapshots into the action loop.
//!
//! Logs go to a file (default under the data dir) so the terminal stays
//! clean.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shopkeep_config::{load_config_or_default, parse_endpoint, resolve_profile};
use shopkeep_core::{Console, GraphQlClient, RemoteGateway, SessionState};

use crate::app::App;

/// Terminal console for administering accounts and catalog items.
#[derive(Parser, Debug)]
#[command(name = "shopkeep-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "SHOPKEEP_PROFILE")]
    profile: Option<String>,

    /// GraphQL endpoint, overrides the profile
    #[arg(short, long, env = "SHOPKEEP_ENDPOINT")]
    endpoint: Option<String>,

    /// Log file path (defaults to <data dir>/shopkeep-tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the terminal UI. Hold the
/// returned guard until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("shopkeep_tui={log_level},shopkeep_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| shopkeep_config::data_dir().join("shopkeep-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(std::env::temp_dir, std::path::Path::to_path_buf);
    let log_name = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("shopkeep-tui.log"))
        .to_owned();

    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Console for the selected profile, with any persisted session restored.
fn build_console(cli: &Cli) -> Result<(Console<RemoteGateway>, String)> {
    let cfg = load_config_or_default();
    let name = cli
        .profile
        .clone()
        .unwrap_or_else(|| shopkeep_config::active_profile_name(&cfg));
    let mut settings = resolve_profile(&cfg, &name)?;
    if let Some(ref raw) = cli.endpoint {
        settings.endpoint = parse_endpoint(raw)?;
    }

    let client = GraphQlClient::new(settings.endpoint.clone(), &settings.transport)
        .wrap_err("could not build the HTTP client")?;
    let session = SessionState::new(Arc::new(settings.session_store()));
    let gateway = RemoteGateway::new(Arc::new(client), session.clone());
    let console = Console::new(Arc::new(gateway), session);

    let restored = console.initialize();
    debug!(profile = %settings.name, restored, "console ready");
    Ok((console, settings.endpoint.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so a panic restores the terminal.
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let (console, endpoint) = build_console(&cli)?;
    info!(%endpoint, "starting shopkeep-tui");

    let mut app = App::new(Arc::new(console), endpoint);
    app.run().await?;

    Ok(())
}
