//! Command dispatch: bridges CLI args -> console operations -> output formatting.

pub mod accounts;
pub mod config_cmd;
pub mod items;
pub mod session;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::CliConsole;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &CliConsole,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Register(args) => session::register(console, args, global).await,
        Command::Login(args) => session::login(console, args, global).await,
        Command::Logout => session::logout(console, global),
        Command::Whoami => session::whoami(console, global),
        Command::Accounts(args) => accounts::handle(console, args, global).await,
        Command::Items(args) => items::handle(console, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
