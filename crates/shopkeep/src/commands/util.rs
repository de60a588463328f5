//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use secrecy::SecretString;
use shopkeep_core::{
    ConfirmPrompt, Confirmer, DeleteOutcome, Draft, FormMachine, Managed, RemoteGateway,
    ResourceGateway, SubmitOutcome,
};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::config::CliConsole;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

/// Use the flag value, or prompt without echo.
pub fn password(flag: Option<String>, prompt: &str) -> Result<SecretString, CliError> {
    let raw = match flag {
        Some(value) => value,
        None => rpassword::prompt_password(prompt).map_err(prompt_err)?,
    };
    Ok(SecretString::from(raw))
}

// ── Confirmation ────────────────────────────────────────────────────

/// dialoguer-backed confirmation, auto-approving with `--yes`.
///
/// Without a terminal the prompt is not shown and the answer is no;
/// `blocked` records that so the caller can report it.
pub struct PromptConfirmer {
    yes: bool,
    blocked: bool,
}

impl PromptConfirmer {
    pub fn new(yes: bool) -> Self {
        Self {
            yes,
            blocked: false,
        }
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }
}

impl Confirmer for PromptConfirmer {
    async fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        if self.yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            self.blocked = true;
            return false;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt.to_string())
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                debug!(error = %e, "confirmation prompt failed");
                false
            })
    }
}

// ── Form submission ─────────────────────────────────────────────────

/// Submit a form through the console and unwrap the saved entity.
pub async fn submit<D>(
    console: &CliConsole,
    form: &mut FormMachine<D>,
) -> Result<D::Target, CliError>
where
    D: Draft,
    D::Target: Managed,
    RemoteGateway: ResourceGateway<D::Target>,
{
    match console.submit(form).await {
        SubmitOutcome::Saved(entity) => Ok(entity),
        SubmitOutcome::Invalid(err) | SubmitOutcome::Rejected(err) => Err(err.into()),
        // A one-shot command never closes the form mid-flight.
        SubmitOutcome::Ignored | SubmitOutcome::Discarded { .. } => Err(CliError::Refused {
            message: "the write was not completed".into(),
        }),
    }
}

// ── Delete flow ─────────────────────────────────────────────────────

/// Run the destructive flow against `target` and report the outcome.
///
/// Returns `Ok(true)` when the entity was deleted.
pub async fn delete<R>(
    console: &CliConsole,
    target: &R,
    global: &GlobalOpts,
) -> Result<bool, CliError>
where
    R: Managed,
    RemoteGateway: ResourceGateway<R>,
{
    let mut confirmer = PromptConfirmer::new(global.yes);
    let outcome = console.delete_with(target, &mut confirmer).await;
    let color = output::should_color(global.no_color);

    match outcome {
        DeleteOutcome::Refused(note) => Err(CliError::Refused {
            message: note.message,
        }),
        DeleteOutcome::Cancelled if confirmer.blocked() => Err(CliError::NonInteractiveRequiresYes {
            action: format!("delete {}", R::KIND),
        }),
        DeleteOutcome::Cancelled => {
            if !global.quiet {
                eprintln!("Cancelled");
            }
            Ok(false)
        }
        DeleteOutcome::Deleted { notification, .. } => {
            output::print_notification(&notification, global.quiet, color);
            Ok(true)
        }
        DeleteOutcome::Failed {
            error,
            notification,
        } => {
            output::print_notification(&notification, global.quiet, color);
            Err(error.into())
        }
    }
}
