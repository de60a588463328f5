//! Account command handlers.

use tabled::Tabled;

use shopkeep_core::{Account, AccountDraft, Draft, EntityId, FormMachine, Notification};

use crate::cli::{AccountsArgs, AccountsCommand, GlobalOpts, OutputFormat};
use crate::config::CliConsole;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&Account> for AccountRow {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id.to_string(),
            name: a.name.clone(),
            email: a.email.clone(),
        }
    }
}

fn detail(a: &Account) -> String {
    format!("ID:     {}\nName:   {}\nEmail:  {}", a.id, a.name, a.email)
}

/// Print the current contents of the accounts view.
fn print_collection(console: &CliConsole, global: &GlobalOpts) {
    let rows = console.accounts().items();
    let out = output::render_list(
        &global.output,
        &rows,
        |a| AccountRow::from(a),
        |a| a.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

/// After a write: the refreshed table, or the entity for scripting formats.
fn print_written(console: &CliConsole, account: &Account, verb: &str, global: &GlobalOpts) {
    if matches!(global.output, OutputFormat::Table) {
        let note = Notification::success("Saved", format!("Account {} {verb}.", account.email));
        output::print_notification(&note, global.quiet, output::should_color(global.no_color));
        print_collection(console, global);
    } else {
        let out = output::render_single(&global.output, account, detail, |a| a.id.to_string());
        output::print_output(&out, global.quiet);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &CliConsole,
    args: AccountsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccountsCommand::List => {
            console.refresh::<Account>().await?;
            print_collection(console, global);
            Ok(())
        }

        AccountsCommand::Get { id } => {
            let account: Account = console.fetch(&EntityId::from(id)).await?;
            let out = output::render_single(&global.output, &account, detail, |a| a.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountsCommand::Create {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => {
                    rpassword::prompt_password("Password for the new account: ")
                        .map_err(util::prompt_err)?
                }
            };

            let mut form = FormMachine::<AccountDraft>::new();
            form.open_create();
            if let Some(draft) = form.draft_mut() {
                draft.name = name;
                draft.email = email;
                draft.password = password;
            }
            let account = util::submit(console, &mut form).await?;
            print_written(console, &account, "created", global);
            Ok(())
        }

        AccountsCommand::Update {
            id,
            name,
            email,
            password,
        } => {
            if name.is_none() && email.is_none() && password.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "pass at least one of --name, --email, --password".into(),
                });
            }

            let current: Account = console.fetch(&EntityId::from(id)).await?;
            let mut form = FormMachine::<AccountDraft>::new();
            form.open_edit(&current);
            if let Some(draft) = form.draft_mut() {
                for (key, value) in [("name", name), ("email", email), ("password", password)] {
                    if let Some(value) = value {
                        draft.set(key, value);
                    }
                }
            }
            let account = util::submit(console, &mut form).await?;
            print_written(console, &account, "updated", global);
            Ok(())
        }

        AccountsCommand::Delete { id } => {
            let target: Account = console.fetch(&EntityId::from(id)).await?;
            if util::delete(console, &target, global).await?
                && matches!(global.output, OutputFormat::Table)
            {
                print_collection(console, global);
            }
            Ok(())
        }
    }
}
