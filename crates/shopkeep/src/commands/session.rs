//! Register, login, logout and whoami.

use shopkeep_core::{Actor, Notification};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::config::CliConsole;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(actor: &Actor) -> String {
    format!(
        "ID:     {}\nName:   {}\nEmail:  {}",
        actor.id, actor.name, actor.email
    )
}

fn print_actor(actor: &Actor, global: &GlobalOpts) {
    let out = output::render_single(&global.output, actor, detail, |a| a.id.to_string());
    output::print_output(&out, global.quiet);
}

pub async fn register(
    console: &CliConsole,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = util::password(args.password, "Password: ")?;
    let actor = console.register(&args.name, &args.email, password).await?;

    let note = Notification::success("Registered", format!("Signed in as {}.", actor.email));
    output::print_notification(&note, global.quiet, output::should_color(global.no_color));
    print_actor(&actor, global);
    Ok(())
}

pub async fn login(
    console: &CliConsole,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = util::password(args.password, "Password: ")?;
    let actor = console.login(&args.email, password).await?;

    let note = Notification::success("Signed in", format!("Welcome back, {}.", actor.name));
    output::print_notification(&note, global.quiet, output::should_color(global.no_color));
    print_actor(&actor, global);
    Ok(())
}

pub fn logout(console: &CliConsole, global: &GlobalOpts) -> Result<(), CliError> {
    let was_signed_in = console.session().is_authenticated();
    console.logout()?;

    let note = if was_signed_in {
        Notification::success("Signed out", "The stored session was removed.")
    } else {
        Notification::info("Signed out", "There was no active session.")
    };
    output::print_notification(&note, global.quiet, output::should_color(global.no_color));
    Ok(())
}

pub fn whoami(console: &CliConsole, global: &GlobalOpts) -> Result<(), CliError> {
    let actor = console.session().actor().ok_or(CliError::NotSignedIn)?;
    print_actor(&actor, global);
    Ok(())
}
