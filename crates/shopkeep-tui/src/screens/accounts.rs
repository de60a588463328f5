//! Accounts tab.

use ratatui::layout::Constraint;

use shopkeep_core::{Account, AccountDraft, CoreError, Submission, ViewState};

use super::resource::{ResourceScreen, Tabular};
use crate::action::Action;
use crate::screen::ScreenId;

pub type AccountsScreen = ResourceScreen<Account>;

impl Tabular for Account {
    type Form = AccountDraft;

    const SCREEN: ScreenId = ScreenId::Accounts;
    const HEADERS: &'static [&'static str] = &["Name", "Email", "ID"];

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Min(18),
            Constraint::Min(24),
            Constraint::Length(26),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.email.clone(), self.id.to_string()]
    }

    fn view_update(action: &Action) -> Option<&ViewState<Self>> {
        match action {
            Action::AccountsUpdated(state) => Some(state),
            _ => None,
        }
    }

    fn write_result(action: &Action) -> Option<(u64, &Result<Self, CoreError>)> {
        match action {
            Action::AccountWritten { ticket, result } => Some((*ticket, result)),
            _ => None,
        }
    }

    fn submit_action(submission: Submission<Self>) -> Action {
        Action::SubmitAccount(submission)
    }

    fn delete_action(target: Self) -> Action {
        Action::DeleteAccount(target)
    }
}
