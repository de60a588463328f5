//! Every state change in the TUI travels as an [`Action`].

use secrecy::SecretString;

use shopkeep_core::{
    Account, Actor, CatalogItem, CoreError, Notification, ResourceKind, Submission, ViewState,
};

use crate::screen::ScreenId;

/// What the sign-in screen hands to the app. `name` is set for a
/// registration.
#[derive(Debug)]
pub struct Credentials {
    pub name: Option<String>,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub enum Action {
    // ── Loop ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Session ──
    SignIn(Credentials),
    SignedIn(Actor),
    SignInFailed(String),
    Logout,
    /// The backend rejected the token and the session was torn down.
    SessionEnded,

    // ── Collections ──
    Reload(ResourceKind),
    AccountsUpdated(ViewState<Account>),
    ItemsUpdated(ViewState<CatalogItem>),

    // ── Forms ──
    SubmitAccount(Submission<Account>),
    SubmitItem(Submission<CatalogItem>),
    AccountWritten {
        ticket: u64,
        result: Result<Account, CoreError>,
    },
    ItemWritten {
        ticket: u64,
        result: Result<CatalogItem, CoreError>,
    },
    /// A gateway call failed; apply the recovery policy.
    Recover(ResourceKind, CoreError),

    // ── Deletes ──
    DeleteAccount(Account),
    DeleteItem(CatalogItem),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ──
    Notify(Notification),
    DismissNotification,
}

impl Action {
    /// Actions carrying collection data or write results for a screen
    /// that may not be the active one.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            Self::AccountsUpdated(_)
                | Self::ItemsUpdated(_)
                | Self::AccountWritten { .. }
                | Self::ItemWritten { .. }
                | Self::Tick
        )
    }
}
