//! Screen implementations. Each screen is a top-level Component.

pub mod accounts;
pub mod catalog;
pub mod resource;
pub mod sign_in;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Accounts,
            Box::new(accounts::AccountsScreen::new()),
        ),
        (ScreenId::Catalog, Box::new(catalog::CatalogScreen::new())),
        (ScreenId::SignIn, Box::new(sign_in::SignInScreen::new())),
    ]
}
