use secrecy::SecretString;
use serde::Serialize;

use super::{EntityId, PartialUpdate};

/// An operator account. The password is write-only and never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

/// Writable fields for `create`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Partial update: only `Some` fields are sent.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

impl PartialUpdate for AccountPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}
