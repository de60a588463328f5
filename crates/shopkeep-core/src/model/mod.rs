// ── Domain model ──
//
// Canonical types shared by the CLI and TUI. Wire types from
// `shopkeep-api` are converted in `crate::convert`.

mod account;
mod catalog;
mod entity_id;

pub use account::{Account, AccountPatch, NewAccount};
pub use catalog::{CatalogItem, CatalogItemPatch, NewCatalogItem};
pub use entity_id::EntityId;

use strum::{Display, EnumString, IntoStaticStr};

/// The managed resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    #[strum(serialize = "account")]
    Account,
    #[strum(serialize = "product")]
    CatalogItem,
}

/// A patch for `update`; empty means nothing would change.
pub trait PartialUpdate {
    fn is_empty(&self) -> bool;
}

/// Ties a model type to its kind and its write payloads.
pub trait Resource: std::fmt::Debug + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    /// Payload accepted by `create`.
    type Create: std::fmt::Debug + Send + Sync + 'static;
    /// Partial payload accepted by `update`.
    type Patch: PartialUpdate + std::fmt::Debug + Send + Sync + 'static;

    /// Deleting an entity whose id equals the actor's is refused.
    const SELF_PROTECTED: bool = false;

    fn id(&self) -> &EntityId;

    /// Human label used in prompts and notifications.
    fn label(&self) -> &str;
}

impl Resource for Account {
    const KIND: ResourceKind = ResourceKind::Account;
    const SELF_PROTECTED: bool = true;
    type Create = NewAccount;
    type Patch = AccountPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Resource for CatalogItem {
    const KIND: ResourceKind = ResourceKind::CatalogItem;
    type Create = NewCatalogItem;
    type Patch = CatalogItemPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
