// ── Wire ↔ domain conversions ──
//
// The API crate speaks the backend's schema (`_id`, `users`, `products`);
// the engine speaks accounts and catalog items.

use shopkeep_api::models as wire;

use crate::model::{
    Account, AccountPatch, CatalogItem, CatalogItemPatch, EntityId, NewAccount, NewCatalogItem,
};
use crate::session::Actor;

impl From<wire::User> for Account {
    fn from(u: wire::User) -> Self {
        Self {
            id: EntityId::from(u.id),
            name: u.name,
            email: u.email,
        }
    }
}

impl From<wire::User> for Actor {
    fn from(u: wire::User) -> Self {
        Self {
            id: EntityId::from(u.id),
            name: u.name,
            email: u.email,
        }
    }
}

impl From<wire::Product> for CatalogItem {
    fn from(p: wire::Product) -> Self {
        Self {
            id: EntityId::from(p.id),
            name: p.name,
            price: p.price,
            stock: p.stock,
        }
    }
}

impl From<NewAccount> for wire::CreateUserInput {
    fn from(a: NewAccount) -> Self {
        Self {
            name: a.name,
            email: a.email,
            password: a.password,
        }
    }
}

impl From<AccountPatch> for wire::UpdateUserInput {
    fn from(p: AccountPatch) -> Self {
        Self {
            name: p.name,
            email: p.email,
            password: p.password,
        }
    }
}

impl From<NewCatalogItem> for wire::CreateProductInput {
    fn from(i: NewCatalogItem) -> Self {
        Self {
            name: i.name,
            price: i.price,
            stock: i.stock,
        }
    }
}

impl From<CatalogItemPatch> for wire::UpdateProductInput {
    fn from(p: CatalogItemPatch) -> Self {
        Self {
            name: p.name,
            price: p.price,
            stock: p.stock,
        }
    }
}
