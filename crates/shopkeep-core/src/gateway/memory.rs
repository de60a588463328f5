// In-process backend honouring the gateway contract.
//
// Mirrors the server's rules: duplicate emails and negative amounts are
// rejected, missing ids report `NotFound`, and register/login issue
// opaque tokens. A one-shot failure can be injected to exercise the
// console's error policy.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use secrecy::{ExposeSecret, SecretString};

use super::{IdentityProvider, ResourceGateway};
use crate::error::CoreError;
use crate::model::{
    Account, AccountPatch, CatalogItem, CatalogItemPatch, EntityId, NewAccount, NewCatalogItem,
    Resource,
};
use crate::session::Actor;

/// Number of calls observed per operation.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl CallCounts {
    pub fn lists(&self) -> usize {
        self.list.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.update.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.creates() + self.updates() + self.deletes()
    }
}

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<EntityId, Account>,
    passwords: BTreeMap<EntityId, String>,
    items: BTreeMap<EntityId, CatalogItem>,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    next_id: AtomicU64,
    fail_next: Mutex<Option<CoreError>>,
    fail_next_list: Mutex<Option<CoreError>>,
    pub accounts: CallCounts,
    pub items: CallCounts,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next gateway call fail with `err`.
    pub fn fail_next(&self, err: CoreError) {
        *self.fail_next.lock().expect("failure lock poisoned") = Some(err);
    }

    /// Make the next `list` call (of either kind) fail with `err`; writes
    /// and reads by id are unaffected.
    pub fn fail_next_list(&self, err: CoreError) {
        *self.fail_next_list.lock().expect("failure lock poisoned") = Some(err);
    }

    /// Insert an account directly, bypassing validation and call counts.
    pub fn seed_account(&self, name: &str, email: &str) -> Account {
        let account = Account {
            id: self.mint_id(),
            name: name.to_owned(),
            email: email.to_owned(),
        };
        let mut tables = self.lock();
        tables.accounts.insert(account.id.clone(), account.clone());
        account
    }

    pub fn seed_item(&self, name: &str, price: f64, stock: i64) -> CatalogItem {
        let item = CatalogItem {
            id: self.mint_id(),
            name: name.to_owned(),
            price,
            stock,
        };
        self.lock().items.insert(item.id.clone(), item.clone());
        item
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("table lock poisoned")
    }

    fn mint_id(&self) -> EntityId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        EntityId::from(format!("{n:024x}"))
    }

    fn injected(&self) -> Result<(), CoreError> {
        match self.fail_next.lock().expect("failure lock poisoned").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn injected_list(&self) -> Result<(), CoreError> {
        self.injected()?;
        match self.fail_next_list.lock().expect("failure lock poisoned").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn email_taken(tables: &Tables, email: &str, except: Option<&EntityId>) -> bool {
        tables
            .accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(email) && Some(&a.id) != except)
    }

    fn not_found<R: Resource>(id: &EntityId) -> CoreError {
        CoreError::NotFound {
            kind: R::KIND,
            identifier: id.to_string(),
        }
    }
}

fn check_amounts(price: Option<f64>, stock: Option<i64>) -> Result<(), CoreError> {
    if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(CoreError::validation("price", "price must be non-negative"));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(CoreError::validation("stock", "stock must be non-negative"));
    }
    Ok(())
}

impl ResourceGateway<Account> for MemoryBackend {
    async fn list(&self) -> Result<Vec<Account>, CoreError> {
        self.accounts.list.fetch_add(1, Ordering::SeqCst);
        self.injected_list()?;
        Ok(self.lock().accounts.values().cloned().collect())
    }

    async fn get(&self, id: &EntityId) -> Result<Account, CoreError> {
        self.injected()?;
        self.lock()
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found::<Account>(id))
    }

    async fn create(&self, input: NewAccount) -> Result<Account, CoreError> {
        self.accounts.create.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let id = self.mint_id();
        let mut tables = self.lock();
        if Self::email_taken(&tables, &input.email, None) {
            return Err(CoreError::validation("email", "email already exists"));
        }
        let account = Account {
            id: id.clone(),
            name: input.name,
            email: input.email,
        };
        tables
            .passwords
            .insert(id.clone(), input.password.expose_secret().to_owned());
        tables.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn update(&self, id: &EntityId, patch: AccountPatch) -> Result<Account, CoreError> {
        self.accounts.update.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut tables = self.lock();
        if !tables.accounts.contains_key(id) {
            return Err(Self::not_found::<Account>(id));
        }
        if let Some(email) = patch.email.as_deref() {
            if Self::email_taken(&tables, email, Some(id)) {
                return Err(CoreError::validation("email", "email already exists"));
            }
        }
        if let Some(password) = patch.password {
            tables
                .passwords
                .insert(id.clone(), password.expose_secret().to_owned());
        }
        let account = tables
            .accounts
            .get_mut(id)
            .ok_or_else(|| Self::not_found::<Account>(id))?;
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(email) = patch.email {
            account.email = email;
        }
        Ok(account.clone())
    }

    async fn delete(&self, id: &EntityId) -> Result<EntityId, CoreError> {
        self.accounts.delete.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut tables = self.lock();
        tables.passwords.remove(id);
        tables
            .accounts
            .remove(id)
            .map(|a| a.id)
            .ok_or_else(|| Self::not_found::<Account>(id))
    }
}

impl ResourceGateway<CatalogItem> for MemoryBackend {
    async fn list(&self) -> Result<Vec<CatalogItem>, CoreError> {
        self.items.list.fetch_add(1, Ordering::SeqCst);
        self.injected_list()?;
        Ok(self.lock().items.values().cloned().collect())
    }

    async fn get(&self, id: &EntityId) -> Result<CatalogItem, CoreError> {
        self.injected()?;
        self.lock()
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found::<CatalogItem>(id))
    }

    async fn create(&self, input: NewCatalogItem) -> Result<CatalogItem, CoreError> {
        self.items.create.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        check_amounts(Some(input.price), Some(input.stock))?;
        let item = CatalogItem {
            id: self.mint_id(),
            name: input.name,
            price: input.price,
            stock: input.stock,
        };
        self.lock().items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: &EntityId,
        patch: CatalogItemPatch,
    ) -> Result<CatalogItem, CoreError> {
        self.items.update.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        check_amounts(patch.price, patch.stock)?;
        let mut tables = self.lock();
        let item = tables
            .items
            .get_mut(id)
            .ok_or_else(|| Self::not_found::<CatalogItem>(id))?;
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(stock) = patch.stock {
            item.stock = stock;
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: &EntityId) -> Result<EntityId, CoreError> {
        self.items.delete.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.lock()
            .items
            .remove(id)
            .map(|i| i.id)
            .ok_or_else(|| Self::not_found::<CatalogItem>(id))
    }
}

impl IdentityProvider for MemoryBackend {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<(Actor, SecretString), CoreError> {
        self.injected()?;
        let id = self.mint_id();
        let mut tables = self.lock();
        if Self::email_taken(&tables, email, None) {
            return Err(CoreError::validation("email", "email already exists"));
        }
        let account = Account {
            id: id.clone(),
            name: name.to_owned(),
            email: email.to_owned(),
        };
        tables
            .passwords
            .insert(id.clone(), password.expose_secret().to_owned());
        tables.accounts.insert(id.clone(), account.clone());
        let token = SecretString::from(format!("memory-token-{id}"));
        Ok((
            Actor {
                id,
                name: account.name,
                email: account.email,
            },
            token,
        ))
    }

    async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<(Actor, SecretString), CoreError> {
        self.injected()?;
        let tables = self.lock();
        let account = tables
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .filter(|a| {
                tables.passwords.get(&a.id).map(String::as_str) == Some(password.expose_secret())
            })
            .ok_or_else(|| CoreError::Auth {
                message: "invalid email or password".into(),
            })?;
        let token = SecretString::from(format!("memory-token-{}", account.id));
        Ok((
            Actor {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
            },
            token,
        ))
    }
}
