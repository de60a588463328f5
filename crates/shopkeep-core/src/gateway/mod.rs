// ── Resource data gateway ──
//
// The sole boundary to the backing store. Every call is one
// request/response exchange that either fully succeeds or fully fails.

mod remote;
#[cfg(any(test, feature = "memory"))]
mod memory;

pub use remote::RemoteGateway;
#[cfg(any(test, feature = "memory"))]
pub use memory::{CallCounts, MemoryBackend};

use std::future::Future;

use secrecy::SecretString;

use crate::error::CoreError;
use crate::model::{Account, CatalogItem, EntityId, Resource};
use crate::session::Actor;

/// Typed CRUD over one resource collection.
pub trait ResourceGateway<R: Resource>: Send + Sync {
    fn list(&self) -> impl Future<Output = Result<Vec<R>, CoreError>> + Send;

    fn get(&self, id: &EntityId) -> impl Future<Output = Result<R, CoreError>> + Send;

    /// Fails with `Validation` if the backend rejects the payload.
    fn create(&self, input: R::Create) -> impl Future<Output = Result<R, CoreError>> + Send;

    /// Changes only the fields present in `patch`.
    fn update(
        &self,
        id: &EntityId,
        patch: R::Patch,
    ) -> impl Future<Output = Result<R, CoreError>> + Send;

    /// Returns the id the backend reports as removed. A second delete of
    /// the same id fails with `NotFound`.
    fn delete(&self, id: &EntityId) -> impl Future<Output = Result<EntityId, CoreError>> + Send;
}

/// Token issuance. Both operations succeed or fail atomically.
pub trait IdentityProvider: Send + Sync {
    fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> impl Future<Output = Result<(Actor, SecretString), CoreError>> + Send;

    fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> impl Future<Output = Result<(Actor, SecretString), CoreError>> + Send;
}

/// Everything the console needs from its backend.
pub trait Backend:
    ResourceGateway<Account> + ResourceGateway<CatalogItem> + IdentityProvider + 'static
{
}

impl<T> Backend for T where
    T: ResourceGateway<Account> + ResourceGateway<CatalogItem> + IdentityProvider + 'static
{
}
