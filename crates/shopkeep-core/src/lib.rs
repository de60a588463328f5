//! Resource administration engine between `shopkeep-api` and the front
//! ends (CLI / TUI).
//!
//! - **[`SessionState`]**: explicitly passed session context,
//!   `Anonymous | Authenticated { actor, token }`, backed by a
//!   [`SessionStore`] holding the four persisted fields.
//!
//! - **[`ResourceGateway`]**: typed list/get/create/update/delete per
//!   resource kind. [`RemoteGateway`] talks GraphQL; with the `memory`
//!   feature, `MemoryBackend` runs the same contract in-process.
//!
//! - **[`FormMachine`]**: the create/edit modal lifecycle with field
//!   validation, a double-submit guard and ticketed results.
//!
//! - **[`delete`]**: self-protection, confirmation, delete, refetch.
//!
//! - **[`CollectionView`]**: watch-backed refetch-after-write snapshots.
//!
//! - **[`Console`]**: ties the above together and applies the error
//!   recovery policy.

pub mod console;
pub mod convert;
pub mod delete;
pub mod error;
pub mod form;
pub mod format;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use console::{Console, Managed};
pub use delete::{Confirmer, DeleteOutcome, DeleteRequest};
pub use error::{CoreError, ErrorKind};
pub use form::{
    AccountDraft, Begin, CatalogItemDraft, Draft, FieldSpec, FormMachine, FormMode, FormState,
    SubmitOutcome, Submission, WriteRequest,
};
pub use gateway::{Backend, IdentityProvider, RemoteGateway, ResourceGateway};
#[cfg(any(test, feature = "memory"))]
pub use gateway::{CallCounts, MemoryBackend};
pub use model::{
    Account, AccountPatch, CatalogItem, CatalogItemPatch, EntityId, NewAccount, NewCatalogItem,
    PartialUpdate, Resource, ResourceKind,
};
pub use notify::{ConfirmPrompt, Notification, NotificationLevel};
pub use session::{Actor, MemorySessionStore, Session, SessionState, SessionStore, StoredSession};
pub use store::{CollectionView, ViewState};

// Transport types the front ends need to build a client.
pub use shopkeep_api::{GraphQlClient, TransportConfig};
