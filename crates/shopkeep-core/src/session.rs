// ── Session state ──
//
// The only shared mutable state in the engine. A session is either
// anonymous or fully authenticated; a persisted record missing any of
// its four fields loads as anonymous. Readers take lock-free snapshots
// through `ArcSwap`; only `initialize`, `establish` and `teardown` write.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::EntityId;

/// The operator behind the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

/// Current authentication state.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { actor: Actor, token: SecretString },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Authenticated { actor, .. } => Some(actor),
            Self::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&SecretString> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }
}

// ── Persistence ─────────────────────────────────────────────────────

/// The persisted four-field record, exactly as stored.
///
/// Every field is optional on read so that a damaged or half-written
/// record can be recognised and treated as "not authenticated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
}

impl StoredSession {
    pub fn from_parts(actor: &Actor, token: &SecretString) -> Self {
        Self {
            token: Some(token.expose_secret().to_owned()),
            name: Some(actor.name.clone()),
            email: Some(actor.email.clone()),
            actor_id: Some(actor.id.to_string()),
        }
    }

    /// All four fields present and non-empty, or `Anonymous`.
    pub fn into_session(self) -> Session {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (
            present(self.token),
            present(self.name),
            present(self.email),
            present(self.actor_id),
        ) {
            (Some(token), Some(name), Some(email), Some(id)) => Session::Authenticated {
                actor: Actor {
                    id: EntityId::from(id),
                    name,
                    email,
                },
                token: SecretString::from(token),
            },
            _ => Session::Anonymous,
        }
    }
}

/// Backing store for the persisted session record.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>, CoreError>;
    fn save(&self, record: &StoredSession) -> Result<(), CoreError>;
    /// Remove the record entirely. Clearing an absent record succeeds.
    fn clear(&self) -> Result<(), CoreError>;
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn with_record(record: StoredSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        Ok(self.record.lock().expect("session lock poisoned").clone())
    }

    fn save(&self, record: &StoredSession) -> Result<(), CoreError> {
        *self.record.lock().expect("session lock poisoned") = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.record.lock().expect("session lock poisoned") = None;
        Ok(())
    }
}

// ── SessionState ────────────────────────────────────────────────────

/// Explicitly passed session context shared by the gateway and the views.
///
/// Cloning is cheap; clones observe the same session.
#[derive(Clone)]
pub struct SessionState {
    current: Arc<ArcSwap<Session>>,
    store: Arc<dyn SessionStore>,
}

impl SessionState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(Session::Anonymous)),
            store,
        }
    }

    /// Load the persisted record into memory.
    ///
    /// Returns the authenticated flag. An unreadable store counts as
    /// "not authenticated"; it never aborts start-up.
    pub fn initialize(&self) -> bool {
        let session = match self.store.load() {
            Ok(Some(record)) => record.into_session(),
            Ok(None) => Session::Anonymous,
            Err(e) => {
                warn!(error = %e, "could not read persisted session");
                Session::Anonymous
            }
        };
        let authenticated = session.is_authenticated();
        if let Some(actor) = session.actor() {
            info!(actor = %actor.id, "restored session");
        }
        self.current.store(Arc::new(session));
        authenticated
    }

    /// Persist and adopt a freshly issued session.
    ///
    /// The in-memory session only changes once the store accepted the
    /// record, so memory and store never disagree.
    pub fn establish(&self, actor: Actor, token: SecretString) -> Result<(), CoreError> {
        self.store.save(&StoredSession::from_parts(&actor, &token))?;
        info!(actor = %actor.id, "session established");
        self.current
            .store(Arc::new(Session::Authenticated { actor, token }));
        Ok(())
    }

    /// Clear memory and the persisted record.
    ///
    /// Memory is cleared first and unconditionally; a store failure is
    /// still reported.
    pub fn teardown(&self) -> Result<(), CoreError> {
        self.current.store(Arc::new(Session::Anonymous));
        info!("session cleared");
        self.store.clear()
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Arc<Session> {
        self.current.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_authenticated()
    }

    pub fn actor(&self) -> Option<Actor> {
        self.current.load().actor().cloned()
    }

    pub fn actor_id(&self) -> Option<EntityId> {
        self.current.load().actor().map(|a| a.id.clone())
    }

    pub fn token(&self) -> Option<SecretString> {
        self.current.load().token().cloned()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("current", &self.current.load())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn full_record() -> StoredSession {
        StoredSession {
            token: Some("jwt".into()),
            name: Some("Ana".into()),
            email: Some("ana@x.com".into()),
            actor_id: Some("u1".into()),
        }
    }

    #[test]
    fn initialize_restores_complete_record() {
        let store = Arc::new(MemorySessionStore::with_record(full_record()));
        let state = SessionState::new(store);

        assert!(state.initialize());
        assert_eq!(state.actor_id(), Some(EntityId::from("u1")));
        assert_eq!(state.token().unwrap().expose_secret(), "jwt");
    }

    #[test]
    fn partial_record_is_anonymous() {
        for strip in 0..4 {
            let mut record = full_record();
            match strip {
                0 => record.token = None,
                1 => record.name = None,
                2 => record.email = Some(String::new()),
                _ => record.actor_id = None,
            }
            let state = SessionState::new(Arc::new(MemorySessionStore::with_record(record)));
            assert!(!state.initialize(), "field {strip} missing must not authenticate");
            assert!(state.actor().is_none());
        }
    }

    #[test]
    fn record_keys_match_the_persisted_layout() {
        let value = serde_json::to_value(full_record()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "token": "jwt",
                "name": "Ana",
                "email": "ana@x.com",
                "user_id": "u1",
            })
        );

        let partial: StoredSession = serde_json::from_str(r#"{"token":"jwt"}"#).unwrap();
        assert_eq!(partial.actor_id, None);
    }

    #[test]
    fn empty_store_is_anonymous() {
        let state = SessionState::new(Arc::new(MemorySessionStore::default()));
        assert!(!state.initialize());
    }

    #[test]
    fn establish_then_teardown_clears_memory_and_store() {
        let store = Arc::new(MemorySessionStore::default());
        let state = SessionState::new(store.clone());
        let actor = Actor {
            id: EntityId::from("u7"),
            name: "Budi".into(),
            email: "budi@x.com".into(),
        };

        state
            .establish(actor.clone(), SecretString::from("tok".to_string()))
            .unwrap();
        assert!(state.is_authenticated());
        assert_eq!(
            store.load().unwrap().unwrap().actor_id.as_deref(),
            Some("u7")
        );

        state.teardown().unwrap();
        assert!(!state.is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn clones_share_the_session() {
        let state = SessionState::new(Arc::new(MemorySessionStore::default()));
        let other = state.clone();
        state
            .establish(
                Actor {
                    id: EntityId::from("u1"),
                    name: "Ana".into(),
                    email: "ana@x.com".into(),
                },
                SecretString::from("t".to_string()),
            )
            .unwrap();
        assert!(other.is_authenticated());
    }
}
