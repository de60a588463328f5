// ── Console facade ──
//
// Owns the session, the backend and one collection view per resource
// kind. Front ends drive forms and deletes through it so that every
// gateway failure goes through the same recovery policy:
//
// - auth      → tear the session down
// - not found → notify and force a refetch of that collection
// - otherwise → notify only; the operator decides whether to retry

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};

use crate::delete::{Confirmer, DeleteOutcome, DeleteRequest, request_delete, run_delete};
use crate::error::{CoreError, ErrorKind};
use crate::form::{Draft, FormMachine, SubmitOutcome, validate_email, validate_name};
use crate::gateway::{Backend, ResourceGateway};
use crate::model::{Account, CatalogItem, EntityId, Resource, ResourceKind};
use crate::notify::Notification;
use crate::session::{Actor, SessionState};
use crate::store::CollectionView;

/// Resources with a view on the console.
pub trait Managed: Resource {
    fn view<B: Backend>(console: &Console<B>) -> &CollectionView<Self>;
}

impl Managed for Account {
    fn view<B: Backend>(console: &Console<B>) -> &CollectionView<Self> {
        &console.accounts
    }
}

impl Managed for CatalogItem {
    fn view<B: Backend>(console: &Console<B>) -> &CollectionView<Self> {
        &console.items
    }
}

pub struct Console<B: Backend> {
    session: SessionState,
    backend: Arc<B>,
    accounts: CollectionView<Account>,
    items: CollectionView<CatalogItem>,
}

impl<B: Backend> Console<B> {
    pub fn new(backend: Arc<B>, session: SessionState) -> Self {
        Self {
            session,
            backend,
            accounts: CollectionView::new(),
            items: CollectionView::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn accounts(&self) -> &CollectionView<Account> {
        &self.accounts
    }

    pub fn items(&self) -> &CollectionView<CatalogItem> {
        &self.items
    }

    pub fn view<R: Managed>(&self) -> &CollectionView<R> {
        R::view(self)
    }

    /// Restore the persisted session. Returns the authenticated flag.
    pub fn initialize(&self) -> bool {
        self.session.initialize()
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Register and adopt the issued session.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<Actor, CoreError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        let (actor, token) = self.backend.register(&name, &email, password).await?;
        self.session.establish(actor.clone(), token)?;
        info!(actor = %actor.id, "registered");
        Ok(actor)
    }

    pub async fn login(&self, email: &str, password: SecretString) -> Result<Actor, CoreError> {
        let email = validate_email(email)?;
        let (actor, token) = self.backend.login(&email, password).await?;
        self.session.establish(actor.clone(), token)?;
        Ok(actor)
    }

    /// Clear the session (memory and store) and forget loaded rows.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.accounts.reset();
        self.items.reset();
        self.session.teardown()
    }

    // ── Collections ──────────────────────────────────────────────────

    /// Refetch one collection, applying the recovery policy on failure.
    pub async fn refresh<R: Managed>(&self) -> Result<usize, CoreError>
    where
        B: ResourceGateway<R>,
    {
        let result = R::view(self).refresh(&*self.backend).await;
        if let Err(e) = &result {
            if e.kind() == ErrorKind::Auth {
                self.end_session();
            }
        }
        result
    }

    /// Fetch one entity by id. An auth failure ends the session.
    pub async fn fetch<R: Managed>(&self, id: &EntityId) -> Result<R, CoreError>
    where
        B: ResourceGateway<R>,
    {
        let result = ResourceGateway::<R>::get(&*self.backend, id).await;
        if let Err(e) = &result {
            if e.kind() == ErrorKind::Auth {
                self.end_session();
            }
        }
        result
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Submit a form; on success the collection has been refetched.
    pub async fn submit<D>(&self, form: &mut FormMachine<D>) -> SubmitOutcome<D::Target>
    where
        D: Draft,
        D::Target: Managed,
        B: ResourceGateway<D::Target>,
    {
        let outcome = form
            .submit(&*self.backend, <D::Target as Managed>::view(self))
            .await;
        if let SubmitOutcome::Rejected(err) = &outcome {
            self.recover(D::Target::KIND, err).await;
        }
        if outcome.wrote() {
            self.check_refetch::<D::Target>();
        }
        outcome
    }

    /// Self-protection check for a delete.
    pub fn request_delete<R: Managed>(
        &self,
        target: &R,
    ) -> Result<DeleteRequest<R>, DeleteOutcome> {
        request_delete(target, &self.session)
    }

    /// Execute a confirmed delete request.
    pub async fn delete<R: Managed>(&self, request: DeleteRequest<R>) -> DeleteOutcome
    where
        B: ResourceGateway<R>,
    {
        let outcome = request.execute(&*self.backend, R::view(self)).await;
        self.settle_delete::<R>(&outcome).await;
        outcome
    }

    /// Full delete flow with an interactive confirmer.
    pub async fn delete_with<R, C>(&self, target: &R, confirmer: &mut C) -> DeleteOutcome
    where
        R: Managed,
        B: ResourceGateway<R>,
        C: Confirmer,
    {
        let outcome = run_delete(
            target,
            &self.session,
            &*self.backend,
            R::view(self),
            confirmer,
        )
        .await;
        self.settle_delete::<R>(&outcome).await;
        outcome
    }

    // ── Error policy ─────────────────────────────────────────────────

    /// Apply the recovery policy for a failed gateway call and return
    /// the notification to show. Never fatal.
    pub async fn recover(&self, kind: ResourceKind, err: &CoreError) -> Notification {
        match err.kind() {
            ErrorKind::Auth => {
                self.end_session();
                Notification::error("Signed out", "Your session has expired. Please log in again.")
            }
            ErrorKind::NotFound => {
                let refreshed = match kind {
                    ResourceKind::Account => self.accounts.refresh(&*self.backend).await,
                    ResourceKind::CatalogItem => self.items.refresh(&*self.backend).await,
                };
                if let Err(e) = refreshed {
                    warn!(error = %e, "refetch after not-found failed");
                }
                Notification::info("Already gone", err.to_string())
            }
            ErrorKind::Validation => Notification::error("Invalid input", err.to_string()),
            ErrorKind::Transport | ErrorKind::Local => {
                Notification::error("Error!", err.to_string())
            }
        }
    }

    async fn settle_delete<R: Managed>(&self, outcome: &DeleteOutcome) {
        match outcome {
            DeleteOutcome::Failed { error, .. } => {
                self.recover(R::KIND, error).await;
            }
            DeleteOutcome::Deleted { .. } => self.check_refetch::<R>(),
            DeleteOutcome::Refused(_) | DeleteOutcome::Cancelled => {}
        }
    }

    /// The write stands either way, but a refetch that lost the session
    /// still ends it.
    fn check_refetch<R: Managed>(&self) {
        if let Some(err) = R::view(self).failure() {
            if err.kind() == ErrorKind::Auth {
                self.end_session();
            }
        }
    }

    fn end_session(&self) {
        warn!("backend rejected the session token; signing out");
        self.accounts.reset();
        self.items.reset();
        if let Err(e) = self.session.teardown() {
            warn!(error = %e, "could not clear the persisted session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::form::{AccountDraft, CatalogItemDraft};
    use crate::gateway::MemoryBackend;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::store::ViewState;

    fn console() -> (Console<MemoryBackend>, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        let session = SessionState::new(store.clone());
        (Console::new(Arc::new(MemoryBackend::new()), session), store)
    }

    #[tokio::test]
    async fn register_then_logout() {
        let (console, store) = console();

        let actor = console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();

        assert!(console.session().is_authenticated());
        assert_eq!(console.session().actor_id(), Some(actor.id.clone()));
        let record = store.load().unwrap().unwrap();
        assert_eq!(record.actor_id.as_deref(), Some(actor.id.as_str()));
        assert_eq!(record.name.as_deref(), Some("Ana"));

        console.logout().unwrap();

        assert!(!console.session().is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn restart_restores_registered_session() {
        let (console, store) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();

        let restarted = Console::new(
            Arc::new(MemoryBackend::new()),
            SessionState::new(store.clone()),
        );

        assert!(restarted.initialize());
        assert_eq!(
            restarted.session().token().unwrap().expose_secret(),
            console.session().token().unwrap().expose_secret()
        );
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_auth_error() {
        let (console, _) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();
        console.logout().unwrap();

        let err = console
            .login("ana@x.com", SecretString::from("nope".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(!console.session().is_authenticated());
    }

    #[tokio::test]
    async fn auth_failure_tears_session_down() {
        let (console, store) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();
        console.backend().fail_next(CoreError::Auth {
            message: "Invalid or expired token".into(),
        });

        let mut form = FormMachine::<CatalogItemDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Kopi".into();
        draft.price = "1000".into();
        draft.stock = "1".into();
        let outcome = console.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert!(!console.session().is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn expired_token_on_refetch_after_save_ends_session() {
        let (console, store) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();
        console.backend().fail_next_list(CoreError::Auth {
            message: "Invalid or expired token".into(),
        });

        let mut form = FormMachine::<CatalogItemDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Kopi".into();
        draft.price = "1000".into();
        draft.stock = "1".into();
        let outcome = console.submit(&mut form).await;

        // The write went through; only the refetch was refused.
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(console.backend().items.creates(), 1);
        assert!(!console.session().is_authenticated());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn expired_token_on_refetch_after_delete_ends_session() {
        let (console, _) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();
        let teh = console.backend().seed_item("Teh", 5_000.0, 2);
        console.backend().fail_next_list(CoreError::Auth {
            message: "Invalid or expired token".into(),
        });

        let request = console.request_delete(&teh).unwrap();
        let outcome = console.delete(request).await;

        assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
        assert!(!console.session().is_authenticated());
        assert!(matches!(console.items().current(), ViewState::Idle));
    }

    #[tokio::test]
    async fn transport_error_on_refetch_keeps_session() {
        let (console, _) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();
        let teh = console.backend().seed_item("Teh", 5_000.0, 2);
        console.backend().fail_next_list(CoreError::Transport {
            message: "connection reset".into(),
        });

        let request = console.request_delete(&teh).unwrap();
        let outcome = console.delete(request).await;

        assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
        assert!(console.session().is_authenticated());
        assert!(matches!(console.items().current(), ViewState::Failed { .. }));
    }

    #[tokio::test]
    async fn not_found_forces_refresh() {
        let (console, _) = console();
        let gone = console.backend().seed_item("Teh", 5_000.0, 2);
        console.refresh::<CatalogItem>().await.unwrap();
        ResourceGateway::<CatalogItem>::delete(console.backend(), &gone.id)
            .await
            .unwrap();
        let lists_before = console.backend().items.lists();

        let mut form = FormMachine::<CatalogItemDraft>::new();
        form.open_edit(&gone);
        form.draft_mut().unwrap().stock = "3".into();
        let outcome = console.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(CoreError::NotFound { .. })));
        assert_eq!(console.backend().items.lists(), lists_before + 1);
        assert!(console.items().items().is_empty());
    }

    #[tokio::test]
    async fn create_account_refreshes_view() {
        let (console, _) = console();
        console
            .register("Ana", "ana@x.com", SecretString::from("p1".to_string()))
            .await
            .unwrap();

        let mut form = FormMachine::<AccountDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Budi".into();
        draft.email = "budi@x.com".into();
        draft.password = "pw".into();
        let outcome = console.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        let ViewState::Loaded { items, .. } = console.accounts().current() else {
            panic!("expected loaded view");
        };
        let names: Vec<&str> = items.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Budi"));
    }

    #[tokio::test]
    async fn fetch_reads_one_entity() {
        let (console, _) = console();
        let item = console.backend().seed_item("Kopi", 1_500_000.0, 7);

        let got: CatalogItem = console.fetch(&item.id).await.unwrap();
        assert_eq!(got, item);

        let err = console
            .fetch::<CatalogItem>(&EntityId::from("ffffffffffffffffffffffff"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
