// ── CRUD form state machine ──
//
// Idle → Open(Create | Edit) → Submitting → Idle, or back to Open with
// the error attached. The machine itself never awaits: `begin_submit`
// hands out a ticketed `Submission` and `complete` folds the gateway's
// answer back in. Every open/cancel bumps the ticket, so a result for a
// form that has since been closed or reopened is discarded.

mod draft;

pub use draft::{
    AccountDraft, CatalogItemDraft, Draft, FieldSpec, parse_price, parse_stock, validate_email,
    validate_name,
};

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::ResourceGateway;
use crate::model::{EntityId, PartialUpdate, Resource};
use crate::store::CollectionView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Bound to exactly one existing entity, the sole write target.
    Edit(EntityId),
}

/// An open (or submitting) form.
#[derive(Debug, Clone)]
pub struct OpenForm<D: Draft> {
    pub mode: FormMode,
    pub draft: D,
    pub error: Option<CoreError>,
    original: Option<D::Target>,
}

#[derive(Debug, Clone, Default)]
pub enum FormState<D: Draft> {
    #[default]
    Idle,
    Open(OpenForm<D>),
    Submitting(OpenForm<D>),
}

/// A validated write, ready to be sent to the gateway.
#[derive(Debug)]
pub enum WriteRequest<R: Resource> {
    Create(R::Create),
    Update(EntityId, R::Patch),
    /// An edit that changes nothing; saved without a gateway call.
    Unchanged(R),
}

impl<R: Resource> WriteRequest<R> {
    pub async fn dispatch<G: ResourceGateway<R>>(self, gateway: &G) -> Result<R, CoreError> {
        match self {
            Self::Create(input) => gateway.create(input).await,
            Self::Update(id, patch) => gateway.update(&id, patch).await,
            Self::Unchanged(entity) => Ok(entity),
        }
    }
}

/// One in-flight submission.
#[derive(Debug)]
pub struct Submission<R: Resource> {
    pub ticket: u64,
    pub request: WriteRequest<R>,
}

/// Result of a submit attempt.
#[derive(Debug)]
pub enum Begin<R: Resource> {
    Dispatch(Submission<R>),
    /// Not open, or already submitting.
    Ignored,
    /// Local validation failed; the form stays open with the error.
    Invalid(CoreError),
}

/// What the form did with a gateway result.
#[derive(Debug)]
pub enum SubmitOutcome<R> {
    Ignored,
    Invalid(CoreError),
    /// Form closed; the collection must be refetched.
    Saved(R),
    /// Form reopened with the error attached.
    Rejected(CoreError),
    /// The form was cancelled or reopened meanwhile. `saved` tells
    /// whether the write itself went through.
    Discarded { saved: bool },
}

impl<R> SubmitOutcome<R> {
    /// Whether the backing store changed, i.e. a refetch is due.
    pub fn wrote(&self) -> bool {
        matches!(self, Self::Saved(_) | Self::Discarded { saved: true })
    }
}

#[derive(Debug, Default)]
pub struct FormMachine<D: Draft> {
    state: FormState<D>,
    ticket: u64,
}

impl<D: Draft> FormMachine<D> {
    pub fn new() -> Self {
        Self {
            state: FormState::Idle,
            ticket: 0,
        }
    }

    pub fn state(&self) -> &FormState<D> {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, FormState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, FormState::Submitting(_))
    }

    fn open_form(&self) -> Option<&OpenForm<D>> {
        match &self.state {
            FormState::Open(form) | FormState::Submitting(form) => Some(form),
            FormState::Idle => None,
        }
    }

    pub fn mode(&self) -> Option<&FormMode> {
        self.open_form().map(|f| &f.mode)
    }

    pub fn draft(&self) -> Option<&D> {
        self.open_form().map(|f| &f.draft)
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.open_form().and_then(|f| f.error.as_ref())
    }

    /// Editable draft. `None` while idle or submitting.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match &mut self.state {
            FormState::Open(form) => Some(&mut form.draft),
            _ => None,
        }
    }

    /// "Add New": always an empty Create draft, whatever came before.
    pub fn open_create(&mut self) {
        self.ticket += 1;
        self.state = FormState::Open(OpenForm {
            mode: FormMode::Create,
            draft: D::default(),
            error: None,
            original: None,
        });
    }

    /// Edit: copy the entity's fields; secret fields start empty.
    pub fn open_edit(&mut self, entity: &D::Target) {
        self.ticket += 1;
        self.state = FormState::Open(OpenForm {
            mode: FormMode::Edit(entity.id().clone()),
            draft: D::from_entity(entity),
            error: None,
            original: Some(entity.clone()),
        });
    }

    /// Close and drop the draft unconditionally.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            self.ticket += 1;
            self.state = FormState::Idle;
        }
    }

    /// Validate and move to `Submitting`.
    ///
    /// While submitting, further calls are ignored, so at most one
    /// write per form is ever in flight.
    pub fn begin_submit(&mut self) -> Begin<D::Target> {
        let FormState::Open(form) = &mut self.state else {
            if self.is_submitting() {
                debug!(kind = %D::Target::KIND, "submit ignored: already submitting");
            }
            return Begin::Ignored;
        };

        let request = match (&form.mode, &form.original) {
            (FormMode::Edit(id), Some(original)) => {
                form.draft.to_patch(original).map(|patch| {
                    if patch.is_empty() {
                        debug!(kind = %D::Target::KIND, %id, "nothing changed; skipping update");
                        WriteRequest::Unchanged(original.clone())
                    } else {
                        WriteRequest::Update(id.clone(), patch)
                    }
                })
            }
            _ => form.draft.to_create().map(WriteRequest::Create),
        };

        match request {
            Ok(request) => {
                form.error = None;
                let form = form.clone();
                self.state = FormState::Submitting(form);
                Begin::Dispatch(Submission {
                    ticket: self.ticket,
                    request,
                })
            }
            Err(err) => {
                form.error = Some(err.clone());
                Begin::Invalid(err)
            }
        }
    }

    /// Fold a gateway result back in.
    pub fn complete(
        &mut self,
        ticket: u64,
        result: Result<D::Target, CoreError>,
    ) -> SubmitOutcome<D::Target> {
        if ticket != self.ticket || !self.is_submitting() {
            debug!(kind = %D::Target::KIND, ticket, "discarding result of a closed form");
            return SubmitOutcome::Discarded {
                saved: result.is_ok(),
            };
        }

        match result {
            Ok(entity) => {
                self.state = FormState::Idle;
                SubmitOutcome::Saved(entity)
            }
            Err(err) => {
                warn!(kind = %D::Target::KIND, error = %err, "submit rejected");
                if let FormState::Submitting(form) = std::mem::take(&mut self.state) {
                    self.state = FormState::Open(OpenForm {
                        error: Some(err.clone()),
                        ..form
                    });
                }
                SubmitOutcome::Rejected(err)
            }
        }
    }

    /// Submit, await the gateway, and refetch the collection on success.
    pub async fn submit<G: ResourceGateway<D::Target>>(
        &mut self,
        gateway: &G,
        view: &CollectionView<D::Target>,
    ) -> SubmitOutcome<D::Target> {
        let submission = match self.begin_submit() {
            Begin::Dispatch(submission) => submission,
            Begin::Ignored => return SubmitOutcome::Ignored,
            Begin::Invalid(err) => return SubmitOutcome::Invalid(err),
        };

        let result = submission.request.dispatch(gateway).await;
        let outcome = self.complete(submission.ticket, result);
        if outcome.wrote() {
            // The refetch failure is published on the view; the write stands.
            let _ = view.refresh(gateway).await;
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::gateway::MemoryBackend;
    use crate::model::{Account, CatalogItem};

    #[tokio::test]
    async fn create_then_list_contains_entity() {
        let backend = MemoryBackend::new();
        let view = CollectionView::<CatalogItem>::new();
        let mut form = FormMachine::<CatalogItemDraft>::new();

        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Kopi Luwak".into();
        draft.price = "1500000".into();
        draft.stock = "7".into();

        let outcome = form.submit(&backend, &view).await;

        let SubmitOutcome::Saved(item) = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };
        assert!(form.is_idle());
        assert_eq!(backend.items.lists(), 1);
        let rows = view.items();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, item.id);
        assert_eq!(rows[0].name, "Kopi Luwak");
        assert_eq!(rows[0].stock, 7);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_gateway() {
        let backend = MemoryBackend::new();
        let view = CollectionView::<CatalogItem>::new();
        let mut form = FormMachine::<CatalogItemDraft>::new();

        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Teh".into();
        draft.price = "-5".into();
        draft.stock = "1".into();

        let outcome = form.submit(&backend, &view).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid(CoreError::Validation { field: Some("price"), .. })
        ));
        assert!(matches!(form.state(), FormState::Open(_)));
        assert!(form.error().is_some());
        assert_eq!(backend.items.writes(), 0);
    }

    #[test]
    fn double_submit_dispatches_once() {
        let mut form = FormMachine::<CatalogItemDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Gula".into();
        draft.price = "15000".into();
        draft.stock = "2".into();

        let first = form.begin_submit();
        let second = form.begin_submit();

        assert!(matches!(first, Begin::Dispatch(_)));
        assert!(matches!(second, Begin::Ignored));
        assert!(form.draft_mut().is_none(), "draft is frozen while submitting");
    }

    #[tokio::test]
    async fn rapid_submits_produce_one_create_call() {
        let backend = MemoryBackend::new();
        let mut form = FormMachine::<AccountDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Ana".into();
        draft.email = "ana@x.com".into();
        draft.password = "p1".into();

        let mut dispatched = Vec::new();
        for _ in 0..3 {
            if let Begin::Dispatch(submission) = form.begin_submit() {
                dispatched.push(submission);
            }
        }
        assert_eq!(dispatched.len(), 1);
        let submission = dispatched.pop().unwrap();
        let result = submission.request.dispatch(&backend).await;
        let outcome = form.complete(submission.ticket, result);

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(backend.accounts.creates(), 1);
    }

    #[tokio::test]
    async fn gateway_failure_reopens_with_error() {
        let backend = MemoryBackend::new();
        backend.seed_account("Ana", "ana@x.com");
        let view = CollectionView::<Account>::new();
        let mut form = FormMachine::<AccountDraft>::new();

        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Another Ana".into();
        draft.email = "ana@x.com".into();
        draft.password = "secret".into();

        let outcome = form.submit(&backend, &view).await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
        assert_eq!(form.error().unwrap().to_string(), "email already exists");
        assert_eq!(form.draft().unwrap().name, "Another Ana");
        assert_eq!(backend.accounts.lists(), 0, "no refetch after a failed write");
    }

    #[test]
    fn add_new_discards_stale_edit_draft() {
        let entity = CatalogItem {
            id: "p1".into(),
            name: "Kopi".into(),
            price: 20_000.0,
            stock: 3,
        };
        let mut form = FormMachine::<CatalogItemDraft>::new();

        form.open_edit(&entity);
        assert_eq!(form.mode(), Some(&FormMode::Edit("p1".into())));
        assert_eq!(form.draft().unwrap().name, "Kopi");

        form.open_create();
        assert_eq!(form.mode(), Some(&FormMode::Create));
        assert_eq!(form.draft(), Some(&CatalogItemDraft::default()));
    }

    #[test]
    fn edit_clears_password() {
        let account = Account {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@x.com".into(),
        };
        let mut form = FormMachine::<AccountDraft>::new();
        form.open_create();
        form.draft_mut().unwrap().password = "typed earlier".into();

        form.open_edit(&account);

        assert_eq!(form.draft().unwrap().password, "");
        assert_eq!(form.draft().unwrap().email, "ana@x.com");
    }

    #[tokio::test]
    async fn cancelled_form_discards_its_late_result() {
        let backend = MemoryBackend::new();
        let mut form = FormMachine::<CatalogItemDraft>::new();
        form.open_create();
        let draft = form.draft_mut().unwrap();
        draft.name = "Garam".into();
        draft.price = "3000".into();
        draft.stock = "10".into();

        let Begin::Dispatch(submission) = form.begin_submit() else {
            panic!("expected dispatch");
        };
        form.cancel();
        let result = submission.request.dispatch(&backend).await;
        let outcome = form.complete(submission.ticket, result);

        assert!(matches!(outcome, SubmitOutcome::Discarded { saved: true }));
        assert!(outcome.wrote());
        assert!(form.is_idle());
    }

    #[tokio::test]
    async fn edit_updates_only_changed_fields() {
        let backend = MemoryBackend::new();
        let item = backend.seed_item("Kopi", 20_000.0, 3);
        let view = CollectionView::<CatalogItem>::new();
        let mut form = FormMachine::<CatalogItemDraft>::new();

        form.open_edit(&item);
        form.draft_mut().unwrap().stock = "12".into();
        let outcome = form.submit(&backend, &view).await;

        let SubmitOutcome::Saved(saved) = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };
        assert_eq!(saved.stock, 12);
        assert_eq!(saved.name, "Kopi");
        assert!((saved.price - 20_000.0).abs() < f64::EPSILON);
        assert_eq!(backend.items.updates(), 1);
    }

    #[tokio::test]
    async fn unchanged_edit_saves_without_update_call() {
        let backend = MemoryBackend::new();
        let item = backend.seed_item("Kopi", 20_000.0, 3);
        let view = CollectionView::<CatalogItem>::new();
        let mut form = FormMachine::<CatalogItemDraft>::new();

        form.open_edit(&item);
        let Begin::Dispatch(submission) = form.begin_submit() else {
            panic!("expected a dispatch");
        };
        assert!(matches!(submission.request, WriteRequest::Unchanged(_)));
        form.cancel();

        form.open_edit(&item);
        let outcome = form.submit(&backend, &view).await;

        let SubmitOutcome::Saved(saved) = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };
        assert_eq!(saved, item);
        assert!(form.is_idle());
        assert_eq!(backend.items.updates(), 0);
    }
}
