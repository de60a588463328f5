// ── Destructive action flow ──
//
// request (self-protection check) → confirm → delete → refetch.
// A refused request never shows a prompt and never reaches the gateway.
// A failed delete leaves the collection untouched; rows only disappear
// through a refetch after a confirmed delete.

use std::future::Future;

use tracing::{info, warn};

use crate::error::CoreError;
use crate::gateway::ResourceGateway;
use crate::model::{EntityId, Resource};
use crate::notify::{ConfirmPrompt, Notification};
use crate::session::SessionState;
use crate::store::CollectionView;

/// Asks the operator to acknowledge a destructive action.
pub trait Confirmer: Send {
    /// `true` only on explicit affirmative acknowledgment.
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> impl Future<Output = bool> + Send;
}

#[derive(Debug)]
pub enum DeleteOutcome {
    /// Self-protection tripped; nothing was shown or sent.
    Refused(Notification),
    Cancelled,
    Deleted {
        id: EntityId,
        notification: Notification,
    },
    Failed {
        error: CoreError,
        notification: Notification,
    },
}

impl DeleteOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::Refused(n)
            | Self::Deleted {
                notification: n, ..
            }
            | Self::Failed {
                notification: n, ..
            } => Some(n),
            Self::Cancelled => None,
        }
    }
}

/// A delete that passed the self-protection check and awaits confirmation.
#[derive(Debug)]
pub struct DeleteRequest<R: Resource> {
    target: R,
    prompt: ConfirmPrompt,
}

/// Start a delete. Refuses account deletions targeting the current actor.
pub fn request_delete<R: Resource>(
    target: &R,
    session: &SessionState,
) -> Result<DeleteRequest<R>, DeleteOutcome> {
    if R::SELF_PROTECTED && session.actor_id().as_ref() == Some(target.id()) {
        warn!(kind = %R::KIND, id = %target.id(), "refusing to delete the signed-in account");
        return Err(DeleteOutcome::Refused(Notification::self_delete_refused()));
    }
    Ok(DeleteRequest {
        prompt: ConfirmPrompt::delete(R::KIND, target.label()),
        target: target.clone(),
    })
}

impl<R: Resource> DeleteRequest<R> {
    pub fn prompt(&self) -> &ConfirmPrompt {
        &self.prompt
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn cancel(self) -> DeleteOutcome {
        DeleteOutcome::Cancelled
    }

    /// Confirmed: delete, then refetch on success.
    pub async fn execute<G: ResourceGateway<R>>(
        self,
        gateway: &G,
        view: &CollectionView<R>,
    ) -> DeleteOutcome {
        let id = self.target.id();
        match gateway.delete(id).await {
            Ok(deleted) => {
                info!(kind = %R::KIND, id = %deleted, "deleted");
                // A failed refetch is published on the view; the delete stands.
                let _ = view.refresh(gateway).await;
                DeleteOutcome::Deleted {
                    id: deleted,
                    notification: Notification::deleted(R::KIND),
                }
            }
            Err(error) => {
                warn!(kind = %R::KIND, id = %id, error = %error, "delete failed");
                DeleteOutcome::Failed {
                    error,
                    notification: Notification::delete_failed(R::KIND),
                }
            }
        }
    }
}

/// The whole flow with an interactive confirmer.
pub async fn run_delete<R, G, C>(
    target: &R,
    session: &SessionState,
    gateway: &G,
    view: &CollectionView<R>,
    confirmer: &mut C,
) -> DeleteOutcome
where
    R: Resource,
    G: ResourceGateway<R>,
    C: Confirmer,
{
    let request = match request_delete(target, session) {
        Ok(request) => request,
        Err(refused) => return refused,
    };
    if confirmer.confirm(request.prompt()).await {
        request.execute(gateway, view).await
    } else {
        request.cancel()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::*;
    use crate::error::ErrorKind;
    use crate::gateway::MemoryBackend;
    use crate::model::{Account, CatalogItem};
    use crate::notify::NotificationLevel;
    use crate::session::{Actor, MemorySessionStore};

    /// Scripted answer; records every prompt it is shown.
    struct Scripted {
        answer: bool,
        shown: Vec<ConfirmPrompt>,
    }

    impl Scripted {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                shown: Vec::new(),
            }
        }
    }

    impl Confirmer for Scripted {
        async fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
            self.shown.push(prompt.clone());
            self.answer
        }
    }

    fn signed_in_as(account: &Account) -> SessionState {
        let session = SessionState::new(Arc::new(MemorySessionStore::default()));
        session
            .establish(
                Actor {
                    id: account.id.clone(),
                    name: account.name.clone(),
                    email: account.email.clone(),
                },
                SecretString::from("t".to_string()),
            )
            .unwrap();
        session
    }

    #[tokio::test]
    async fn self_delete_is_refused_before_prompt() {
        let backend = MemoryBackend::new();
        let me = backend.seed_account("Ana", "ana@x.com");
        let session = signed_in_as(&me);
        let view = CollectionView::<Account>::new();
        let mut confirmer = Scripted::answering(true);

        let outcome = run_delete(&me, &session, &backend, &view, &mut confirmer).await;

        assert!(matches!(outcome, DeleteOutcome::Refused(_)));
        assert!(confirmer.shown.is_empty(), "no prompt may be shown");
        assert_eq!(backend.accounts.deletes(), 0);
        assert_eq!(backend.accounts.lists(), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_refetches_and_notifies() {
        let backend = MemoryBackend::new();
        let me = backend.seed_account("Ana", "ana@x.com");
        let other = backend.seed_account("Budi", "budi@x.com");
        let session = signed_in_as(&me);
        let view = CollectionView::<Account>::new();
        view.refresh(&backend).await.unwrap();
        let mut confirmer = Scripted::answering(true);

        let outcome = run_delete(&other, &session, &backend, &view, &mut confirmer).await;

        assert_eq!(confirmer.shown.len(), 1);
        assert_eq!(confirmer.shown[0].title, "Are you sure?");
        let note = outcome.notification().unwrap();
        assert_eq!(note.level, NotificationLevel::Success);
        assert_eq!(note.message, "The account has been deleted.");
        assert!(view.find(&other.id).is_none());
        assert_eq!(view.items().len(), 1);
    }

    #[tokio::test]
    async fn cancel_has_no_side_effect() {
        let backend = MemoryBackend::new();
        let item = backend.seed_item("Kopi", 20_000.0, 1);
        let session = SessionState::new(Arc::new(MemorySessionStore::default()));
        let view = CollectionView::<CatalogItem>::new();
        let mut confirmer = Scripted::answering(false);

        let outcome = run_delete(&item, &session, &backend, &view, &mut confirmer).await;

        assert!(matches!(outcome, DeleteOutcome::Cancelled));
        assert_eq!(backend.items.deletes(), 0);
    }

    #[tokio::test]
    async fn failed_delete_keeps_collection() {
        let backend = MemoryBackend::new();
        let item = backend.seed_item("Kopi", 20_000.0, 1);
        let session = SessionState::new(Arc::new(MemorySessionStore::default()));
        let view = CollectionView::<CatalogItem>::new();
        view.refresh(&backend).await.unwrap();
        backend.fail_next(CoreError::Transport {
            message: "connection reset".into(),
        });

        let request = request_delete(&item, &session).unwrap();
        let outcome = request.execute(&backend, &view).await;

        let DeleteOutcome::Failed {
            error,
            notification,
        } = outcome
        else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(notification.message, "There was an issue deleting the product.");
        assert_eq!(view.items().len(), 1, "no optimistic removal");
        assert_eq!(backend.items.lists(), 1);
    }

    #[tokio::test]
    async fn second_delete_reports_not_found() {
        let backend = MemoryBackend::new();
        let item = backend.seed_item("Kopi", 20_000.0, 1);

        ResourceGateway::<CatalogItem>::delete(&backend, &item.id)
            .await
            .unwrap();
        let err = ResourceGateway::<CatalogItem>::delete(&backend, &item.id)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
