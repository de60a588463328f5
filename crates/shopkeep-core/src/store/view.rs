// Refetch-after-write collection view.
//
// The current `ViewState` is published through a `watch` channel so the
// TUI can re-render on change and the CLI can read it once. Responses
// are applied in arrival order: whichever `list()` lands last wins, even
// if it was issued first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::gateway::ResourceGateway;
use crate::model::Resource;

/// What a collection view currently shows.
#[derive(Debug, Clone)]
pub enum ViewState<R> {
    /// Never fetched (or reset after logout).
    Idle,
    /// A fetch is outstanding. `stale` holds the previous rows, if any.
    Loading { stale: Option<Arc<Vec<R>>> },
    Loaded {
        items: Arc<Vec<R>>,
        fetched_at: DateTime<Utc>,
    },
    /// The last fetch failed. No automatic retry.
    Failed { error: CoreError },
}

impl<R> ViewState<R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Rows to display: loaded rows, or the stale rows while reloading.
    pub fn rows(&self) -> Option<&Arc<Vec<R>>> {
        match self {
            Self::Loaded { items, .. } => Some(items),
            Self::Loading { stale } => stale.as_ref(),
            Self::Idle | Self::Failed { .. } => None,
        }
    }
}

pub struct CollectionView<R: Resource> {
    state: watch::Sender<ViewState<R>>,
    /// Fetches started, for diagnostics.
    issued: AtomicU64,
}

impl<R: Resource> Default for CollectionView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> CollectionView<R> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewState::Idle);
        Self {
            state,
            issued: AtomicU64::new(0),
        }
    }

    /// Current state (cheap: rows are behind an `Arc`).
    pub fn current(&self) -> ViewState<R> {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState<R>> {
        self.state.subscribe()
    }

    /// Loaded rows, or an empty list.
    pub fn items(&self) -> Arc<Vec<R>> {
        self.state
            .borrow()
            .rows()
            .cloned()
            .unwrap_or_default()
    }

    /// Find a loaded row by id.
    pub fn find(&self, id: &crate::model::EntityId) -> Option<R> {
        self.items().iter().find(|r| r.id() == id).cloned()
    }

    /// Mark the view as loading, keeping the previous rows as stale.
    pub fn mark_loading(&self) {
        self.state.send_modify(|state| {
            let stale = state.rows().cloned();
            *state = ViewState::Loading { stale };
        });
    }

    /// Publish the outcome of a `list()` call.
    pub fn apply(&self, result: &Result<Vec<R>, CoreError>) {
        match result {
            Ok(items) => {
                debug!(kind = %R::KIND, count = items.len(), "collection loaded");
                self.state.send_replace(ViewState::Loaded {
                    items: Arc::new(items.clone()),
                    fetched_at: Utc::now(),
                });
            }
            Err(e) => {
                warn!(kind = %R::KIND, error = %e, "collection fetch failed");
                self.state.send_replace(ViewState::Failed { error: e.clone() });
            }
        }
    }

    /// Fetch the whole collection and publish the result.
    ///
    /// Returns the number of rows on success; the error is both
    /// published and returned.
    pub async fn refresh<G: ResourceGateway<R>>(
        &self,
        gateway: &G,
    ) -> Result<usize, CoreError> {
        let seq = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(kind = %R::KIND, seq, "refreshing collection");
        self.mark_loading();
        let result = gateway.list().await;
        self.apply(&result);
        result.map(|items| items.len())
    }

    /// The error of the last fetch, if it failed.
    pub fn failure(&self) -> Option<CoreError> {
        match &*self.state.borrow() {
            ViewState::Failed { error } => Some(error.clone()),
            _ => None,
        }
    }

    /// Forget everything shown (used on logout).
    pub fn reset(&self) {
        self.state.send_replace(ViewState::Idle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryBackend;
    use crate::model::CatalogItem;

    #[tokio::test]
    async fn refresh_publishes_loaded_rows() {
        let backend = MemoryBackend::new();
        backend.seed_item("Kopi", 20_000.0, 5);
        let view: CollectionView<CatalogItem> = CollectionView::new();
        let mut rx = view.subscribe();

        assert!(matches!(view.current(), ViewState::Idle));
        let count = view.refresh(&backend).await.unwrap();

        assert_eq!(count, 1);
        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(matches!(state, ViewState::Loaded { ref items, .. } if items[0].name == "Kopi"));
    }

    #[tokio::test]
    async fn failed_fetch_is_published_without_retry() {
        let backend = MemoryBackend::new();
        backend.fail_next(CoreError::Transport {
            message: "connection refused".into(),
        });
        let view: CollectionView<CatalogItem> = CollectionView::new();

        let err = view.refresh(&backend).await.unwrap_err();

        assert!(matches!(err, CoreError::Transport { .. }));
        assert!(matches!(view.current(), ViewState::Failed { .. }));
        assert!(matches!(view.failure(), Some(CoreError::Transport { .. })));
        assert_eq!(backend.items.lists(), 1);
    }

    #[test]
    fn loading_keeps_stale_rows() {
        let view: CollectionView<CatalogItem> = CollectionView::new();
        let row = CatalogItem {
            id: "p1".into(),
            name: "Teh".into(),
            price: 5_000.0,
            stock: 1,
        };
        view.apply(&Ok(vec![row]));
        view.mark_loading();

        let state = view.current();
        assert!(state.is_loading());
        assert_eq!(state.rows().unwrap().len(), 1);
    }

    #[test]
    fn last_response_to_land_wins() {
        let view: CollectionView<CatalogItem> = CollectionView::new();
        let newer = vec![CatalogItem {
            id: "p2".into(),
            name: "Gula".into(),
            price: 1.0,
            stock: 2,
        }];
        // The newer fetch lands first, then an older, slower response.
        view.apply(&Ok(newer));
        view.apply(&Ok(Vec::new()));

        assert!(view.items().is_empty());
    }
}
