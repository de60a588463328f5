//! Data bridge: forwards collection view changes into the action loop.
//!
//! Each `CollectionView` publishes through a `watch` channel in the
//! order list responses land, so the screens always show the response
//! that arrived last.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use shopkeep_core::{Backend, Console};

use crate::action::Action;

/// Subscribe to both views and spawn the forwarding task.
///
/// The current snapshots are sent first so screens render immediately.
pub fn spawn_data_bridge<B: Backend>(
    console: &Console<B>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut accounts = console.accounts().subscribe();
    let mut items = console.items().subscribe();

    tokio::spawn(async move {
        let _ = action_tx.send(Action::AccountsUpdated(accounts.borrow_and_update().clone()));
        let _ = action_tx.send(Action::ItemsUpdated(items.borrow_and_update().clone()));

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                Ok(()) = accounts.changed() => {
                    let state = accounts.borrow_and_update().clone();
                    if action_tx.send(Action::AccountsUpdated(state)).is_err() {
                        break;
                    }
                }
                Ok(()) = items.changed() => {
                    let state = items.borrow_and_update().clone();
                    if action_tx.send(Action::ItemsUpdated(state)).is_err() {
                        break;
                    }
                }
                else => break,
            }
        }

        debug!("data bridge shut down");
    })
}
