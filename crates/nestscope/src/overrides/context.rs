//! Chain-local override index
//!
//! Each logical call chain sees its own map from registry identity to the
//! override scope currently active for that registry. The map lives in a
//! tokio task-local, so it follows a future across every suspension point
//! and worker thread, and is never shared with another chain:
//!
//! ```text
//! scope(async {                      chain A: {}
//!     open_scope(..)                 chain A: { reg → S1 }
//!     join!(
//!         fork(async { open_scope }) chain B: { reg → S2 }   (starts from A's snapshot)
//!         async { .. }               chain A: { reg → S1 }   (never sees S2)
//!     )
//! })
//! ```
//!
//! A tokio task that was not started through [`scope`], [`fork`] or
//! [`spawn`] (a plain `tokio::spawn`) still gets a view of its own, keyed by
//! its task id: it starts empty and is never shared with another task, on
//! whichever worker it resumes. Only code running outside any task (plain
//! synchronous callers, a test body driven by `block_on`) falls back to a
//! per-thread map. Work handed to another task must go through [`fork`] or
//! [`spawn`] to carry the caller's view along.

use dashmap::DashMap;
use nestscope_domain::RegistryId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tokio::task::{self, JoinHandle};

use super::OverrideScope;

#[derive(Clone, Default)]
struct ChainState {
    current: HashMap<RegistryId, Arc<OverrideScope>>,
}

tokio::task_local! {
    static CHAIN: RefCell<ChainState>;
}

thread_local! {
    static DETACHED: RefCell<ChainState> = RefCell::new(ChainState::default());
}

/// Views of tasks spawned outside any chain; entries are dropped once empty
static UNCHAINED_TASKS: LazyLock<DashMap<task::Id, ChainState>> = LazyLock::new(DashMap::new);

/// Run `future` as a new chain with no active override scopes
pub async fn scope<F: Future>(future: F) -> F::Output {
    CHAIN
        .scope(RefCell::new(ChainState::default()), future)
        .await
}

/// Run `future` as a child chain starting from the caller's current view
///
/// The snapshot is taken when `fork` is called. Scopes opened or disposed
/// afterwards, on either side, are not visible to the other.
pub fn fork<F: Future>(future: F) -> impl Future<Output = F::Output> {
    CHAIN.scope(RefCell::new(snapshot()), future)
}

/// Spawn `future` on the runtime as a forked chain
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(fork(future))
}

/// Run a synchronous closure as a new chain
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    CHAIN.sync_scope(RefCell::new(ChainState::default()), f)
}

/// Whether the caller runs inside a chain established by this module
pub fn in_chain() -> bool {
    CHAIN.try_with(|_| ()).is_ok()
}

fn read<R>(f: impl FnOnce(&ChainState) -> R) -> R {
    if in_chain() {
        return CHAIN.with(|state| f(&state.borrow()));
    }
    match task::try_id() {
        Some(id) => match UNCHAINED_TASKS.get(&id) {
            Some(state) => f(&state),
            None => f(&ChainState::default()),
        },
        None => DETACHED.with(|state| f(&state.borrow())),
    }
}

fn write<R>(f: impl FnOnce(&mut ChainState) -> R) -> R {
    if in_chain() {
        return CHAIN.with(|state| f(&mut state.borrow_mut()));
    }
    match task::try_id() {
        Some(id) => {
            let mut entry = UNCHAINED_TASKS.entry(id).or_default();
            let output = f(&mut entry);
            let empty = entry.current.is_empty();
            drop(entry);
            if empty {
                UNCHAINED_TASKS.remove_if(&id, |_, state| state.current.is_empty());
            }
            output
        }
        None => DETACHED.with(|state| f(&mut state.borrow_mut())),
    }
}

fn snapshot() -> ChainState {
    read(ChainState::clone)
}

pub(crate) fn current(registry: RegistryId) -> Option<Arc<OverrideScope>> {
    read(|state| state.current.get(&registry).cloned())
}

/// Replace the active scope for `registry`, returning the previous one
pub(crate) fn set(
    registry: RegistryId,
    scope: Option<Arc<OverrideScope>>,
) -> Option<Arc<OverrideScope>> {
    write(|state| match scope {
        Some(scope) => state.current.insert(registry, scope),
        None => state.current.remove(&registry),
    })
}
