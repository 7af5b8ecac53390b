//! Client-side state per domain area.
//!
//! A store is a cheap `Clone` handle over shared state. Actions set `loading`
//! while in flight and record a readable `error` when a call fails. Read
//! actions swallow the error after recording it; mutating actions also
//! return it.
//!
//! `loading` is reference-counted: it stays `true` until every overlapping
//! action of the same store has finished, including futures dropped before
//! completion. Data and error updates are last-write-wins.

pub mod admin;
pub mod categories;
pub mod notifications;
pub mod session;
pub mod tickets;

use shared::models::Resource;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use admin::{AdminState, AdminStore};
pub use categories::{CategoryState, CategoryStore};
pub use notifications::{NotificationState, NotificationStore};
pub use session::{Session, SessionSource, SessionStore};
pub use tickets::{TicketState, TicketStore};

/// State shape managed by a [`StoreHandle`].
pub trait StoreState: Clone + Default + Send + 'static {
    /// Raise or clear the in-flight flag.
    fn set_loading(&mut self, loading: bool);
    /// Record or clear the last failure message.
    fn set_error(&mut self, error: Option<String>);
}

#[derive(Debug, Default)]
struct Inner<S> {
    state: S,
    in_flight: usize,
}

/// Shared, lock-protected store state. The lock is never held across an
/// `.await`.
#[derive(Debug)]
pub(crate) struct StoreHandle<S> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StoreState> StoreHandle<S> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start an action: clears the error and marks the store as loading
    /// until the returned guard drops.
    pub(crate) fn begin(&self) -> LoadingGuard<S> {
        let mut inner = self.lock();
        inner.in_flight += 1;
        inner.state.set_loading(true);
        inner.state.set_error(None);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub(crate) fn update<R>(&self, apply: impl FnOnce(&mut S) -> R) -> R {
        apply(&mut self.lock().state)
    }

    pub(crate) fn fail(&self, message: String) {
        self.lock().state.set_error(Some(message));
    }

    pub(crate) fn snapshot(&self) -> S {
        self.lock().state.clone()
    }
}

/// Keeps `loading` raised for one in-flight action.
#[derive(Debug)]
pub(crate) struct LoadingGuard<S: StoreState> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S: StoreState> Drop for LoadingGuard<S> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.in_flight = inner.in_flight.saturating_sub(1);
        let still_loading = inner.in_flight > 0;
        inner.state.set_loading(still_loading);
    }
}

/// Remove every record whose identifier equals `id`. Returns whether
/// anything was removed.
pub(crate) fn remove_by_id<T: Resource>(items: &mut Vec<T>, id: &T::Id) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
