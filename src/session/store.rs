//! Session state store and listener registry.

use std::collections::BTreeMap;

use tokio::sync::mpsc;

use super::state::SessionSnapshot;

/// Identifies one registered listener.
pub type ListenerId = u64;

/// Holds the single session snapshot and the set of active listeners.
///
/// `set_state` is idempotent: replacing the snapshot with an equal value
/// delivers zero notifications, so downstream consumers never re-render
/// for a no-op transition. Notification is synchronous and total: an
/// unbounded send to every registered listener before `set_state` returns.
#[derive(Debug)]
pub struct SessionStore {
    snapshot: SessionSnapshot,
    listeners: BTreeMap<ListenerId, mpsc::UnboundedSender<SessionSnapshot>>,
    next_id: ListenerId,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            snapshot: SessionSnapshot::loading(),
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Replace the snapshot and notify every listener.
    ///
    /// Returns false without notifying when `next` equals the current
    /// snapshot on all compared fields. A listener whose channel has
    /// closed is dropped from the registry (its consumer is gone).
    pub fn set_state(&mut self, next: SessionSnapshot) -> bool {
        if next == self.snapshot {
            tracing::trace!(status = ?next.status, "session state unchanged");
            return false;
        }

        tracing::debug!(from = ?self.snapshot.status, to = ?next.status, "session state changed");
        self.snapshot = next;
        let snapshot = self.snapshot.clone();
        self.listeners
            .retain(|_, listener| listener.send(snapshot.clone()).is_ok());
        true
    }

    /// Register a listener and immediately deliver the current snapshot,
    /// so a new subscriber never observes a stale "nothing yet" state.
    pub fn subscribe(&mut self) -> (ListenerId, mpsc::UnboundedReceiver<SessionSnapshot>) {
        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is held by the caller, so this send cannot fail.
        let _ = tx.send(self.snapshot.clone());
        self.listeners.insert(id, tx);
        (id, rx)
    }

    /// Remove a listener. Returns true when the registry became empty.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id);
        self.listeners.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::{SessionStatus, SessionUser};

    #[test]
    fn test_new_store_starts_loading() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot().status, SessionStatus::Loading);
        assert!(store.is_empty());
    }

    #[test]
    fn test_subscribe_delivers_current_snapshot() {
        let mut store = SessionStore::new();
        let (_id, mut rx) = store.subscribe();

        let delivered = rx.try_recv().expect("current snapshot delivered on subscribe");
        assert_eq!(delivered.status, SessionStatus::Loading);
    }

    #[test]
    fn test_set_state_notifies_all_listeners() {
        let mut store = SessionStore::new();
        let (_a, mut rx_a) = store.subscribe();
        let (_b, mut rx_b) = store.subscribe();
        rx_a.try_recv().unwrap();
        rx_b.try_recv().unwrap();

        let changed = store.set_state(SessionSnapshot::authenticated(SessionUser::new("a@b.com")));
        assert!(changed);

        assert!(rx_a.try_recv().unwrap().is_authenticated());
        assert!(rx_b.try_recv().unwrap().is_authenticated());
    }

    #[test]
    fn test_equal_state_triggers_zero_notifications() {
        let mut store = SessionStore::new();
        store.set_state(SessionSnapshot::authenticated(SessionUser::new("a@b.com")));

        let (_id, mut rx) = store.subscribe();
        rx.try_recv().unwrap();

        let changed = store.set_state(SessionSnapshot::authenticated(SessionUser::new("a@b.com")));
        assert!(!changed);
        assert!(rx.try_recv().is_err(), "no notification for an equal snapshot");
    }

    #[test]
    fn test_name_change_is_a_real_change() {
        let mut store = SessionStore::new();
        store.set_state(SessionSnapshot::authenticated(SessionUser::new("a@b.com")));

        let changed = store.set_state(SessionSnapshot::authenticated(SessionUser::with_name(
            "a@b.com", "Ada",
        )));
        assert!(changed);
    }

    #[test]
    fn test_unsubscribe_signals_empty_registry() {
        let mut store = SessionStore::new();
        let (a, _rx_a) = store.subscribe();
        let (b, _rx_b) = store.subscribe();

        assert!(!store.unsubscribe(a));
        assert!(store.unsubscribe(b));
        assert!(store.is_empty());
    }

    #[test]
    fn test_closed_listener_is_dropped_on_notify() {
        let mut store = SessionStore::new();
        let (_a, rx_a) = store.subscribe();
        let (_b, _rx_b) = store.subscribe();
        drop(rx_a);

        store.set_state(SessionSnapshot::unauthenticated());
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_unsubscribed_listener_sees_no_further_states() {
        let mut store = SessionStore::new();
        let (id, mut rx) = store.subscribe();
        rx.try_recv().unwrap();

        store.unsubscribe(id);
        store.set_state(SessionSnapshot::unauthenticated());
        assert!(rx.try_recv().is_err());
    }
}
