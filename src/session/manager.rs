//! The session manager: fetch coordination, poll scheduling, public API.
//!
//! # Dependency Injection
//!
//! The manager takes an `Arc<dyn IdentityProvider>`:
//! - production wires in [`ReqwestIdentityClient`](crate::adapters::ReqwestIdentityClient)
//! - tests wire in [`MockIdentityClient`](crate::adapters::mock::MockIdentityClient)
//!
//! # Single-writer discipline
//!
//! The snapshot, listener registry, timer handle, in-flight handle, and
//! retry delay all live behind one mutex inside the manager; nothing
//! outside this module mutates them. No lock is ever held across an
//! await point.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::traits::{IdentityError, IdentityProvider};

use super::backoff::RetryBackoff;
use super::fetch::classify;
use super::state::{SessionSnapshot, SessionStatus, SessionUser};
use super::store::{ListenerId, SessionStore};

/// Mutable engine state, guarded by the manager's mutex.
struct EngineState {
    store: SessionStore,
    backoff: RetryBackoff,
    /// The single pending timer task, if any.
    timer: Option<JoinHandle<()>>,
    /// Bumped on every cancel; a woken timer task from an older
    /// generation must not start a fetch.
    timer_generation: u64,
    /// The single in-flight identity check, if any. Joiners subscribe to
    /// the broadcast and resolve together with the leader.
    in_flight: Option<broadcast::Sender<SessionSnapshot>>,
    /// Set once: the very first subscriber triggers an immediate fetch.
    started: bool,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    config: SessionConfig,
    state: Mutex<EngineState>,
}

/// The session synchronization engine.
///
/// One manager holds the authoritative [`SessionSnapshot`] for a process
/// and keeps it fresh by polling the identity provider while at least
/// one subscriber exists. Cloning is cheap; all clones share the same
/// engine. Construct it once at application start and hand clones to
/// consumers.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Create a manager. No background work happens until the first
    /// subscriber arrives or `refresh` is called.
    pub fn new(provider: Arc<dyn IdentityProvider>, config: SessionConfig) -> Self {
        let state = EngineState {
            store: SessionStore::new(),
            backoff: RetryBackoff::new(config.retry_initial, config.retry_max),
            timer: None,
            timer_generation: 0,
            in_flight: None,
            started: false,
        };
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().unwrap().store.snapshot().clone()
    }

    /// Number of active subscribers.
    pub fn listener_count(&self) -> usize {
        self.inner.state.lock().unwrap().store.listener_count()
    }

    /// Whether a poll timer is currently pending.
    pub fn has_active_timer(&self) -> bool {
        self.inner.state.lock().unwrap().timer.is_some()
    }

    /// Whether an identity check is currently in flight.
    pub fn fetch_in_flight(&self) -> bool {
        self.inner.state.lock().unwrap().in_flight.is_some()
    }

    /// The delay the next non-success reschedule would use.
    pub fn current_retry_delay(&self) -> Duration {
        self.inner.state.lock().unwrap().backoff.current()
    }

    /// Register a subscriber.
    ///
    /// The current snapshot is delivered immediately, and polling is
    /// started (or kept alive) while the subscription exists. Dropping
    /// the returned guard unsubscribes; when the last subscriber goes,
    /// the timer is stopped.
    pub fn subscribe(&self) -> SessionSubscription {
        let mut state = self.inner.state.lock().unwrap();
        let (id, rx) = state.store.subscribe();
        debug!(listeners = state.store.listener_count(), "session listener registered");
        ensure_polling(&self.inner, &mut state);
        SessionSubscription {
            id,
            rx,
            inner: self.inner.clone(),
        }
    }

    /// Trigger (or join) an identity check and return the resulting
    /// snapshot once the store has been updated and the next poll
    /// scheduled.
    ///
    /// Cancels any pending timer first. With `force`, the retry delay is
    /// reset to its initial value before the check. A transient failure
    /// is not an error return: it lands in the snapshot as
    /// `status == Error` with the message.
    pub async fn refresh(&self, force: bool) -> SessionSnapshot {
        do_refresh(&self.inner, force).await
    }

    /// Explicit override after a sign-in or sign-out action completes,
    /// so the known-true state is observable without waiting for the
    /// next poll. `Some(user)` means authenticated; `None` signed out.
    ///
    /// Resets the retry delay, cancels the pending timer, notifies
    /// synchronously, and reschedules while subscribers exist.
    pub fn set_user(&self, user: Option<SessionUser>) {
        let mut state = self.inner.state.lock().unwrap();
        cancel_timer(&mut state);
        state.backoff.reset();

        let next = match user {
            Some(user) => {
                info!(email = %user.email, "session override: signed in");
                SessionSnapshot::authenticated(user)
            }
            None => {
                info!("session override: signed out");
                SessionSnapshot::unauthenticated()
            }
        };
        state.store.set_state(next);

        if !state.store.is_empty() {
            let delay = next_delay(&self.inner, &state);
            schedule_after(&self.inner, &mut state, delay);
        }
    }
}

/// One consumer's subscription to session state.
///
/// Exposes the current snapshot, awaitable change notifications, and a
/// bound forced refresh. Dropping it unsubscribes.
pub struct SessionSubscription {
    id: ListenerId,
    rx: mpsc::UnboundedReceiver<SessionSnapshot>,
    inner: Arc<Inner>,
}

impl SessionSubscription {
    /// The current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().unwrap().store.snapshot().clone()
    }

    /// Await the next delivered snapshot. The first received value is
    /// the snapshot current at subscription time. Returns `None` only if
    /// the engine is gone.
    pub async fn recv(&mut self) -> Option<SessionSnapshot> {
        self.rx.recv().await
    }

    /// Take an already-delivered snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<SessionSnapshot> {
        self.rx.try_recv().ok()
    }

    /// Forced refresh bound to the engine, for "try again" affordances.
    pub async fn refresh(&self) -> SessionSnapshot {
        do_refresh(&self.inner, true).await
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock().unwrap();
        if state.store.unsubscribe(self.id) {
            info!("last session listener removed; polling stopped");
            cancel_timer(&mut state);
        }
    }
}

async fn do_refresh(inner: &Arc<Inner>, force: bool) -> SessionSnapshot {
    let mut rx = {
        let mut state = inner.state.lock().unwrap();
        cancel_timer(&mut state);
        if force {
            state.backoff.reset();
        }
        begin_fetch(inner, &mut state)
    };

    match rx.recv().await {
        Ok(snapshot) => snapshot,
        // The fetch task always sends before dropping the sender; this
        // arm only covers a panicked provider.
        Err(_) => inner.state.lock().unwrap().store.snapshot().clone(),
    }
}

/// Idempotent: called on every subscribe. The very first subscriber
/// triggers an immediate fetch; after that, a fetch is scheduled only if
/// neither a timer nor an in-flight check exists.
fn ensure_polling(inner: &Arc<Inner>, state: &mut EngineState) {
    if !state.started {
        state.started = true;
        info!("session polling started");
        begin_fetch(inner, state);
    } else if state.timer.is_none() && state.in_flight.is_none() {
        let delay = next_delay(inner, state);
        schedule_after(inner, state, delay);
    }
}

/// Delay policy: healthy interval while authenticated, retry delay
/// otherwise.
fn next_delay(inner: &Arc<Inner>, state: &EngineState) -> Duration {
    if state.store.snapshot().status == SessionStatus::Authenticated {
        inner.config.poll_interval
    } else {
        state.backoff.current()
    }
}

fn cancel_timer(state: &mut EngineState) {
    state.timer_generation = state.timer_generation.wrapping_add(1);
    if let Some(handle) = state.timer.take() {
        handle.abort();
    }
}

/// Replace the pending timer with one firing after `delay`. No timer is
/// created while the listener registry is empty.
fn schedule_after(inner: &Arc<Inner>, state: &mut EngineState, delay: Duration) {
    cancel_timer(state);
    if state.store.is_empty() {
        return;
    }

    let generation = state.timer_generation;
    let task_inner = inner.clone();
    debug!(?delay, "next identity check scheduled");
    state.timer = Some(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut state = task_inner.state.lock().unwrap();
        // A cancel may have raced the wakeup; stale timers do nothing.
        if state.timer_generation != generation {
            return;
        }
        state.timer = None;
        begin_fetch(&task_inner, &mut state);
    }));
}

/// Begin an identity check, or join the one already in flight.
///
/// The check runs on a spawned task so a cancelled caller cannot strand
/// other joiners. All joiners resolve with the snapshot produced by the
/// single completion.
fn begin_fetch(inner: &Arc<Inner>, state: &mut EngineState) -> broadcast::Receiver<SessionSnapshot> {
    if let Some(tx) = &state.in_flight {
        debug!("joining in-flight identity check");
        return tx.subscribe();
    }

    cancel_timer(state);
    let (tx, rx) = broadcast::channel(1);
    state.in_flight = Some(tx);

    let task_inner = inner.clone();
    tokio::spawn(async move {
        debug!("identity check started");
        let outcome = task_inner.provider.who_am_i().await;
        complete_fetch(&task_inner, outcome);
    });
    rx
}

/// Apply a completed identity check: classify, update the store (which
/// notifies listeners), adjust the retry delay, wake joiners, reschedule.
fn complete_fetch(inner: &Arc<Inner>, outcome: Result<SessionUser, IdentityError>) {
    let mut state = inner.state.lock().unwrap();

    let succeeded = outcome.is_ok();
    match &outcome {
        Ok(user) => debug!(email = %user.email, "identity check: signed in"),
        Err(err) if err.is_unauthenticated() => debug!("identity check: signed out"),
        Err(err) => warn!(error = %err, "identity check failed"),
    }

    let next = classify(outcome);
    state.store.set_state(next.clone());

    let delay = if succeeded {
        state.backoff.reset();
        inner.config.poll_interval
    } else {
        let delay = state.backoff.current();
        state.backoff.advance();
        delay
    };

    if let Some(tx) = state.in_flight.take() {
        // No receivers just means nobody awaited this check directly.
        let _ = tx.send(next);
    }

    if !state.store.is_empty() {
        schedule_after(inner, &mut state, delay);
    }
}
