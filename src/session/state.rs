//! Session snapshot types.
//!
//! A [`SessionSnapshot`] is the single authoritative "who is signed in"
//! value. The engine holds exactly one per manager and replaces it only
//! through classified fetch outcomes or an explicit override.

use serde::{Deserialize, Serialize};

/// Authentication status of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Initial state, before the first identity check has completed.
    Loading,
    /// A user is signed in; the snapshot carries their identity.
    Authenticated,
    /// The backend reports no signed-in user. Not an error state.
    Unauthenticated,
    /// A transient failure; the engine keeps retrying on a backoff schedule.
    Error,
}

/// The signed-in user as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionUser {
    /// Create a user with an email and no display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Create a user with an email and a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

/// The authoritative session state shared by all subscribers.
///
/// Invariants: `user` is present if and only if the status is
/// [`SessionStatus::Authenticated`]; `error` is present only when the
/// status is [`SessionStatus::Error`].
///
/// Equality (used for the notification-suppression check in the store)
/// compares status, user email, user name, and error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<SessionUser>,
    pub error: Option<String>,
}

impl SessionSnapshot {
    /// Initial value at manager construction.
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            user: None,
            error: None,
        }
    }

    /// Snapshot after a successful identity check.
    pub fn authenticated(user: SessionUser) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
            error: None,
        }
    }

    /// Snapshot for a signed-out session. Carries no error: being signed
    /// out is an expected outcome, never surfaced as a failure.
    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
            error: None,
        }
    }

    /// Snapshot for a transient failure, carrying the message for display.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Error,
            user: None,
            error: Some(message.into()),
        }
    }

    /// Whether a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}
