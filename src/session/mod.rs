//! Session synchronization engine.
//!
//! Maintains one authoritative "who is currently signed in" snapshot for
//! a long-lived client process and keeps it fresh by polling the backend
//! while at least one subscriber exists.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ subscribe/drop ┌─────────────────┐
//! │  Consumers   │───────────────▶│  SessionManager │
//! └──────▲───────┘                └────────┬────────┘
//!        │ notifications                   │
//! ┌──────┴───────┐                ┌────────▼────────┐
//! │ SessionStore │◀───classify────│ single-flight   │
//! │ (snapshot +  │                │ identity check  │
//! │  listeners)  │                └────────┬────────┘
//! └──────────────┘                         │ outcome
//!                                 ┌────────▼────────┐
//!                                 │  poll scheduler │
//!                                 │ (RetryBackoff,  │
//!                                 │  single timer)  │
//!                                 └─────────────────┘
//! ```
//!
//! The scheduler runs only while listeners exist: an idle process does
//! no background work. At most one identity check is ever in flight;
//! concurrent refreshes join it, so state transitions are strictly
//! serialized.

mod backoff;
mod fetch;
mod manager;
mod state;
mod store;

pub use backoff::RetryBackoff;
pub use manager::{SessionManager, SessionSubscription};
pub use state::{SessionSnapshot, SessionStatus, SessionUser};
pub use store::{ListenerId, SessionStore};
