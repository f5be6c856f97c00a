//! Session synchronization engine for RouteForge clients.
//!
//! A [`SessionManager`] polls the backend's `GET /auth/me` endpoint and
//! maintains a single authoritative [`SessionSnapshot`] shared by any
//! number of subscribers. Polling is demand-driven (no subscribers, no
//! background work), identity checks are coalesced to one in flight, and
//! failures retry on a capped exponential backoff.
//!
//! ```ignore
//! use std::sync::Arc;
//! use routeforge_session::{ReqwestIdentityClient, SessionConfig, SessionManager};
//!
//! let provider = Arc::new(ReqwestIdentityClient::new("https://forge.example.com"));
//! let manager = SessionManager::new(provider, SessionConfig::default());
//!
//! let mut session = manager.subscribe();
//! while let Some(snapshot) = session.recv().await {
//!     println!("signed in: {}", snapshot.is_authenticated());
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod session;
pub mod traits;

pub use adapters::ReqwestIdentityClient;
pub use config::SessionConfig;
pub use session::{
    SessionManager, SessionSnapshot, SessionStatus, SessionSubscription, SessionUser,
};
pub use traits::{IdentityError, IdentityProvider};
