//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestIdentityClient`] - identity checks against the RouteForge
//!   auth API using reqwest
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockIdentityClient`] - scripted identity-check outcomes

pub mod mock;
pub mod reqwest_identity;

pub use mock::MockIdentityClient;
pub use reqwest_identity::{ReqwestIdentityClient, RequestLinkAck};
