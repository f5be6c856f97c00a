//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockIdentityClient`] - identity provider with scripted outcomes

pub mod identity;

pub use identity::{MockIdentityClient, MockOutcome};
