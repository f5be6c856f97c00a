//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`IdentityProvider`] - the "who am I" identity check

pub mod identity;

pub use identity::{IdentityError, IdentityProvider};
