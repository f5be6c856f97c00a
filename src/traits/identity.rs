//! Identity transport trait abstraction.
//!
//! The engine never inspects HTTP responses itself; the transport reports
//! a structured [`IdentityError`] so classification is an enum match
//! rather than text inspection.

use async_trait::async_trait;
use thiserror::Error;

use crate::session::SessionUser;

/// Errors an identity check can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The backend reports no signed-in user. An expected outcome, not a
    /// failure: the engine maps it to the unauthenticated state.
    #[error("unauthenticated ({code})")]
    Unauthenticated {
        /// Backend error code, e.g. `auth_required`.
        code: String,
    },

    /// Server returned a non-success status that does not mean signed out.
    #[error("server error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Connection to the server failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Other transport error, surfaced verbatim.
    #[error("{0}")]
    Other(String),
}

impl IdentityError {
    /// Whether this outcome means "signed out" rather than a failure.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, IdentityError::Unauthenticated { .. })
    }
}

/// Trait for the "who am I" identity check.
///
/// Implementations must be thread-safe (`Send + Sync`): the engine runs
/// checks on spawned tasks. The production implementation is
/// [`ReqwestIdentityClient`](crate::adapters::ReqwestIdentityClient);
/// tests use [`MockIdentityClient`](crate::adapters::mock::MockIdentityClient).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Ask the backend who is currently signed in.
    async fn who_am_i(&self) -> Result<SessionUser, IdentityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_display() {
        let err = IdentityError::Unauthenticated {
            code: "auth_required".into(),
        };
        assert_eq!(err.to_string(), "unauthenticated (auth_required)");
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_http_display() {
        let err = IdentityError::Http {
            status: 500,
            message: "unexpected server error".into(),
        };
        assert_eq!(err.to_string(), "server error (500): unexpected server error");
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn test_other_displays_verbatim() {
        assert_eq!(IdentityError::Other("internal_error".into()).to_string(), "internal_error");
    }

    #[test]
    fn test_connection_and_timeout_display() {
        assert_eq!(
            IdentityError::Connection("refused".into()).to_string(),
            "connection failed: refused"
        );
        assert_eq!(
            IdentityError::Timeout("30s elapsed".into()).to_string(),
            "request timeout: 30s elapsed"
        );
    }
}
