//! Classification of identity-check outcomes into state transitions.

use crate::traits::IdentityError;

use super::state::{SessionSnapshot, SessionUser};

/// Map a completed identity check to exactly one state transition.
///
/// - Success: authenticated with the returned user.
/// - [`IdentityError::Unauthenticated`]: signed out. Deliberately not an
///   error state; no message is surfaced.
/// - Anything else: a transient error, carrying its message for display,
///   retried on the backoff schedule.
pub(crate) fn classify(outcome: Result<SessionUser, IdentityError>) -> SessionSnapshot {
    match outcome {
        Ok(user) => SessionSnapshot::authenticated(user),
        Err(IdentityError::Unauthenticated { .. }) => SessionSnapshot::unauthenticated(),
        Err(err) => SessionSnapshot::error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::state::SessionStatus;

    #[test]
    fn test_success_classifies_authenticated() {
        let snapshot = classify(Ok(SessionUser::new("a@b.com")));
        assert_eq!(snapshot.status, SessionStatus::Authenticated);
        assert_eq!(snapshot.user.unwrap().email, "a@b.com");
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_unauthenticated_is_not_an_error() {
        let snapshot = classify(Err(IdentityError::Unauthenticated {
            code: "auth_required".into(),
        }));
        assert_eq!(snapshot.status, SessionStatus::Unauthenticated);
        assert!(snapshot.user.is_none());
        assert!(snapshot.error.is_none(), "signed out must never surface an error");
    }

    #[test]
    fn test_transient_failure_surfaces_message() {
        let snapshot = classify(Err(IdentityError::Other("internal_error".into())));
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some("internal_error"));
    }

    #[test]
    fn test_http_failure_surfaces_status_and_message() {
        let snapshot = classify(Err(IdentityError::Http {
            status: 500,
            message: "unexpected server error".into(),
        }));
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("server error (500): unexpected server error")
        );
    }

    #[test]
    fn test_connection_failure_is_transient() {
        let snapshot = classify(Err(IdentityError::Connection("refused".into())));
        assert_eq!(snapshot.status, SessionStatus::Error);
    }
}
