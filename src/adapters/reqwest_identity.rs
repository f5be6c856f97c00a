//! Reqwest-based identity client.
//!
//! Production implementation of [`IdentityProvider`] against the
//! RouteForge auth API. Also carries the thin REST wrappers for sign-out
//! and magic-link requests; the engine itself only uses `who_am_i`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::traits::{IdentityError, IdentityProvider};
use crate::SessionUser;

/// Error codes and markers the backend uses to mean "no signed-in user".
///
/// `not_found` covers a deployment with auth disabled, whose `/auth/me`
/// endpoint answers 404.
const UNAUTHENTICATED_MARKERS: [&str; 3] = ["auth_required", "unauthorized", "not_found"];

/// Case-insensitive check for the signed-out markers in an error code or
/// message. Only the transport boundary inspects text; past this point
/// classification is an enum match.
pub(crate) fn is_unauthenticated_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    UNAUTHENTICATED_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Error envelope the backend wraps non-success responses in:
/// `{"error": "<code>", "detail": "..."}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Acknowledgment from `POST /auth/request-link`.
///
/// When the deployment has email delivery disabled, the backend returns
/// the generated link in `dev_link` so a client can redirect directly.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestLinkAck {
    pub detail: String,
    #[serde(default)]
    pub dev_link: Option<String>,
}

/// Identity client backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestIdentityClient {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestIdentityClient {
    /// Create a client for the given base URL (scheme + host, no trailing
    /// path).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client with a custom `reqwest::Client` (timeouts, proxies,
    /// connection pools).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a reqwest transport error to an [`IdentityError`].
    fn convert_error(err: reqwest::Error) -> IdentityError {
        if err.is_timeout() {
            IdentityError::Timeout(err.to_string())
        } else if err.is_connect() {
            IdentityError::Connection(err.to_string())
        } else {
            IdentityError::Other(err.to_string())
        }
    }

    /// Map a non-success response to an [`IdentityError`].
    ///
    /// 401 and 404 mean signed out, as does any error code or detail
    /// carrying one of the signed-out markers; everything else is a
    /// transient server error.
    fn error_from_response(status: u16, body: &str) -> IdentityError {
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
        let code = envelope.error.unwrap_or_default();
        let message = envelope.detail.unwrap_or_else(|| {
            if code.is_empty() {
                body.to_string()
            } else {
                code.clone()
            }
        });

        if status == 401
            || status == 404
            || is_unauthenticated_marker(&code)
            || is_unauthenticated_marker(&message)
        {
            let code = if code.is_empty() {
                "auth_required".to_string()
            } else {
                code
            };
            return IdentityError::Unauthenticated { code };
        }

        IdentityError::Http { status, message }
    }

    /// Sign the current session out.
    ///
    /// `POST /auth/logout`. Sign-out flows call this and then apply
    /// `set_user(None)` on the manager so the transition is observable
    /// without waiting for the next poll.
    pub async fn logout(&self) -> Result<(), IdentityError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            tracing::info!("session logout acknowledged");
            return Ok(());
        }

        let body = response.text().await.map_err(Self::convert_error)?;
        Err(Self::error_from_response(status, &body))
    }

    /// Request a magic sign-in link for an email address.
    ///
    /// `POST /auth/request-link`. The link flow itself (email delivery,
    /// token verification) is entirely server-side; this is only the
    /// request wrapper.
    pub async fn request_link(&self, email: &str) -> Result<RequestLinkAck, IdentityError> {
        let response = self
            .client
            .post(self.url("/auth/request-link"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::convert_error)?;
        if !(200..300).contains(&status) {
            return Err(Self::error_from_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| IdentityError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for ReqwestIdentityClient {
    async fn who_am_i(&self) -> Result<SessionUser, IdentityError> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::convert_error)?;

        if !(200..300).contains(&status) {
            return Err(Self::error_from_response(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| IdentityError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_match_is_case_insensitive() {
        assert!(is_unauthenticated_marker("AUTH_REQUIRED"));
        assert!(is_unauthenticated_marker("request was Unauthorized"));
        assert!(is_unauthenticated_marker("not_found"));
        assert!(!is_unauthenticated_marker("internal_error"));
        assert!(!is_unauthenticated_marker(""));
    }

    #[test]
    fn test_error_from_401_envelope() {
        let err = ReqwestIdentityClient::error_from_response(
            401,
            r#"{"error":"auth_required","detail":"Authentication required."}"#,
        );
        assert_eq!(
            err,
            IdentityError::Unauthenticated {
                code: "auth_required".into()
            }
        );
    }

    #[test]
    fn test_error_from_404_without_envelope() {
        // Auth-disabled deployments 404 on /auth/me with a plain detail.
        let err = ReqwestIdentityClient::error_from_response(404, r#"{"detail":"not_found"}"#);
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_error_from_500_is_transient() {
        let err = ReqwestIdentityClient::error_from_response(
            500,
            r#"{"error":"internal_error","detail":"unexpected server error"}"#,
        );
        assert_eq!(
            err,
            IdentityError::Http {
                status: 500,
                message: "unexpected server error".into()
            }
        );
    }

    #[test]
    fn test_error_from_non_json_body() {
        let err = ReqwestIdentityClient::error_from_response(502, "Bad Gateway");
        assert_eq!(
            err,
            IdentityError::Http {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn test_marker_in_message_wins_over_status() {
        let err = ReqwestIdentityClient::error_from_response(
            403,
            r#"{"error":"unauthorized","detail":"Unauthorized."}"#,
        );
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ReqwestIdentityClient::new("https://forge.example.com/");
        assert_eq!(client.base_url(), "https://forge.example.com");
        assert_eq!(client.url("/auth/me"), "https://forge.example.com/auth/me");
    }
}
