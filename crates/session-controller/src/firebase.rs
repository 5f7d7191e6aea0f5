//! Identity Toolkit REST client.
//!
//! Password sign-in and sign-up go straight to `accounts:signInWithPassword`
//! and `accounts:signUp`. The delegated flow sends the browser to the hosted
//! sign-in page on the project's auth domain, receives the upstream ID token
//! on a loopback callback and exchanges it with `accounts:signInWithIdp`.
//!
//! The signed-in principal and its refresh token are kept in the local
//! store, so a restarted process reports the previous user on its first
//! auth-state notification.

use crate::{
    AuthError, AuthResult, AuthStateStream, CallbackOutcome, CallbackServer, IdentityProvider,
    Principal,
};
use async_trait::async_trait;
use local_store::{LocalStore, LocalStoreExt, SharedStore, StorageError, StorageKeys};
use observability::summarize_body;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Hands the delegated sign-in URL to whatever can show it to the user.
pub type UrlOpener = Arc<dyn Fn(&str) + Send + Sync>;

/// Provider id reported for the email/password flows.
const PASSWORD_PROVIDER_ID: &str = "password";

/// Construction parameters for [`FirebaseAuthClient`].
#[derive(Debug, Clone)]
pub struct FirebaseAuthOptions {
    pub api_key: String,
    /// Identity Toolkit base, e.g. `https://identitytoolkit.googleapis.com/v1`.
    pub base_url: String,
    /// Host serving the delegated sign-in page. Required for
    /// [`IdentityProvider::sign_in_delegated`] only.
    pub auth_domain: Option<String>,
    pub callback_server: CallbackServer,
}

impl FirebaseAuthOptions {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            auth_domain: None,
            callback_server: CallbackServer::with_defaults(),
        }
    }

    pub fn with_auth_domain(mut self, auth_domain: impl Into<String>) -> Self {
        self.auth_domain = Some(auth_domain.into());
        self
    }

    pub fn with_callback_server(mut self, callback_server: CallbackServer) -> Self {
        self.callback_server = callback_server;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    provider_id: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// [`IdentityProvider`] backed by the Identity Toolkit REST API.
pub struct FirebaseAuthClient {
    http_client: reqwest::Client,
    options: FirebaseAuthOptions,
    store: SharedStore,
    opener: UrlOpener,
    watchers: Mutex<Vec<mpsc::UnboundedSender<Option<Principal>>>>,
}

impl FirebaseAuthClient {
    pub fn new(options: FirebaseAuthOptions, store: SharedStore) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            options,
            store,
            opener: Arc::new(|url: &str| {
                info!(url = %url, "Open this URL in a browser to continue signing in");
            }),
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_url_opener(mut self, opener: UrlOpener) -> Self {
        self.opener = opener;
        self
    }

    /// Principal persisted by the last successful sign-in, if any.
    ///
    /// A record that no longer decodes is treated as signed out.
    pub fn persisted_principal(&self) -> AuthResult<Option<Principal>> {
        match self.store.get_json::<Principal>(StorageKeys::AUTH_USER) {
            Ok(principal) => Ok(principal),
            Err(StorageError::Encoding { key, source }) => {
                warn!(key = %key, error = %source, "Discarding unreadable persisted user");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.options.base_url.trim_end_matches('/'),
            method,
            self.options.api_key
        )
    }

    async fn call(
        &self,
        method: &str,
        body: &serde_json::Value,
        default_provider_id: &str,
    ) -> AuthResult<Principal> {
        debug!(method, "Calling Identity Toolkit");

        let response = self
            .http_client
            .post(self.endpoint_url(method))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(method, status, &body));
        }

        let data: TokenResponse = response.json().await?;
        let principal = Principal {
            uid: data.local_id,
            email: data.email.filter(|e| !e.is_empty()),
            display_name: data.display_name.filter(|n| !n.is_empty()),
            provider_id: data
                .provider_id
                .unwrap_or_else(|| default_provider_id.to_string()),
        };

        self.persist(&principal, data.refresh_token.as_deref())?;
        info!(uid = %principal.uid, provider = %principal.provider_id, "Signed in");
        self.broadcast(Some(principal.clone()));
        Ok(principal)
    }

    fn persist(&self, principal: &Principal, refresh_token: Option<&str>) -> AuthResult<()> {
        self.store.set_json(StorageKeys::AUTH_USER, principal)?;
        match refresh_token {
            Some(token) => self.store.set(StorageKeys::AUTH_REFRESH_TOKEN, token)?,
            None => {
                self.store.delete(StorageKeys::AUTH_REFRESH_TOKEN)?;
            }
        }
        Ok(())
    }

    fn broadcast(&self, principal: Option<Principal>) {
        let mut watchers = self.watchers.lock();
        watchers.retain(|tx| tx.send(principal.clone()).is_ok());
        debug!(watchers = watchers.len(), "Auth state broadcast");
    }
}

fn provider_error(method: &str, status: reqwest::StatusCode, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            warn!(method, status = %status, code = %envelope.error.message, "Identity Toolkit rejected request");
            let code = envelope
                .error
                .message
                .split(':')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            AuthError::Provider {
                code,
                message: envelope.error.message,
            }
        }
        Err(_) => {
            let body_summary = summarize_body(body);
            error!(method, status = %status, body_summary = %body_summary, "Unexpected Identity Toolkit response");
            AuthError::Provider {
                code: format!("HTTP_{}", status.as_u16()),
                message: format!("{} failed: {} ({})", method, status, body_summary),
            }
        }
    }
}

/// Hosted sign-in page on the auth domain, told where to send the browser back.
fn delegated_start_url(auth_domain: &str, callback_url: &str) -> AuthResult<Url> {
    let base = if auth_domain.contains("://") {
        auth_domain.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", auth_domain.trim_end_matches('/'))
    };
    Ok(Url::parse_with_params(
        &format!("{}/auth/desktop", base),
        &[("callback", callback_url)],
    )?)
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Principal> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.call("signInWithPassword", &body, PASSWORD_PROVIDER_ID)
            .await
    }

    async fn sign_up_with_password(&self, email: &str, password: &str) -> AuthResult<Principal> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.call("signUp", &body, PASSWORD_PROVIDER_ID).await
    }

    async fn sign_in_delegated(&self) -> AuthResult<Principal> {
        let auth_domain = self.options.auth_domain.as_deref().ok_or_else(|| {
            AuthError::Config("auth domain is required for delegated sign-in".to_string())
        })?;

        let listener = self.options.callback_server.listen().await?;
        let callback_url = listener.callback_url();
        let start_url = delegated_start_url(auth_domain, &callback_url)?;
        (self.opener)(start_url.as_str());

        match listener.wait().await? {
            CallbackOutcome::Token {
                id_token,
                provider_id,
            } => {
                let post_body = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("id_token", &id_token)
                    .append_pair("providerId", &provider_id)
                    .finish();
                let body = serde_json::json!({
                    "postBody": post_body,
                    "requestUri": callback_url,
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                });
                self.call("signInWithIdp", &body, &provider_id).await
            }
            CallbackOutcome::Denied(reason) => {
                info!(reason = %reason, "Delegated sign-in denied in browser");
                Err(AuthError::DelegatedFlowAbandoned(reason))
            }
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.store.delete(StorageKeys::AUTH_USER)?;
        self.store.delete(StorageKeys::AUTH_REFRESH_TOKEN)?;
        info!("Signed out");
        self.broadcast(None);
        Ok(())
    }

    fn watch_auth_state(&self) -> AuthResult<AuthStateStream> {
        let current = self.persisted_principal()?;
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail here.
        let _ = tx.send(current);
        self.watchers.lock().push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_store::{LocalStore, MemoryStore};

    fn client(store: SharedStore) -> FirebaseAuthClient {
        FirebaseAuthClient::new(
            FirebaseAuthOptions::new("test-key", "http://127.0.0.1:9/v1/"),
            store,
        )
    }

    #[test]
    fn test_endpoint_url() {
        let client = client(Arc::new(MemoryStore::new()));
        assert_eq!(
            client.endpoint_url("signUp"),
            "http://127.0.0.1:9/v1/accounts:signUp?key=test-key"
        );
    }

    #[test]
    fn test_delegated_start_url() {
        let url = delegated_start_url("prosperia.firebaseapp.com", "http://localhost:4000/callback")
            .unwrap();
        assert_eq!(url.host_str(), Some("prosperia.firebaseapp.com"));
        assert_eq!(url.path(), "/auth/desktop");
        let callback: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            callback,
            vec![("callback".to_string(), "http://localhost:4000/callback".to_string())]
        );

        let local = delegated_start_url("http://127.0.0.1:5000/", "cb").unwrap();
        assert_eq!(local.as_str(), "http://127.0.0.1:5000/auth/desktop?callback=cb");
    }

    #[test]
    fn test_provider_error_parsing() {
        let err = provider_error(
            "signInWithPassword",
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#,
        );
        match err {
            AuthError::Provider { code, .. } => assert_eq!(code, "WEAK_PASSWORD"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = provider_error("signUp", reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            AuthError::Provider { code, message } => {
                assert_eq!(code, "HTTP_502");
                assert!(!message.contains("oops"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_emits_persisted_user_first() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let principal = Principal {
            uid: "u-9".into(),
            email: Some("ana@prosperia.app".into()),
            display_name: None,
            provider_id: "password".into(),
        };
        store.set_json(StorageKeys::AUTH_USER, &principal).unwrap();

        let client = client(store);
        let mut stream = client.watch_auth_state().unwrap();
        assert_eq!(stream.recv().await, Some(Some(principal)));
    }

    #[tokio::test]
    async fn test_corrupt_persisted_user_reads_as_signed_out() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_USER, "{not json").unwrap();

        let client = client(store);
        let mut stream = client.watch_auth_state().unwrap();
        assert_eq!(stream.recv().await, Some(None));
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_notifies() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(StorageKeys::AUTH_USER, r#"{"uid":"u","providerId":"password"}"#).unwrap();
        store.set(StorageKeys::AUTH_REFRESH_TOKEN, "refresh").unwrap();

        let client = client(Arc::clone(&store));
        let mut stream = client.watch_auth_state().unwrap();
        assert!(stream.recv().await.unwrap().is_some());

        client.sign_out().await.unwrap();
        assert_eq!(stream.recv().await, Some(None));
        assert!(!store.has(StorageKeys::AUTH_USER).unwrap());
        assert!(!store.has(StorageKeys::AUTH_REFRESH_TOKEN).unwrap());
    }

    #[tokio::test]
    async fn test_delegated_requires_auth_domain() {
        let client = client(Arc::new(MemoryStore::new()));
        assert!(matches!(
            client.sign_in_delegated().await,
            Err(AuthError::Config(_))
        ));
    }
}
