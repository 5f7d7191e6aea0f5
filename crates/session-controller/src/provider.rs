//! Identity provider boundary.

use crate::{AuthResult, Principal};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Change stream of the signed-in principal. The first item is the current
/// user (or `None`), later items follow every change.
pub type AuthStateStream = mpsc::UnboundedReceiver<Option<Principal>>;

/// Sign-in primitives and change notifications of an identity provider.
///
/// A successful call returns the principal, but the provider must also emit
/// it on every open [`AuthStateStream`]; consumers treat the stream as the
/// authoritative signal.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Principal>;

    async fn sign_up_with_password(&self, email: &str, password: &str) -> AuthResult<Principal>;

    /// Run a browser-based flow where credentials are entered in the
    /// provider's own UI.
    async fn sign_in_delegated(&self) -> AuthResult<Principal>;

    /// Revoke the current session. Implementations emit `None` on success.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Open a change stream.
    fn watch_auth_state(&self) -> AuthResult<AuthStateStream>;
}

/// An identity provider that may be missing from the configuration.
#[derive(Clone)]
pub enum ProviderHandle {
    Configured(Arc<dyn IdentityProvider>),
    Unconfigured,
}

impl ProviderHandle {
    pub fn configured(provider: impl IdentityProvider + 'static) -> Self {
        ProviderHandle::Configured(Arc::new(provider))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ProviderHandle::Configured(_))
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderHandle::Configured(_) => f.write_str("ProviderHandle::Configured(..)"),
            ProviderHandle::Unconfigured => f.write_str("ProviderHandle::Unconfigured"),
        }
    }
}
