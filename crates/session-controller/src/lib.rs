//! Session state for ProsperIA.
//!
//! [`SessionController`] is the single authority over "is someone signed in,
//! and who". It holds the one subscription to the identity provider's change
//! stream, fans changes out to registered callbacks, and mediates every
//! sign-in, sign-up and sign-out call. [`route_guard`] turns a session
//! snapshot into a render/redirect decision for a view.
//!
//! [`FirebaseAuthClient`] implements [`IdentityProvider`] against the
//! Identity Toolkit REST API.

mod controller;
mod credentials;
mod error;
mod firebase;
mod oauth;
mod provider;
pub mod route_guard;
mod session;
mod session_fsm;

pub use controller::{SessionController, SessionListener, Subscription};
pub use credentials::{AttemptKind, CredentialAttempt, MIN_SECRET_LEN};
pub use error::{AuthError, AuthFailure, AuthFailureReason, AuthResult};
pub use firebase::{FirebaseAuthClient, FirebaseAuthOptions, UrlOpener};
pub use oauth::{
    CallbackListener, CallbackOutcome, CallbackServer, DEFAULT_CALLBACK_PORT,
    DEFAULT_CALLBACK_TIMEOUT_SECS,
};
pub use provider::{AuthStateStream, IdentityProvider, ProviderHandle};
pub use route_guard::{GuardDecision, Route, RouteGuard};
pub use session::{Principal, Session, SessionStatus};
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState};
