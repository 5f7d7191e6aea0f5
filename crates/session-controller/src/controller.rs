//! Session controller with FSM-based state tracking and change fan-out.
//!
//! The controller owns the only [`Session`] in the process. It opens exactly
//! one change stream on the identity provider and delivers every change to
//! registered listeners, serially and in registration order.
//!
//! # Two-phase completion
//!
//! Mutating calls move the session to `Pending` before talking to the
//! provider. Their return value says whether the provider accepted the
//! request; the principal itself changes when the provider's notification
//! arrives on the change stream. Callers that need "who is signed in now"
//! should wait for their listener to fire and read [`Session::principal`]
//! from it rather than assume the call's return implies it.
//!
//! Pending transitions caused by mutating calls are visible through
//! [`SessionController::current_session`] but are not delivered to
//! listeners; listeners see one invocation per settled change.

use crate::credentials::{AttemptKind, CredentialAttempt};
use crate::session_fsm::{settle_input, SessionMachine, SessionMachineInput};
use crate::{
    AuthFailure, AuthResult, AuthStateStream, IdentityProvider, Principal, ProviderHandle,
    Session, SessionStatus,
};
use parking_lot::{Mutex, ReentrantMutex};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Callback invoked with every settled session change.
pub type SessionListener = Arc<dyn Fn(&Session) + Send + Sync>;

struct Subscriber {
    id: u64,
    listener: SessionListener,
    /// Last snapshot this listener was handed.
    last_seen: Session,
}

struct State {
    machine: SessionMachine,
    principal: Option<Principal>,
    subscribers: Vec<Subscriber>,
    next_subscriber_id: u64,
}

struct Shared {
    provider: ProviderHandle,
    state: Mutex<State>,
    /// Held while handing snapshots to listeners. Re-entrant so a listener
    /// may subscribe from inside its own callback.
    delivery: ReentrantMutex<()>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn snapshot(&self, state: &State) -> Session {
        Session {
            principal: state.principal.clone(),
            status: SessionStatus::from(state.machine.state()),
            provider_available: self.provider.is_configured(),
        }
    }

    fn current_session(&self) -> Session {
        let state = self.state.lock();
        self.snapshot(&state)
    }

    /// Feed an input to the FSM, logging the transition.
    fn transition(&self, state: &mut State, input: &SessionMachineInput) {
        let old_state = state.machine.state().clone();
        match state.machine.consume(input) {
            Ok(_) => {
                let new_state = state.machine.state();
                if old_state != *new_state {
                    debug!(old_state = ?old_state, new_state = ?new_state, "Session state transition");
                }
            }
            Err(_) => {
                error!(input = ?input, state = ?old_state, "Rejected session state transition");
            }
        }
    }

    fn begin(&self, input: SessionMachineInput) {
        let mut state = self.state.lock();
        self.transition(&mut state, &input);
    }

    /// Replace the principal, settle the FSM, then deliver.
    fn apply(&self, principal: Option<Principal>) {
        {
            let mut state = self.state.lock();
            state.principal = principal;
            let input = settle_input(state.principal.is_some());
            self.transition(&mut state, &input);
        }
        self.fan_out();
    }

    /// Settle on whatever principal is currently known.
    fn restore(&self) {
        {
            let mut state = self.state.lock();
            let input = settle_input(state.principal.is_some());
            self.transition(&mut state, &input);
        }
        self.fan_out();
    }

    /// Settle only if `principal` is already the known one. Used after a
    /// successful call whose notification may carry no change.
    fn settle_if_current(&self, principal: &Principal) {
        let settled = {
            let mut state = self.state.lock();
            if state.principal.as_ref() == Some(principal) {
                self.transition(&mut state, &SessionMachineInput::SettledSignedIn);
                true
            } else {
                false
            }
        };
        if settled {
            self.fan_out();
        }
    }

    /// Deliver the current snapshot to every listener that has not seen it.
    fn fan_out(&self) {
        let _delivery = self.delivery.lock();

        let (session, due) = {
            let mut state = self.state.lock();
            let session = self.snapshot(&state);
            if session.is_pending() {
                return;
            }
            let due: Vec<(u64, SessionListener)> = state
                .subscribers
                .iter_mut()
                .filter(|subscriber| subscriber.last_seen != session)
                .map(|subscriber| {
                    subscriber.last_seen = session.clone();
                    (subscriber.id, Arc::clone(&subscriber.listener))
                })
                .collect();
            (session, due)
        };

        if !due.is_empty() {
            debug!(
                listeners = due.len(),
                signed_in = session.principal.is_some(),
                "Delivering session change"
            );
        }

        for (id, listener) in due {
            // A listener earlier in the list may have unsubscribed this one.
            if self.is_subscribed(id) {
                listener(&session);
            }
        }
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.state.lock().subscribers.iter().any(|s| s.id == id)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(handle) = self.pump.get_mut().take() {
            handle.abort();
        }
    }
}

/// Consume the provider's change stream, one notification at a time.
async fn pump(shared: Weak<Shared>, mut stream: AuthStateStream) {
    while let Some(principal) = stream.recv().await {
        let Some(shared) = shared.upgrade() else {
            break;
        };
        debug!(
            uid = ?principal.as_ref().map(|p| &p.uid),
            "Identity provider notification"
        );
        shared.apply(principal);
    }
    debug!("Auth state stream closed");
}

/// Handle returned by [`SessionController::subscribe`].
///
/// Dropping it does not deregister the listener; call
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Deregister the listener. Calling it again has no effect.
    pub fn unsubscribe(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.state.lock().subscribers.retain(|s| s.id != self.id);
        }
    }
}

/// Process-wide authority over the signed-in principal.
///
/// Cheap to clone; all clones share one session. Dropping the last clone
/// stops consuming the provider's change stream.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    /// Create the controller and open the provider's change stream.
    ///
    /// With a configured provider this spawns the notification task and must
    /// be called from within a Tokio runtime. The session stays `Pending`
    /// until the first notification. An unconfigured provider resolves the
    /// session immediately, signed out, for the life of the controller.
    pub fn spawn(provider: ProviderHandle) -> Self {
        let shared = Arc::new(Shared {
            provider,
            state: Mutex::new(State {
                machine: SessionMachine::new(),
                principal: None,
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            }),
            delivery: ReentrantMutex::new(()),
            pump: Mutex::new(None),
        });

        match &shared.provider {
            ProviderHandle::Unconfigured => {
                warn!("Identity provider is not configured, authentication is disabled");
                shared.apply(None);
            }
            ProviderHandle::Configured(provider) => match provider.watch_auth_state() {
                Ok(stream) => {
                    let handle = tokio::spawn(pump(Arc::downgrade(&shared), stream));
                    *shared.pump.lock() = Some(handle);
                }
                Err(e) => {
                    error!(error = %e, "Failed to open auth state stream, treating as signed out");
                    shared.apply(None);
                }
            },
        }

        Self { shared }
    }

    /// Synchronous snapshot of the latest known state.
    pub fn current_session(&self) -> Session {
        self.shared.current_session()
    }

    pub fn provider_available(&self) -> bool {
        self.shared.provider.is_configured()
    }

    /// Register a listener.
    ///
    /// It is invoked once right away with the current state, then once for
    /// every later settled change, never twice for the same snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let listener: SessionListener = Arc::new(listener);
        let _delivery = self.shared.delivery.lock();

        let (id, session) = {
            let mut state = self.shared.state.lock();
            let id = state.next_subscriber_id;
            state.next_subscriber_id += 1;
            let session = self.shared.snapshot(&state);
            state.subscribers.push(Subscriber {
                id,
                listener: Arc::clone(&listener),
                last_seen: session.clone(),
            });
            (id, session)
        };

        listener(&session);

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().subscribers.len()
    }

    /// Sign in with email and password.
    ///
    /// Returns the principal the provider accepted; the session changes when
    /// the provider's notification arrives. Rejections leave the principal
    /// untouched and the session resolved.
    pub async fn sign_in_with_credentials(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Principal, AuthFailure> {
        self.submit(CredentialAttempt::sign_in(email, secret)).await
    }

    /// Create an identity with email and password. Same contract as
    /// [`Self::sign_in_with_credentials`].
    pub async fn sign_up_with_credentials(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<Principal, AuthFailure> {
        self.submit(CredentialAttempt::sign_up(email, secret)).await
    }

    /// Submit a prepared attempt (e.g. from [`CredentialAttempt::sign_up_confirmed`]).
    pub async fn submit(&self, attempt: CredentialAttempt) -> Result<Principal, AuthFailure> {
        let provider = self.configured_provider()?;
        attempt.check()?;

        self.shared.begin(SessionMachineInput::AttemptStarted);
        info!(kind = ?attempt.kind, "Credential attempt started");
        debug!(email = %attempt.email, "Credential attempt email");

        let result = match attempt.kind {
            AttemptKind::SignIn => {
                provider
                    .sign_in_with_password(&attempt.email, &attempt.secret)
                    .await
            }
            AttemptKind::SignUp => {
                provider
                    .sign_up_with_password(&attempt.email, &attempt.secret)
                    .await
            }
        };
        self.finish_attempt(result)
    }

    /// Run the provider's delegated (browser) flow.
    ///
    /// Resolves once the flow completes; the principal arrives through the
    /// change stream.
    pub async fn sign_in_delegated(&self) -> Result<(), AuthFailure> {
        let provider = self.configured_provider()?;

        self.shared.begin(SessionMachineInput::AttemptStarted);
        info!("Delegated sign-in started");

        self.finish_attempt(provider.sign_in_delegated().await)
            .map(|_| ())
    }

    /// Sign out.
    ///
    /// The local principal is cleared whatever the provider answers, so the
    /// session always ends resolved and signed out. With nobody signed in
    /// this is a no-op.
    pub async fn sign_out(&self) {
        let ProviderHandle::Configured(provider) = &self.shared.provider else {
            debug!("Sign-out ignored, identity provider is not configured");
            return;
        };
        let provider = Arc::clone(provider);

        if self.current_session().is_signed_out() {
            debug!("Sign-out requested with no active session");
            return;
        }

        self.shared.begin(SessionMachineInput::SignOutRequested);

        if let Err(e) = provider.sign_out().await {
            warn!(error = %e, "Provider sign-out failed, clearing local session anyway");
        }

        self.shared.apply(None);
        info!("Signed out");
    }

    fn configured_provider(&self) -> Result<Arc<dyn IdentityProvider>, AuthFailure> {
        match &self.shared.provider {
            ProviderHandle::Configured(provider) => Ok(Arc::clone(provider)),
            ProviderHandle::Unconfigured => Err(AuthFailure::provider_unconfigured()),
        }
    }

    fn finish_attempt(&self, result: AuthResult<Principal>) -> Result<Principal, AuthFailure> {
        match result {
            Ok(principal) => {
                info!(uid = %principal.uid, provider_id = %principal.provider_id, "Authentication accepted");
                self.shared.settle_if_current(&principal);
                Ok(principal)
            }
            Err(e) => {
                let failure = AuthFailure::from(e);
                warn!(code = failure.code(), message = %failure.message, "Authentication failed");
                self.shared.restore();
                Err(failure)
            }
        }
    }
}
