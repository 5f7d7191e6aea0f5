//! Credential attempts and their local validation.

use crate::{AuthFailure, AuthFailureReason};
use std::fmt;
use validator::Validate;

/// Minimum accepted secret length, in characters.
pub const MIN_SECRET_LEN: u64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    SignIn,
    SignUp,
}

/// Email and secret submitted for one sign-in or sign-up call. Never stored.
#[derive(Clone, Validate)]
pub struct CredentialAttempt {
    pub kind: AttemptKind,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = MIN_SECRET_LEN, message = "Secret is too short"))]
    pub secret: String,
}

impl fmt::Debug for CredentialAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialAttempt")
            .field("kind", &self.kind)
            .field("email", &self.email)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl CredentialAttempt {
    pub fn sign_in(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            kind: AttemptKind::SignIn,
            email: email.into(),
            secret: secret.into(),
        }
    }

    pub fn sign_up(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            kind: AttemptKind::SignUp,
            email: email.into(),
            secret: secret.into(),
        }
    }

    /// Sign-up attempt from a form with a confirmation field.
    pub fn sign_up_confirmed(
        email: impl Into<String>,
        secret: impl Into<String>,
        confirmation: &str,
    ) -> Result<Self, AuthFailure> {
        let attempt = Self::sign_up(email, secret);
        if attempt.secret != confirmation {
            return Err(AuthFailure::new(
                AuthFailureReason::PasswordMismatch,
                "password confirmation does not match",
            ));
        }
        Ok(attempt)
    }

    /// Check the attempt before it reaches the provider.
    ///
    /// An invalid email wins over a short secret, matching the order the
    /// form reports them.
    pub fn check(&self) -> Result<(), AuthFailure> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };

        let fields = errors.field_errors();
        if fields.contains_key("email") {
            return Err(AuthFailure::new(
                AuthFailureReason::InvalidEmail,
                format!("'{}' is not a valid email address", self.email),
            ));
        }

        let reason = match self.kind {
            AttemptKind::SignUp => AuthFailureReason::WeakPassword,
            AttemptKind::SignIn => AuthFailureReason::InvalidCredential,
        };
        Err(AuthFailure::new(
            reason,
            format!("secret must be at least {} characters", MIN_SECRET_LEN),
        ))
    }
}
