//! Authentication error types.
//!
//! [`AuthError`] is the internal transport/provider error. Callers of the
//! session controller only ever see [`AuthFailure`], a structured value with
//! a stable reason code and a user-facing message.

use thiserror::Error;

/// Internal authentication error.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity provider rejected the request with an error code
    /// (e.g. `EMAIL_NOT_FOUND`).
    #[error("Identity provider error {code}: {message}")]
    Provider { code: String, message: String },

    /// The delegated flow was denied or abandoned in the browser
    #[error("Delegated sign-in abandoned: {0}")]
    DelegatedFlowAbandoned(String),

    /// Delegated flow callback never arrived
    #[error("Operation timed out")]
    Timeout,

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] local_store::StorageError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Timeout => true,
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                e.status().is_some_and(|status| status.is_server_error())
            }
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

/// Why an authentication attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailureReason {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    TooManyRequests,
    UserDisabled,
    OperationNotAllowed,
    NetworkRequestFailed,
    PopupClosedByUser,
    InternalError,
    PasswordMismatch,
    ProviderUnconfigured,
}

impl AuthFailureReason {
    /// Stable reason code, in the identity provider's `auth/*` vocabulary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::UserDisabled => "auth/user-disabled",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::PopupClosedByUser => "auth/popup-closed-by-user",
            Self::InternalError => "auth/internal-error",
            Self::PasswordMismatch => "auth/password-mismatch",
            Self::ProviderUnconfigured => "provider-unconfigured",
        }
    }

    /// Map an Identity Toolkit error message (`EMAIL_EXISTS`,
    /// `WEAK_PASSWORD : Password should be ...`) to a reason.
    pub fn from_provider_code(raw: &str) -> Self {
        let code = raw.split(':').next().unwrap_or(raw).trim();
        match code {
            "INVALID_EMAIL" => Self::InvalidEmail,
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "MISSING_PASSWORD" | "INVALID_IDP_RESPONSE" => {
                Self::InvalidCredential
            }
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
            "USER_DISABLED" => Self::UserDisabled,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => Self::OperationNotAllowed,
            _ => Self::InternalError,
        }
    }

    /// Spanish text shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderUnconfigured => "Firebase no está configurado. Contacta al administrador.",
            Self::InvalidEmail => "Por favor, introduce un correo válido.",
            Self::WeakPassword => "La contraseña debe tener al menos 6 caracteres.",
            Self::PasswordMismatch => "Las contraseñas no coinciden.",
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential => {
                "Correo o contraseña incorrectos."
            }
            Self::EmailAlreadyInUse => "Ya existe una cuenta con este correo.",
            Self::TooManyRequests => "Demasiados intentos. Inténtalo de nuevo más tarde.",
            Self::UserDisabled => "Esta cuenta ha sido deshabilitada.",
            Self::OperationNotAllowed => "Este método de inicio de sesión no está habilitado.",
            Self::NetworkRequestFailed => "No se pudo conectar. Revisa tu conexión a internet.",
            Self::PopupClosedByUser => "No se pudo iniciar sesión con Google.",
            Self::InternalError => "Ocurrió un error inesperado.",
        }
    }
}

/// Structured failure returned by every mutating session call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {}", .reason.code(), .message)]
pub struct AuthFailure {
    pub reason: AuthFailureReason,
    /// Provider-supplied (or locally generated) diagnostic message.
    pub message: String,
}

impl AuthFailure {
    pub fn new(reason: AuthFailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn provider_unconfigured() -> Self {
        Self::new(
            AuthFailureReason::ProviderUnconfigured,
            "identity provider is not configured",
        )
    }

    pub fn code(&self) -> &'static str {
        self.reason.code()
    }

    pub fn user_message(&self) -> &'static str {
        self.reason.user_message()
    }
}

impl From<AuthError> for AuthFailure {
    fn from(err: AuthError) -> Self {
        let reason = match &err {
            AuthError::Provider { code, .. } => AuthFailureReason::from_provider_code(code),
            AuthError::DelegatedFlowAbandoned(_) | AuthError::Timeout => {
                AuthFailureReason::PopupClosedByUser
            }
            AuthError::Http(e) if e.is_connect() || e.is_timeout() => {
                AuthFailureReason::NetworkRequestFailed
            }
            _ => AuthFailureReason::InternalError,
        };

        let message = match err {
            AuthError::Provider { message, .. } => message,
            other => other.to_string(),
        };

        Self { reason, message }
    }
}
