//! Session snapshot types.

use crate::session_fsm::SessionMachineState;
use serde::{Deserialize, Serialize};

/// Authenticated identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `password`, `google.com`, ...
    pub provider_id: String,
}

/// Whether the session reflects a settled provider answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Resolved,
}

impl From<&SessionMachineState> for SessionStatus {
    fn from(state: &SessionMachineState) -> Self {
        if state.is_pending() {
            SessionStatus::Pending
        } else {
            SessionStatus::Resolved
        }
    }
}

/// Immutable snapshot handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub principal: Option<Principal>,
    pub status: SessionStatus,
    /// False when the identity provider was never configured; the principal
    /// then stays absent for the whole process.
    pub provider_available: bool,
}

impl Session {
    pub fn is_pending(&self) -> bool {
        self.status == SessionStatus::Pending
    }

    /// Resolved with a principal present.
    pub fn is_signed_in(&self) -> bool {
        self.status == SessionStatus::Resolved && self.principal.is_some()
    }

    /// Resolved with no principal.
    pub fn is_signed_out(&self) -> bool {
        self.status == SessionStatus::Resolved && self.principal.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_wire_format() {
        let principal = Principal {
            uid: "u-1".into(),
            email: Some("ana@prosperia.app".into()),
            display_name: None,
            provider_id: "password".into(),
        };

        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(json["uid"], "u-1");
        assert_eq!(json["providerId"], "password");
        assert!(json.get("displayName").is_none());

        let back: Principal = serde_json::from_value(json).unwrap();
        assert_eq!(back, principal);
    }

    #[test]
    fn test_status_projection() {
        assert_eq!(
            SessionStatus::from(&SessionMachineState::Authenticating),
            SessionStatus::Pending
        );
        assert_eq!(
            SessionStatus::from(&SessionMachineState::SignedOut),
            SessionStatus::Resolved
        );
    }

    #[test]
    fn test_session_predicates() {
        let signed_out = Session {
            principal: None,
            status: SessionStatus::Resolved,
            provider_available: true,
        };
        assert!(signed_out.is_signed_out());
        assert!(!signed_out.is_signed_in());

        let pending = Session {
            status: SessionStatus::Pending,
            ..signed_out.clone()
        };
        assert!(pending.is_pending());
        assert!(!pending.is_signed_out());
    }
}
