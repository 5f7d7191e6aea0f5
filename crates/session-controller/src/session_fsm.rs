//! Session state machine using rust-fsm.
//!
//! Consumers only see two statuses, `Pending` and `Resolved`. Internally the
//! controller tracks why a session is pending so transitions are explicit
//! and logged.
//!
//! ```text
//!                ┌──────────────┐
//!                │ Initializing │ (initial)
//!                └──────┬───────┘
//!                       │ SettledSignedIn / SettledSignedOut
//!                       ▼
//!     ┌───────────┐            ┌───────────┐
//!     │ SignedOut │ ◄────────► │ SignedIn  │
//!     └─────┬─────┘            └─────┬─────┘
//!           │ AttemptStarted         │ SignOutRequested
//!           ▼                        ▼
//!   ┌────────────────┐        ┌────────────┐
//!   │ Authenticating │        │ SigningOut │
//!   └────────────────┘        └────────────┘
//!           │ Settled*               │ Settled*
//!           ▼                        ▼
//!    SignedIn / SignedOut     SignedIn / SignedOut
//! ```
//!
//! Concurrent calls are not sequenced, so every state accepts every input:
//! an attempt may start while another is in flight, and provider
//! notifications may settle the machine from any state.

use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Initializing)

    Initializing => {
        AttemptStarted => Authenticating,
        SignOutRequested => SigningOut,
        SettledSignedIn => SignedIn,
        SettledSignedOut => SignedOut
    },
    SignedOut => {
        AttemptStarted => Authenticating,
        SignOutRequested => SigningOut,
        SettledSignedIn => SignedIn,
        SettledSignedOut => SignedOut
    },
    SignedIn => {
        AttemptStarted => Authenticating,
        SignOutRequested => SigningOut,
        SettledSignedIn => SignedIn,
        SettledSignedOut => SignedOut
    },
    Authenticating => {
        AttemptStarted => Authenticating,
        SignOutRequested => SigningOut,
        SettledSignedIn => SignedIn,
        SettledSignedOut => SignedOut
    },
    SigningOut => {
        AttemptStarted => Authenticating,
        SignOutRequested => SigningOut,
        SettledSignedIn => SignedIn,
        SettledSignedOut => SignedOut
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

impl SessionMachineState {
    /// Whether the machine is waiting on the provider.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SessionMachineState::Initializing
                | SessionMachineState::Authenticating
                | SessionMachineState::SigningOut
        )
    }
}

/// Settle input matching the presence of a principal.
pub(crate) fn settle_input(signed_in: bool) -> SessionMachineInput {
    if signed_in {
        SessionMachineInput::SettledSignedIn
    } else {
        SessionMachineInput::SettledSignedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [SessionMachineState; 5] = [
        SessionMachineState::Initializing,
        SessionMachineState::SignedOut,
        SessionMachineState::SignedIn,
        SessionMachineState::Authenticating,
        SessionMachineState::SigningOut,
    ];

    fn machine_in(state: &SessionMachineState) -> SessionMachine {
        let mut machine = SessionMachine::new();
        let path: &[SessionMachineInput] = match state {
            SessionMachineState::Initializing => &[],
            SessionMachineState::SignedOut => &[SessionMachineInput::SettledSignedOut],
            SessionMachineState::SignedIn => &[SessionMachineInput::SettledSignedIn],
            SessionMachineState::Authenticating => &[SessionMachineInput::AttemptStarted],
            SessionMachineState::SigningOut => &[SessionMachineInput::SignOutRequested],
        };
        for input in path {
            machine.consume(input).unwrap();
        }
        assert_eq!(machine.state(), state);
        machine
    }

    #[test]
    fn test_initial_state_is_initializing() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::Initializing);
        assert!(machine.state().is_pending());
    }

    #[test]
    fn test_sign_in_flow() {
        let mut machine = machine_in(&SessionMachineState::SignedOut);

        machine.consume(&SessionMachineInput::AttemptStarted).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticating);

        machine.consume(&SessionMachineInput::SettledSignedIn).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_failed_attempt_restores_previous_outcome() {
        let mut machine = machine_in(&SessionMachineState::SignedIn);

        machine.consume(&SessionMachineInput::AttemptStarted).unwrap();
        machine.consume(&settle_input(true)).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedIn);
    }

    #[test]
    fn test_sign_out_flow() {
        let mut machine = machine_in(&SessionMachineState::SignedIn);

        machine.consume(&SessionMachineInput::SignOutRequested).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SigningOut);
        assert!(machine.state().is_pending());

        machine.consume(&settle_input(false)).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_settle_accepted_from_every_state() {
        for state in &ALL_STATES {
            for signed_in in [true, false] {
                let mut machine = machine_in(state);
                assert!(
                    machine.consume(&settle_input(signed_in)).is_ok(),
                    "settle({signed_in}) rejected from {state:?}"
                );
                assert!(!machine.state().is_pending());
            }
        }
    }

    #[test]
    fn test_attempts_accepted_from_every_state() {
        for state in &ALL_STATES {
            let mut machine = machine_in(state);
            machine.consume(&SessionMachineInput::AttemptStarted).unwrap();
            assert_eq!(*machine.state(), SessionMachineState::Authenticating);

            let mut machine = machine_in(state);
            machine.consume(&SessionMachineInput::SignOutRequested).unwrap();
            assert_eq!(*machine.state(), SessionMachineState::SigningOut);
        }
    }

    #[test]
    fn test_pending_projection() {
        assert!(SessionMachineState::Initializing.is_pending());
        assert!(SessionMachineState::Authenticating.is_pending());
        assert!(SessionMachineState::SigningOut.is_pending());
        assert!(!SessionMachineState::SignedIn.is_pending());
        assert!(!SessionMachineState::SignedOut.is_pending());
    }
}
