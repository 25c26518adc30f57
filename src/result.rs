//! Outcome channel between the gateway and presentation code.

use crate::message::UiMessage;

/// Two-variant outcome returned by every gateway operation.
///
/// There is deliberately no pending variant; screens track in-flight state
/// themselves with an enabled flag (see [`crate::state::ScreenState`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult<T> {
    Success(T),
    Error(UiMessage),
}

impl<T> AuthResult<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Consumes the outcome, returning the success value if present.
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The user-displayable message if the operation failed.
    #[must_use]
    pub const fn error(&self) -> Option<UiMessage> {
        match self {
            Self::Success(_) => None,
            Self::Error(message) => Some(*message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AuthResult<U> {
        match self {
            Self::Success(value) => AuthResult::Success(f(value)),
            Self::Error(message) => AuthResult::Error(message),
        }
    }
}
