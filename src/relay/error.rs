//! Relay errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::json_error;
use crate::ledger::LedgerError;
use crate::store::StoreError;

/// A precondition or resolution failure detected before any broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Error: no auth key")]
    NoAuthKey,

    #[error("Error: no config")]
    NoConfig,

    /// A sender or entity lookup found nothing usable.
    #[error("Unknown {role}")]
    UnknownEntity { role: &'static str },

    #[error("Insufficient balance")]
    InsufficientBalance,
}

impl Rejection {
    /// Stable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::NoAuthKey => "no-auth-key",
            Rejection::NoConfig => "no-config",
            Rejection::UnknownEntity { .. } => "unknown-entity",
            Rejection::InsufficientBalance => "insufficient-balance",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::NoAuthKey | Rejection::UnknownEntity { .. } => StatusCode::UNAUTHORIZED,
            Rejection::NoConfig => StatusCode::INTERNAL_SERVER_ERROR,
            Rejection::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Failure class, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing key, missing config or insufficient balance.
    Precondition,
    /// Sender or entity could not be resolved.
    Resolution,
    /// Network, signing, address or store failure. Includes announce
    /// failures after a fallback node was used.
    Transport,
}

/// Terminal failure of a relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Transport(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelayError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RelayError::Rejected(Rejection::UnknownEntity { .. }) => ErrorClass::Resolution,
            RelayError::Rejected(_) => ErrorClass::Precondition,
            RelayError::Transport(_) | RelayError::Store(_) => ErrorClass::Transport,
        }
    }

    /// Reason code for response bodies and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::Rejected(rejection) => rejection.reason(),
            RelayError::Transport(_) => "transport-failure",
            RelayError::Store(_) => "store-failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Rejected(rejection) => rejection.status(),
            RelayError::Transport(_) => StatusCode::BAD_GATEWAY,
            RelayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        json_error(self.status(), self.reason(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(Rejection::NoAuthKey.reason(), "no-auth-key");
        assert_eq!(Rejection::NoConfig.reason(), "no-config");
        assert_eq!(Rejection::InsufficientBalance.reason(), "insufficient-balance");
        assert_eq!(
            RelayError::from(LedgerError::NoUsableNode).reason(),
            "transport-failure"
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(
            RelayError::from(Rejection::NoConfig).class(),
            ErrorClass::Precondition
        );
        assert_eq!(
            RelayError::from(Rejection::UnknownEntity { role: "sender" }).class(),
            ErrorClass::Resolution
        );
        assert_eq!(
            RelayError::from(LedgerError::NoUsableNode).class(),
            ErrorClass::Transport
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::from(Rejection::NoAuthKey).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RelayError::from(Rejection::InsufficientBalance)
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RelayError::from(LedgerError::Rpc("down".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
