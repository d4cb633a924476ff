//! Error types for the checkout core.

use serde::Serialize;

use crate::ports::ChallengeFailure;

/// Boxed cause kept by errors that wrap something they do not understand.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Domain-level errors (value construction rules).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),
}

/// Client-side validation failures, surfaced inline before submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid card number")]
    InvalidCardNumber,

    #[error("Invalid security code")]
    InvalidCvv,

    #[error("Invalid expiry date: {month:02}/{year}")]
    InvalidExpiry { month: u8, year: u16 },

    #[error("Binding id cannot be empty")]
    MissingBindingId,
}

/// Details of a 3-D Secure protocol error, stripped of vendor types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolErrorDetail {
    pub transaction_id: String,
    pub error_code: String,
    pub error_description: String,
    pub error_details: Option<String>,
    pub error_component: Option<String>,
    pub message_version: Option<String>,
}

/// Details of a 3-D Secure runtime error, stripped of vendor types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeErrorDetail {
    pub code: Option<String>,
    pub message: String,
}

/// Normalized outcome of a failed 3-D Secure challenge.
///
/// This is the only 3-D Secure error type the checkout flow exposes. Callers
/// match exhaustively on the five cases.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("3-D Secure challenge timed out")]
    Timeout,

    #[error("3-D Secure challenge cancelled by the payer")]
    Cancelled,

    #[error("3-D Secure protocol error {}: {}", .0.error_code, .0.error_description)]
    ProtocolError(ProtocolErrorDetail),

    #[error("3-D Secure runtime error: {}", .0.message)]
    RuntimeError(RuntimeErrorDetail),

    #[error("Unexpected 3-D Secure failure: {0}")]
    Unknown(#[source] BoxError),
}

impl TransactionError {
    /// Returns the preserved cause of an `Unknown` failure.
    pub fn unknown_cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            TransactionError::Unknown(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Short machine-readable name of the case, for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionError::Timeout => "timeout",
            TransactionError::Cancelled => "cancelled",
            TransactionError::ProtocolError(_) => "protocol_error",
            TransactionError::RuntimeError(_) => "runtime_error",
            TransactionError::Unknown(_) => "unknown",
        }
    }
}

impl From<ChallengeFailure> for TransactionError {
    fn from(failure: ChallengeFailure) -> Self {
        match failure {
            ChallengeFailure::Timeout => TransactionError::Timeout,
            ChallengeFailure::Cancelled => TransactionError::Cancelled,
            ChallengeFailure::Protocol(event) => {
                let message = event.error_message;
                TransactionError::ProtocolError(ProtocolErrorDetail {
                    transaction_id: if message.transaction_id.is_empty() {
                        event.sdk_transaction_id
                    } else {
                        message.transaction_id
                    },
                    error_code: message.error_code,
                    error_description: message.error_description,
                    error_details: message.error_details,
                    error_component: message.error_component,
                    message_version: message.message_version_number,
                })
            }
            ChallengeFailure::Runtime(event) => TransactionError::RuntimeError(RuntimeErrorDetail {
                code: event.error_code,
                message: event.error_message,
            }),
            ChallengeFailure::Other(cause) => TransactionError::Unknown(cause),
        }
    }
}

/// Port-level failures of the payment gateway (network client).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed gateway response: {0}")]
    Decode(String),
}

/// Service-level errors returned by the checkout flow.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Gateway kept requesting 3-D Secure challenges after {rounds} rounds")]
    ChallengeLoop { rounds: usize },
}
