//! 3-D Secure challenge port.
//!
//! The vendor 3-D Secure component is wrapped by an adapter implementing
//! [`ChallengeHandler`]. Its failures are described with the event types
//! below and converted into [`TransactionError`](crate::TransactionError)
//! before they reach the checkout flow's callers.

use crate::dto::{ChallengeWindowSize, ThreeDsChallenge};
use crate::error::BoxError;

/// Error message carried by a 3-D Secure protocol error event.
///
/// Field names follow the EMV 3-D Secure `Erro` message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorErrorMessage {
    pub transaction_id: String,
    pub error_code: String,
    pub error_description: String,
    pub error_details: Option<String>,
    pub error_component: Option<String>,
    pub error_message_type: Option<String>,
    pub message_version_number: Option<String>,
}

/// Protocol error reported by the 3-D Secure SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolErrorEvent {
    pub sdk_transaction_id: String,
    pub error_message: VendorErrorMessage,
}

/// Runtime error reported by the 3-D Secure SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeErrorEvent {
    pub error_code: Option<String>,
    pub error_message: String,
}

/// Everything a challenge can end with other than completion.
#[derive(Debug)]
pub enum ChallengeFailure {
    Timeout,
    Cancelled,
    Protocol(ProtocolErrorEvent),
    Runtime(RuntimeErrorEvent),
    /// Any failure the adapter could not classify.
    Other(BoxError),
}

/// Result of a completed challenge, sent back to the gateway as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeCompletion {
    pub sdk_transaction_id: String,
    pub transaction_status: String,
    /// Opaque payload the backend needs to finish authentication.
    pub packed_authentication_data: String,
}

/// Port trait for the component that runs the 3-D Secure challenge UI.
#[async_trait::async_trait]
pub trait ChallengeHandler: Send + Sync {
    async fn perform_challenge(
        &self,
        challenge: &ThreeDsChallenge,
        window: Option<ChallengeWindowSize>,
    ) -> Result<ChallengeCompletion, ChallengeFailure>;
}
