//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The checkout flow depends on these traits, not concrete implementations.

mod challenge;
mod gateway;

pub use challenge::{
    ChallengeCompletion, ChallengeFailure, ChallengeHandler, ProtocolErrorEvent,
    RuntimeErrorEvent, VendorErrorMessage,
};
pub use gateway::PaymentGateway;
