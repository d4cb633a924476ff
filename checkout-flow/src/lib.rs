//! # Checkout Flow
//!
//! Application service layer of the checkout core.
//!
//! ## Architecture
//!
//! - `service/` - Application service (validates, submits, runs challenges)
//!
//! The service is generic over `G: PaymentGateway` and `C: ChallengeHandler`,
//! allowing different network clients and 3-D Secure adapters to be injected.

pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::{CheckoutService, MAX_CHALLENGE_ROUNDS, PaymentAttempt, validate_selection};
