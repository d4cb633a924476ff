//! # Checkout Types
//!
//! Domain types and port traits for the checkout core.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Amount, CardInfo) and validators
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Wire-level request and response bodies
//! - `error/` - Domain, validation, 3-D Secure and service error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use currencies::CurrencyCode;
pub use domain::{
    Amount, CardBrand, CardInfo, format_amount, is_valid_card_number, is_valid_cvv,
    is_valid_expiry,
};
pub use dto::*;
pub use error::{
    BoxError, CheckoutError, DomainError, GatewayError, ProtocolErrorDetail, RuntimeErrorDetail,
    TransactionError, ValidationError,
};
pub use ports::{
    ChallengeCompletion, ChallengeFailure, ChallengeHandler, PaymentGateway, ProtocolErrorEvent,
    RuntimeErrorEvent, VendorErrorMessage,
};
