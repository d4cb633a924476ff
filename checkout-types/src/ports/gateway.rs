//! Payment gateway port.
//!
//! The network client that talks to the payment backend implements this
//! trait. Implementations can be HTTP clients, in-memory fakes, etc.

use crate::dto::{ContinuePaymentRequest, ExecutePaymentRequest, PaymentOrder, PaymentOutcome};
use crate::error::GatewayError;

/// Port trait for the payment backend.
///
/// Callers must not submit a second `ExecutePaymentRequest` for an order
/// while the previous one is still in flight.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Fetches the order being paid, with its amount and saved bindings.
    async fn get_order(&self, order_id: &str) -> Result<PaymentOrder, GatewayError>;

    /// Submits the payer's chosen method for an order.
    async fn execute_payment(
        &self,
        order_id: &str,
        req: &ExecutePaymentRequest,
    ) -> Result<PaymentOutcome, GatewayError>;

    /// Resumes an order after a 3-D Secure challenge or PayPal approval.
    async fn continue_payment(
        &self,
        order_id: &str,
        req: &ContinuePaymentRequest,
    ) -> Result<PaymentOutcome, GatewayError>;
}
