//! Checkout Application Service
//!
//! Orchestrates one checkout attempt through the gateway and challenge ports.
//! Contains NO infrastructure logic - pure flow orchestration.

use chrono::NaiveDate;

use checkout_types::{
    ChallengeCompletion, ChallengeHandler, ChallengeWindowSize, CheckoutError,
    ContinuePaymentRequest, DeviceDataRequest, ExchangeRequest, ExecutePaymentRequest,
    PayPalOrderApproveEvent, PayerRequest, PaymentGateway, PaymentOrder, PaymentOutcome,
    PaymentSelection, ThreeDsChallenge, TransactionError, ValidationError, is_valid_cvv,
    is_valid_expiry,
};

/// Challenges accepted per attempt before the gateway is considered stuck.
pub const MAX_CHALLENGE_ROUNDS: usize = 3;

/// Everything the payer provided for one checkout attempt.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    pub selection: PaymentSelection,
    pub device_data: DeviceDataRequest,
    pub payer: Option<PayerRequest>,
    pub challenge_window_size: Option<ChallengeWindowSize>,
    pub exchange: Option<ExchangeRequest>,
    pub return_url: Option<String>,
}

impl PaymentAttempt {
    pub fn new(selection: PaymentSelection, device_data: DeviceDataRequest) -> Self {
        Self {
            selection,
            device_data,
            payer: None,
            challenge_window_size: None,
            exchange: None,
            return_url: None,
        }
    }

    pub fn with_payer(mut self, payer: PayerRequest) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_challenge_window_size(mut self, size: ChallengeWindowSize) -> Self {
        self.challenge_window_size = Some(size);
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeRequest) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Builds the execute request body. Performs no validation.
    pub fn into_request(self) -> ExecutePaymentRequest {
        let mut request = ExecutePaymentRequest::assemble(
            self.selection,
            self.device_data,
            self.payer,
            self.challenge_window_size,
        );
        request.exchange = self.exchange;
        request.return_url = self.return_url;
        request
    }
}

/// Checks the payer's selection before anything is sent.
pub fn validate_selection(
    selection: &PaymentSelection,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    match selection {
        PaymentSelection::NewCard { card, .. } => {
            if !card.is_number_valid() {
                return Err(ValidationError::InvalidCardNumber);
            }
            if !is_valid_expiry(card.expiry_month, card.expiry_year, today) {
                return Err(ValidationError::InvalidExpiry {
                    month: card.expiry_month,
                    year: card.expiry_year,
                });
            }
            if !card.is_cvv_valid() {
                return Err(ValidationError::InvalidCvv);
            }
        }
        PaymentSelection::SavedCard { binding_id, cvv } => {
            if binding_id.trim().is_empty() {
                return Err(ValidationError::MissingBindingId);
            }
            if cvv.as_deref().is_some_and(|cvv| !is_valid_cvv(cvv)) {
                return Err(ValidationError::InvalidCvv);
            }
        }
    }
    Ok(())
}

/// Application service for checkout operations.
///
/// Generic over the gateway and the challenge adapter - both are injected at
/// compile time, so tests run the whole flow against in-memory fakes.
pub struct CheckoutService<G: PaymentGateway, C: ChallengeHandler> {
    gateway: G,
    challenges: C,
    today: Option<NaiveDate>,
}

impl<G: PaymentGateway, C: ChallengeHandler> CheckoutService<G, C> {
    /// Creates a new checkout service with the given adapters.
    pub fn new(gateway: G, challenges: C) -> Self {
        Self {
            gateway,
            challenges,
            today: None,
        }
    }

    /// Pins the date used for expiry checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Returns a reference to the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Order Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fetches the order to display in the checkout sheet.
    #[tracing::instrument(skip(self))]
    pub async fn load_order(&self, order_id: &str) -> Result<PaymentOrder, CheckoutError> {
        let order = self.gateway.get_order(order_id).await?;
        tracing::debug!(status = %order.status, bindings = order.bindings.len(), "order loaded");
        Ok(order)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validates, submits and, when asked for one, runs the 3-D Secure
    /// challenge before resuming the order.
    ///
    /// A redirect requirement is handed back in the outcome untouched.
    #[tracing::instrument(skip(self, attempt))]
    pub async fn pay(
        &self,
        order_id: &str,
        attempt: PaymentAttempt,
    ) -> Result<PaymentOutcome, CheckoutError> {
        if let Err(err) = validate_selection(&attempt.selection, self.today()) {
            tracing::info!(error = %err, "selection rejected before submission");
            return Err(err.into());
        }

        let window = attempt.challenge_window_size;
        let request = attempt.into_request();

        // Whether the backend rejects this is unknown; submit anyway.
        if request.binding_name_missing() {
            tracing::warn!("binding creation requested without a binding name");
        }

        let mut outcome = self.gateway.execute_payment(order_id, &request).await?;
        tracing::info!(status = %outcome.status, "payment submitted");

        let mut rounds = 0;
        while let Some(challenge) = outcome.challenge().cloned() {
            if rounds == MAX_CHALLENGE_ROUNDS {
                tracing::error!(rounds, "gateway keeps requesting challenges");
                return Err(CheckoutError::ChallengeLoop { rounds });
            }
            rounds += 1;

            let completion = self.run_challenge(&challenge, window).await?;
            let resume =
                ContinuePaymentRequest::challenge_completed(completion.packed_authentication_data);
            outcome = self.gateway.continue_payment(order_id, &resume).await?;
            tracing::info!(status = %outcome.status, round = rounds, "payment resumed");
        }

        Ok(outcome)
    }

    /// Relays the PayPal approval result for an order.
    #[tracing::instrument(skip(self))]
    pub async fn resume_pay_pal(
        &self,
        order_id: &str,
        event: PayPalOrderApproveEvent,
    ) -> Result<PaymentOutcome, CheckoutError> {
        let outcome = self
            .gateway
            .continue_payment(order_id, &ContinuePaymentRequest::pay_pal(event))
            .await?;
        tracing::info!(status = %outcome.status, "PayPal result relayed");
        Ok(outcome)
    }

    async fn run_challenge(
        &self,
        challenge: &ThreeDsChallenge,
        window: Option<ChallengeWindowSize>,
    ) -> Result<ChallengeCompletion, TransactionError> {
        tracing::info!(acs_transaction_id = %challenge.acs_transaction_id, "starting challenge");
        match self.challenges.perform_challenge(challenge, window).await {
            Ok(completion) => {
                tracing::info!(
                    sdk_transaction_id = %completion.sdk_transaction_id,
                    transaction_status = %completion.transaction_status,
                    "challenge completed"
                );
                Ok(completion)
            }
            Err(failure) => {
                let err = TransactionError::from(failure);
                match &err {
                    TransactionError::Unknown(cause) => {
                        tracing::warn!(
                            error = %cause,
                            ?cause,
                            "challenge failed with an unclassified error"
                        );
                    }
                    other => {
                        tracing::info!(
                            kind = other.kind(),
                            error = %other,
                            "challenge did not complete"
                        );
                    }
                }
                Err(err)
            }
        }
    }
}
