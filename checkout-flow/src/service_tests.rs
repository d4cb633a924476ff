//! CheckoutService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use checkout_types::{
        Amount, AvailablePaymentMethods, CardInfo, ChallengeCompletion, ChallengeFailure,
        ChallengeHandler, ChallengeWindowSize, CheckoutError, ContinuePaymentRequest,
        DeviceDataRequest, ExecutePaymentRequest, GatewayError, OrderStatus,
        PayPalOrderApproveEvent, PaymentGateway, PaymentMethodRequest, PaymentOrder,
        PaymentOutcome, PaymentRequirements, PaymentSelection, ProtocolErrorEvent,
        RuntimeErrorEvent, ScreenMetrics, ThreeDsChallenge, TransactionError, ValidationError,
        VendorErrorMessage,
    };

    use crate::{CheckoutService, MAX_CHALLENGE_ROUNDS, PaymentAttempt};

    /// Scripted in-memory gateway for testing the service layer.
    pub struct MockGateway {
        order: Option<PaymentOrder>,
        outcomes: Mutex<VecDeque<Result<PaymentOutcome, GatewayError>>>,
        executed: Mutex<Vec<ExecutePaymentRequest>>,
        continued: Mutex<Vec<ContinuePaymentRequest>>,
    }

    impl MockGateway {
        pub fn new(outcomes: Vec<Result<PaymentOutcome, GatewayError>>) -> Self {
            Self {
                order: None,
                outcomes: Mutex::new(outcomes.into()),
                executed: Mutex::new(Vec::new()),
                continued: Mutex::new(Vec::new()),
            }
        }

        pub fn with_order(mut self, order: PaymentOrder) -> Self {
            self.order = Some(order);
            self
        }

        fn next_outcome(&self) -> Result<PaymentOutcome, GatewayError> {
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Transport("no scripted outcome".into())))
        }

        pub fn executed(&self) -> Vec<ExecutePaymentRequest> {
            self.executed.lock().unwrap().clone()
        }

        pub fn continued(&self) -> Vec<ContinuePaymentRequest> {
            self.continued.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn get_order(&self, order_id: &str) -> Result<PaymentOrder, GatewayError> {
            self.order
                .clone()
                .filter(|order| order.id == order_id)
                .ok_or_else(|| GatewayError::Api {
                    status: 404,
                    message: "order not found".into(),
                })
        }

        async fn execute_payment(
            &self,
            _order_id: &str,
            req: &ExecutePaymentRequest,
        ) -> Result<PaymentOutcome, GatewayError> {
            self.executed.lock().unwrap().push(req.clone());
            self.next_outcome()
        }

        async fn continue_payment(
            &self,
            _order_id: &str,
            req: &ContinuePaymentRequest,
        ) -> Result<PaymentOutcome, GatewayError> {
            self.continued.lock().unwrap().push(req.clone());
            self.next_outcome()
        }
    }

    type ChallengeReply = Result<ChallengeCompletion, ChallengeFailure>;
    type ChallengeScript = Box<dyn Fn() -> ChallengeReply + Send + Sync>;

    /// Challenge adapter that replays a scripted result.
    pub struct MockChallenge {
        script: ChallengeScript,
        windows: Arc<Mutex<Vec<Option<ChallengeWindowSize>>>>,
    }

    impl MockChallenge {
        pub fn new(script: impl Fn() -> ChallengeReply + Send + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                windows: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn completing() -> Self {
            Self::new(|| {
                Ok(ChallengeCompletion {
                    sdk_transaction_id: "sdk-tx-1".into(),
                    transaction_status: "Y".into(),
                    packed_authentication_data: "packed-123".into(),
                })
            })
        }
    }

    #[async_trait]
    impl ChallengeHandler for MockChallenge {
        async fn perform_challenge(
            &self,
            _challenge: &ThreeDsChallenge,
            window: Option<ChallengeWindowSize>,
        ) -> Result<ChallengeCompletion, ChallengeFailure> {
            self.windows.lock().unwrap().push(window);
            (self.script)()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("secure enclave unavailable")]
    struct EnclaveUnavailable;

    // ─────────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────────

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn service(
        gateway: MockGateway,
        challenge: MockChallenge,
    ) -> CheckoutService<MockGateway, MockChallenge> {
        CheckoutService::new(gateway, challenge).with_today(today())
    }

    fn device() -> DeviceDataRequest {
        DeviceDataRequest::new(
            "Mozilla/5.0",
            "en-US",
            ScreenMetrics {
                width: 390,
                height: 844,
                color_depth: 24,
            },
        )
        .with_session_id("session-1")
    }

    fn new_card_attempt(card: CardInfo) -> PaymentAttempt {
        PaymentAttempt::new(
            PaymentSelection::NewCard {
                card,
                save_as: None,
            },
            device(),
        )
    }

    fn good_card() -> CardInfo {
        CardInfo::new("4242 4242 4242 4242", 12, 30, "123")
    }

    fn outcome(status: OrderStatus) -> PaymentOutcome {
        PaymentOutcome {
            order_id: "order-1".into(),
            status,
            requirements: None,
            decline_reason: None,
        }
    }

    fn challenge_outcome() -> PaymentOutcome {
        PaymentOutcome {
            requirements: Some(PaymentRequirements {
                three_ds_challenge: Some(ThreeDsChallenge {
                    three_ds_server_transaction_id: "srv-1".into(),
                    acs_transaction_id: "acs-1".into(),
                    acs_ref_number: "ref-1".into(),
                    acs_signed_content: "jws".into(),
                    message_version: Some("2.2.0".into()),
                }),
                redirect_url: None,
            }),
            ..outcome(OrderStatus::Processing)
        }
    }

    fn order() -> PaymentOrder {
        PaymentOrder {
            id: "order-1".into(),
            status: OrderStatus::Created,
            amount: Amount::new(545400, "EUR").unwrap(),
            description: Some("Two tickets".into()),
            available_payment_methods: AvailablePaymentMethods {
                payment_card: true,
                ..Default::default()
            },
            bindings: Vec::new(),
        }
    }

    async fn pay_through_failing_challenge(
        failure: impl Fn() -> ChallengeFailure + Send + Sync + 'static,
    ) -> (CheckoutError, usize) {
        let svc = service(
            MockGateway::new(vec![Ok(challenge_outcome())]),
            MockChallenge::new(move || Err(failure())),
        );
        let err = svc
            .pay("order-1", new_card_attempt(good_card()))
            .await
            .unwrap_err();
        (err, svc.gateway().continued().len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_invalid_card_number_never_reaches_gateway() {
        let svc = service(MockGateway::new(vec![]), MockChallenge::completing());
        let card = CardInfo::new("4242 4242 4242 4241", 12, 30, "123");

        let result = svc.pay("order-1", new_card_attempt(card)).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidCardNumber))
        ));
        assert!(svc.gateway().executed().is_empty());
    }

    #[tokio::test]
    async fn test_expired_card_rejected() {
        let svc = service(MockGateway::new(vec![]), MockChallenge::completing());
        let card = CardInfo::new("4242424242424242", 9, 26, "123");

        let result = svc.pay("order-1", new_card_attempt(card)).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidExpiry {
                month: 9,
                year: 26
            }))
        ));
    }

    #[tokio::test]
    async fn test_bad_cvv_rejected() {
        let svc = service(MockGateway::new(vec![]), MockChallenge::completing());
        let card = CardInfo::new("4242424242424242", 12, 30, "12a");

        let result = svc.pay("order-1", new_card_attempt(card)).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidCvv))
        ));
    }

    #[tokio::test]
    async fn test_saved_card_checks() {
        let svc = service(MockGateway::new(vec![]), MockChallenge::completing());

        let empty_binding = PaymentAttempt::new(
            PaymentSelection::SavedCard {
                binding_id: " ".into(),
                cvv: None,
            },
            device(),
        );
        assert!(matches!(
            svc.pay("order-1", empty_binding).await,
            Err(CheckoutError::Validation(ValidationError::MissingBindingId))
        ));

        let bad_cvv = PaymentAttempt::new(
            PaymentSelection::SavedCard {
                binding_id: "b-1".into(),
                cvv: Some("1".into()),
            },
            device(),
        );
        assert!(matches!(
            svc.pay("order-1", bad_cvv).await,
            Err(CheckoutError::Validation(ValidationError::InvalidCvv))
        ));
        assert!(svc.gateway().executed().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_frictionless_payment() {
        let svc = service(
            MockGateway::new(vec![Ok(outcome(OrderStatus::Paid))]),
            MockChallenge::completing(),
        );
        let attempt = PaymentAttempt::new(
            PaymentSelection::NewCard {
                card: good_card(),
                save_as: Some("Personal".into()),
            },
            device(),
        )
        .with_return_url("https://shop.example/done");

        let result = svc.pay("order-1", attempt).await.unwrap();

        assert_eq!(result.status, OrderStatus::Paid);
        let executed = svc.gateway().executed();
        assert_eq!(executed.len(), 1);
        let request = &executed[0];
        assert!(matches!(
            &request.payment_method,
            PaymentMethodRequest::PaymentCard(card) if card.pan == "4242424242424242"
        ));
        assert_eq!(request.binding_creation_is_needed, Some(true));
        assert_eq!(request.binding_name.as_deref(), Some("Personal"));
        assert_eq!(request.return_url.as_deref(), Some("https://shop.example/done"));
        assert_eq!(
            request.device_data.as_ref().map(|d| d.session_id.as_str()),
            Some("session-1")
        );
        assert!(svc.gateway().continued().is_empty());
    }

    #[tokio::test]
    async fn test_saved_card_payment() {
        let svc = service(
            MockGateway::new(vec![Ok(outcome(OrderStatus::Paid))]),
            MockChallenge::completing(),
        );
        let attempt = PaymentAttempt::new(
            PaymentSelection::SavedCard {
                binding_id: "b-1".into(),
                cvv: Some("321".into()),
            },
            device(),
        );

        svc.pay("order-1", attempt).await.unwrap();

        let executed = svc.gateway().executed();
        assert!(matches!(
            &executed[0].payment_method,
            PaymentMethodRequest::Binding(binding) if binding.binding_id == "b-1"
        ));
    }

    #[tokio::test]
    async fn test_redirect_is_returned_untouched() {
        let redirect = PaymentOutcome {
            requirements: Some(PaymentRequirements {
                three_ds_challenge: None,
                redirect_url: Some("https://bank.example/auth".into()),
            }),
            ..outcome(OrderStatus::Processing)
        };
        let svc = service(MockGateway::new(vec![Ok(redirect)]), MockChallenge::completing());

        let result = svc
            .pay("order-1", new_card_attempt(good_card()))
            .await
            .unwrap();

        assert_eq!(result.redirect_url(), Some("https://bank.example/auth"));
        assert!(svc.gateway().continued().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let svc = service(
            MockGateway::new(vec![Err(GatewayError::Api {
                status: 409,
                message: "order already paid".into(),
            })]),
            MockChallenge::completing(),
        );

        let result = svc.pay("order-1", new_card_attempt(good_card())).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Gateway(GatewayError::Api { status: 409, .. }))
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 3-D Secure
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_challenge_completion_resumes_payment() {
        let challenge = MockChallenge::completing();
        let windows = Arc::clone(&challenge.windows);
        let svc = service(
            MockGateway::new(vec![Ok(challenge_outcome()), Ok(outcome(OrderStatus::Paid))]),
            challenge,
        );
        let attempt = new_card_attempt(good_card())
            .with_challenge_window_size(ChallengeWindowSize::FullScreen);

        let result = svc.pay("order-1", attempt).await.unwrap();

        assert_eq!(result.status, OrderStatus::Paid);
        assert_eq!(
            svc.gateway().continued(),
            vec![ContinuePaymentRequest::challenge_completed("packed-123")]
        );
        assert_eq!(
            *windows.lock().unwrap(),
            vec![Some(ChallengeWindowSize::FullScreen)]
        );
        assert_eq!(
            svc.gateway().executed()[0].challenge_window_size,
            Some(ChallengeWindowSize::FullScreen)
        );
    }

    #[tokio::test]
    async fn test_challenge_timeout() {
        let (err, continued) = pay_through_failing_challenge(|| ChallengeFailure::Timeout).await;
        assert!(matches!(err, CheckoutError::Transaction(TransactionError::Timeout)));
        assert_eq!(continued, 0);
    }

    #[tokio::test]
    async fn test_challenge_cancelled() {
        let (err, continued) = pay_through_failing_challenge(|| ChallengeFailure::Cancelled).await;
        assert!(matches!(err, CheckoutError::Transaction(TransactionError::Cancelled)));
        assert_eq!(continued, 0);
    }

    #[tokio::test]
    async fn test_challenge_protocol_error() {
        let (err, _) = pay_through_failing_challenge(|| {
            ChallengeFailure::Protocol(ProtocolErrorEvent {
                sdk_transaction_id: "sdk-tx-1".into(),
                error_message: VendorErrorMessage {
                    transaction_id: "3ds-tx-1".into(),
                    error_code: "305".into(),
                    error_description: "Transaction data not valid".into(),
                    ..Default::default()
                },
            })
        })
        .await;

        match err {
            CheckoutError::Transaction(TransactionError::ProtocolError(detail)) => {
                assert_eq!(detail.error_code, "305");
                assert_eq!(detail.transaction_id, "3ds-tx-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_challenge_runtime_error() {
        let (err, _) = pay_through_failing_challenge(|| {
            ChallengeFailure::Runtime(RuntimeErrorEvent {
                error_code: None,
                error_message: "ACS timed out".into(),
            })
        })
        .await;

        assert!(matches!(
            err,
            CheckoutError::Transaction(TransactionError::RuntimeError(ref detail))
                if detail.message == "ACS timed out"
        ));
    }

    #[tokio::test]
    async fn test_challenge_unclassified_failure_keeps_cause() {
        let (err, _) =
            pay_through_failing_challenge(|| ChallengeFailure::Other(Box::new(EnclaveUnavailable)))
                .await;

        let CheckoutError::Transaction(transaction) = err else {
            panic!("expected a transaction error");
        };
        assert_eq!(transaction.kind(), "unknown");
        assert!(transaction.unknown_cause().unwrap().is::<EnclaveUnavailable>());
    }

    #[tokio::test]
    async fn test_endless_challenges_are_cut_off() {
        let outcomes = (0..=MAX_CHALLENGE_ROUNDS)
            .map(|_| Ok(challenge_outcome()))
            .collect();
        let svc = service(MockGateway::new(outcomes), MockChallenge::completing());

        let result = svc.pay("order-1", new_card_attempt(good_card())).await;

        assert!(matches!(
            result,
            Err(CheckoutError::ChallengeLoop { rounds }) if rounds == MAX_CHALLENGE_ROUNDS
        ));
        assert_eq!(svc.gateway().continued().len(), MAX_CHALLENGE_ROUNDS);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Orders & PayPal
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_load_order() {
        let svc = service(
            MockGateway::new(vec![]).with_order(order()),
            MockChallenge::completing(),
        );

        let loaded = svc.load_order("order-1").await.unwrap();
        assert_eq!(loaded.amount.to_string(), "€\u{a0}5,454.00");

        let missing = svc.load_order("order-2").await;
        assert!(matches!(
            missing,
            Err(CheckoutError::Gateway(GatewayError::Api { status: 404, .. }))
        ));
    }

    #[tokio::test]
    async fn test_resume_pay_pal() {
        let svc = service(
            MockGateway::new(vec![Ok(outcome(OrderStatus::Cancelled))]),
            MockChallenge::completing(),
        );

        let result = svc
            .resume_pay_pal("order-1", PayPalOrderApproveEvent::Cancel)
            .await
            .unwrap();

        assert_eq!(result.status, OrderStatus::Cancelled);
        assert_eq!(
            svc.gateway().continued(),
            vec![ContinuePaymentRequest::pay_pal(PayPalOrderApproveEvent::Cancel)]
        );
    }
}
