//! OpenAPI description of the checkout endpoints this client talks to.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use checkout_types::domain::{Amount, CardBrand};
use checkout_types::dto::{
    AvailablePaymentMethods, BindingRequest, ChallengeWindowSize, ContinuePaymentRequest,
    DeviceDataRequest, ExchangeRequest, ExecutePaymentRequest, NewCardRequest, OrderStatus,
    PayPalOrderApproveEvent, PayerRequest, PaymentMethodRequest, PaymentOrder, PaymentOutcome,
    PaymentRequirements, SavedBinding, ThreeDsChallenge,
};
use checkout_types::CurrencyCode;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Stand-ins for the server handlers, annotated for path generation.

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Get an order for the checkout sheet
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order details", body = PaymentOrder),
        (status = 404, description = "Order not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn get_order() {}

/// Submit the checkout for an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/execute",
    tag = "payments",
    request_body = ExecutePaymentRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Payment outcome, possibly with a challenge or redirect", body = PaymentOutcome),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Order is not payable"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn execute_payment() {}

/// Resume an order after a 3-D Secure challenge or a PayPal approval
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/continue",
    tag = "payments",
    request_body = ContinuePaymentRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Payment outcome", body = PaymentOutcome),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn continue_payment() {}

/// OpenAPI documentation for the checkout API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkout API",
        version = "1.0.0",
        description = "Order checkout with card and saved-card payments, 3-D Secure challenges and PayPal approval.\n\n## Authentication\n\nCheckout endpoints take the session token issued for the order:\n\n```\nAuthorization: Bearer <session token>\n```",
        license(name = "MIT"),
    ),
    paths(health, get_order, execute_payment, continue_payment),
    components(
        schemas(
            Amount,
            CardBrand,
            CurrencyCode,
            ChallengeWindowSize,
            PayPalOrderApproveEvent,
            NewCardRequest,
            BindingRequest,
            PaymentMethodRequest,
            DeviceDataRequest,
            PayerRequest,
            ExchangeRequest,
            ExecutePaymentRequest,
            ContinuePaymentRequest,
            OrderStatus,
            AvailablePaymentMethods,
            SavedBinding,
            PaymentOrder,
            ThreeDsChallenge,
            PaymentRequirements,
            PaymentOutcome,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "orders", description = "Order lookup"),
        (name = "payments", description = "Checkout submission and continuation"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
