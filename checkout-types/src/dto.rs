//! Data Transfer Objects (DTOs) exchanged with the payment backend.
//!
//! Field names are camelCase on the wire. Optional fields are omitted when
//! absent rather than sent as `null`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::domain::{Amount, CardBrand, CardInfo, normalize_pan};

// ─────────────────────────────────────────────────────────────────────────────
// Wire enums
// ─────────────────────────────────────────────────────────────────────────────

/// Size of the 3-D Secure challenge window requested from the ACS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ChallengeWindowSize {
    #[serde(rename = "SIZE_250_X_400")]
    Size250x400,
    #[serde(rename = "SIZE_390_X_400")]
    Size390x400,
    #[serde(rename = "SIZE_500_X_600")]
    Size500x600,
    #[serde(rename = "SIZE_600_X_400")]
    Size600x400,
    #[serde(rename = "FULL_SCREEN")]
    FullScreen,
}

impl ChallengeWindowSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeWindowSize::Size250x400 => "SIZE_250_X_400",
            ChallengeWindowSize::Size390x400 => "SIZE_390_X_400",
            ChallengeWindowSize::Size500x600 => "SIZE_500_X_600",
            ChallengeWindowSize::Size600x400 => "SIZE_600_X_400",
            ChallengeWindowSize::FullScreen => "FULL_SCREEN",
        }
    }

    pub fn all() -> &'static [ChallengeWindowSize] {
        &[
            ChallengeWindowSize::Size250x400,
            ChallengeWindowSize::Size390x400,
            ChallengeWindowSize::Size500x600,
            ChallengeWindowSize::Size600x400,
            ChallengeWindowSize::FullScreen,
        ]
    }
}

impl fmt::Display for ChallengeWindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeWindowSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| format!("Unknown challenge window size: {}", s))
    }
}

/// Outcome of a PayPal order approval, relayed back to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayPalOrderApproveEvent {
    Approve,
    Cancel,
    Error,
}

impl fmt::Display for PayPalOrderApproveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayPalOrderApproveEvent::Approve => write!(f, "APPROVE"),
            PayPalOrderApproveEvent::Cancel => write!(f, "CANCEL"),
            PayPalOrderApproveEvent::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for PayPalOrderApproveEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "APPROVE" => Ok(PayPalOrderApproveEvent::Approve),
            "CANCEL" => Ok(PayPalOrderApproveEvent::Cancel),
            "ERROR" => Ok(PayPalOrderApproveEvent::Error),
            _ => Err(format!("Unknown PayPal event: {}", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment method DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A card typed in by the payer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCardRequest {
    /// Card number, digits only
    #[schema(example = "4242424242424242")]
    pub pan: String,
    #[schema(example = "123")]
    pub cvv: String,
    #[schema(example = 12)]
    pub expiry_month: u8,
    /// Four-digit year
    #[schema(example = 2030)]
    pub expiry_year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
}

impl fmt::Debug for NewCardRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCardRequest")
            .field("pan", &crate::domain::mask_pan(&self.pan))
            .field("cvv", &"***")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cardholder_name", &self.cardholder_name)
            .finish()
    }
}

impl From<CardInfo> for NewCardRequest {
    fn from(card: CardInfo) -> Self {
        let expiry_year = if card.expiry_year < 100 {
            card.expiry_year + 2000
        } else {
            card.expiry_year
        };
        Self {
            pan: normalize_pan(&card.pan),
            cvv: card.cvv,
            expiry_month: card.expiry_month,
            expiry_year,
            cardholder_name: card.cardholder,
        }
    }
}

/// A card the payer saved earlier (a "binding").
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindingRequest {
    pub binding_id: String,
    /// Some backends ask for the CVV again on saved cards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
}

impl fmt::Debug for BindingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRequest")
            .field("binding_id", &self.binding_id)
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .finish()
    }
}

/// How the payer pays: a new card or a saved binding.
///
/// Serialized with an explicit `"type"` discriminant as its first key and
/// decoded by that tag, so the two payloads can never be confused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethodRequest {
    PaymentCard(NewCardRequest),
    Binding(BindingRequest),
}

// ─────────────────────────────────────────────────────────────────────────────
// Device & payer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Screen properties reported in the device fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
    pub color_depth: u8,
}

/// Browser/device fingerprint used by the 3-D Secure risk engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDataRequest {
    #[schema(example = "application/json")]
    pub browser_accept_header: String,
    pub browser_user_agent: String,
    /// IETF BCP 47 language tag
    #[schema(example = "en-US")]
    pub browser_language: String,
    pub browser_screen_width: u32,
    pub browser_screen_height: u32,
    pub browser_color_depth: u8,
    /// Minutes to add to local time to get UTC (JavaScript `getTimezoneOffset` sign)
    pub browser_tz_offset: i32,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_java_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_javascript_enabled: Option<bool>,
    /// Packed device data produced by the 3-D Secure SDK
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_data: Option<String>,
}

impl DeviceDataRequest {
    pub const DEFAULT_ACCEPT_HEADER: &'static str = "application/json";

    /// Captures a fingerprint for this device with a fresh session id and the
    /// local timezone offset.
    pub fn new(
        user_agent: impl Into<String>,
        language: impl Into<String>,
        screen: ScreenMetrics,
    ) -> Self {
        let local_minus_utc = chrono::Local::now().offset().local_minus_utc();
        Self {
            browser_accept_header: Self::DEFAULT_ACCEPT_HEADER.to_string(),
            browser_user_agent: user_agent.into(),
            browser_language: language.into(),
            browser_screen_width: screen.width,
            browser_screen_height: screen.height,
            browser_color_depth: screen.color_depth,
            browser_tz_offset: -local_minus_utc / 60,
            session_id: uuid::Uuid::new_v4().to_string(),
            browser_java_enabled: None,
            browser_javascript_enabled: None,
            sdk_data: None,
        }
    }

    pub fn with_accept_header(mut self, accept: impl Into<String>) -> Self {
        self.browser_accept_header = accept.into();
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_tz_offset(mut self, minutes: i32) -> Self {
        self.browser_tz_offset = minutes;
        self
    }

    pub fn with_sdk_data(mut self, packed: impl Into<String>) -> Self {
        self.sdk_data = Some(packed.into());
        self
    }
}

/// Contact details of the payer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "payer@example.com")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl PayerRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Currency exchange quote accepted by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    /// Amount in minor units of the payer's currency
    pub amount: i64,
    /// Quote token issued by the backend
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Execute / continue DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// What the payer chose in the checkout sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSelection {
    /// A typed-in card. `save_as` names the binding to create, if any.
    NewCard {
        card: CardInfo,
        save_as: Option<String>,
    },
    /// A saved card.
    SavedCard {
        binding_id: String,
        cvv: Option<String>,
    },
}

/// Full checkout submission for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePaymentRequest {
    pub payment_method: PaymentMethodRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_data: Option<DeviceDataRequest>,
    /// When true, `bindingName` is expected as well
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_creation_is_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<ExchangeRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<PayerRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_window_size: Option<ChallengeWindowSize>,
    /// Where the payer lands after an external redirect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

impl ExecutePaymentRequest {
    /// Creates a request carrying only the payment method.
    pub fn new(payment_method: PaymentMethodRequest) -> Self {
        Self {
            payment_method,
            device_data: None,
            binding_creation_is_needed: None,
            binding_name: None,
            exchange: None,
            payer: None,
            challenge_window_size: None,
            return_url: None,
        }
    }

    /// Builds the request from the payer's selection. Performs no validation.
    pub fn assemble(
        selection: PaymentSelection,
        device_data: DeviceDataRequest,
        payer: Option<PayerRequest>,
        challenge_window_size: Option<ChallengeWindowSize>,
    ) -> Self {
        let request = match selection {
            PaymentSelection::NewCard { card, save_as } => {
                let request = Self::new(PaymentMethodRequest::PaymentCard(card.into()));
                match save_as {
                    Some(name) => request.with_binding(name),
                    None => request,
                }
            }
            PaymentSelection::SavedCard { binding_id, cvv } => {
                Self::new(PaymentMethodRequest::Binding(BindingRequest { binding_id, cvv }))
            }
        };

        Self {
            device_data: Some(device_data),
            payer: payer.filter(|p| !p.is_empty()),
            challenge_window_size,
            ..request
        }
    }

    pub fn with_device_data(mut self, device_data: DeviceDataRequest) -> Self {
        self.device_data = Some(device_data);
        self
    }

    /// Asks the backend to save the card under `name`.
    pub fn with_binding(mut self, name: impl Into<String>) -> Self {
        self.binding_creation_is_needed = Some(true);
        self.binding_name = Some(name.into());
        self
    }

    pub fn with_exchange(mut self, exchange: ExchangeRequest) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn with_payer(mut self, payer: PayerRequest) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_challenge_window_size(mut self, size: ChallengeWindowSize) -> Self {
        self.challenge_window_size = Some(size);
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// True when binding creation is requested without a binding name.
    pub fn binding_name_missing(&self) -> bool {
        self.binding_creation_is_needed == Some(true)
            && self.binding_name.as_deref().is_none_or(|n| n.trim().is_empty())
    }
}

/// Resumes an order after an interactive step.
///
/// Exactly one payload is set; use the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContinuePaymentRequest {
    /// Opaque result of a completed 3-D Secure challenge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packed_authentication_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_pal_order_approve_event: Option<PayPalOrderApproveEvent>,
}

impl ContinuePaymentRequest {
    pub fn challenge_completed(packed_authentication_data: impl Into<String>) -> Self {
        Self {
            packed_authentication_data: Some(packed_authentication_data.into()),
            pay_pal_order_approve_event: None,
        }
    }

    pub fn pay_pal(event: PayPalOrderApproveEvent) -> Self {
        Self {
            packed_authentication_data: None,
            pay_pal_order_approve_event: Some(event),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Order & outcome DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Status of an order on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Processing,
    Paid,
    Declined,
    Expired,
    Refunded,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// True once the order can no longer change through the checkout.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid
                | OrderStatus::Declined
                | OrderStatus::Expired
                | OrderStatus::Refunded
                | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "CREATED"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Declined => write!(f, "DECLINED"),
            OrderStatus::Expired => write!(f, "EXPIRED"),
            OrderStatus::Refunded => write!(f, "REFUNDED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Which payment methods the checkout may offer for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailablePaymentMethods {
    pub payment_card: bool,
    pub apple_pay: bool,
    pub pay_pal: bool,
    #[serde(rename = "-myguavaOpenbanking-")]
    pub myguava_openbanking: bool,
}

/// A card saved for the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedBinding {
    pub id: String,
    #[schema(example = "424242******4242")]
    pub masked_pan: String,
    /// `MM/YY`
    #[schema(example = "12/30")]
    pub expiry_date: String,
    pub brand: CardBrand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub id: String,
    pub status: OrderStatus,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub available_payment_methods: AvailablePaymentMethods,
    #[serde(default)]
    pub bindings: Vec<SavedBinding>,
}

/// Parameters the 3-D Secure SDK needs to start a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDsChallenge {
    pub three_ds_server_transaction_id: String,
    pub acs_transaction_id: String,
    pub acs_ref_number: String,
    pub acs_signed_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_version: Option<String>,
}

/// Follow-up the backend requires before the order can complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_ds_challenge: Option<ThreeDsChallenge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Backend reply to an execute or continue request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<PaymentRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

impl PaymentOutcome {
    pub fn challenge(&self) -> Option<&ThreeDsChallenge> {
        self.requirements.as_ref()?.three_ds_challenge.as_ref()
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.requirements.as_ref()?.redirect_url.as_deref()
    }
}
