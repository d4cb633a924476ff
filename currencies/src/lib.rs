//! Currency Code Table with Macro-Based Generation
//!
//! Receipts render the same on every device, so the symbol for each currency
//! comes from this fixed table instead of the platform locale. Currencies are
//! declared once in the `define_currencies!` invocation below, which generates
//! the `CurrencyCode` enum along with its lookups.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     CLP => ("CLP", "CLP$", "Chilean Peso"),
//! }
//! ```
//!
//! # Example
//! ```
//! use currencies::{CurrencyCode, symbol_for};
//!
//! let eur: CurrencyCode = "eur".parse().unwrap();
//! assert_eq!(eur.symbol(), "€");
//! assert_eq!(symbol_for("XXX"), None);
//! ```

/// Error returned when a string is not one of the known currency codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the CurrencyCode enum and its lookup tables
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define currencies with auto-generated lookups.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     Ident => ("CODE", "SYMBOL", "English name"),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $title:literal)
        ),* $(,)?
    ) => {
        /// ISO 4217 currency code known to the checkout.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, utoipa::ToSchema,
        )]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $title),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = $crate::UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err($crate::UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", "US Dollar"),
    EUR => ("EUR", "€", "Euro"),
    GBP => ("GBP", "£", "Pound Sterling"),
    JPY => ("JPY", "¥", "Japanese Yen"),
    CNY => ("CNY", "¥", "Chinese Yuan"),
    INR => ("INR", "₹", "Indian Rupee"),
    RUB => ("RUB", "₽", "Russian Ruble"),
    UAH => ("UAH", "₴", "Ukrainian Hryvnia"),
    KZT => ("KZT", "₸", "Kazakhstani Tenge"),
    BYN => ("BYN", "Br", "Belarusian Ruble"),
    GEL => ("GEL", "₾", "Georgian Lari"),
    AMD => ("AMD", "֏", "Armenian Dram"),
    AZN => ("AZN", "₼", "Azerbaijani Manat"),
    MDL => ("MDL", "L", "Moldovan Leu"),
    TRY => ("TRY", "₺", "Turkish Lira"),
    ILS => ("ILS", "₪", "Israeli New Shekel"),
    KRW => ("KRW", "₩", "South Korean Won"),
    THB => ("THB", "฿", "Thai Baht"),
    VND => ("VND", "₫", "Vietnamese Dong"),
    PHP => ("PHP", "₱", "Philippine Peso"),
    NGN => ("NGN", "₦", "Nigerian Naira"),
    PLN => ("PLN", "zł", "Polish Zloty"),
    CZK => ("CZK", "Kč", "Czech Koruna"),
    HUF => ("HUF", "Ft", "Hungarian Forint"),
    RON => ("RON", "lei", "Romanian Leu"),
    BGN => ("BGN", "лв", "Bulgarian Lev"),
    SEK => ("SEK", "kr", "Swedish Krona"),
    NOK => ("NOK", "kr", "Norwegian Krone"),
    DKK => ("DKK", "kr", "Danish Krone"),
    ISK => ("ISK", "kr", "Icelandic Krona"),
    CHF => ("CHF", "CHF", "Swiss Franc"),
    CAD => ("CAD", "CA$", "Canadian Dollar"),
    AUD => ("AUD", "A$", "Australian Dollar"),
    NZD => ("NZD", "NZ$", "New Zealand Dollar"),
    HKD => ("HKD", "HK$", "Hong Kong Dollar"),
    SGD => ("SGD", "S$", "Singapore Dollar"),
    MXN => ("MXN", "MX$", "Mexican Peso"),
    BRL => ("BRL", "R$", "Brazilian Real"),
    ZAR => ("ZAR", "R", "South African Rand"),
    AED => ("AED", "د.إ", "UAE Dirham"),
    IDR => ("IDR", "Rp", "Indonesian Rupiah"),
    MYR => ("MYR", "RM", "Malaysian Ringgit"),
}

/// Looks up the display symbol for a currency code string.
///
/// Returns `None` for codes outside the table; callers decide the fallback.
pub fn symbol_for(code: &str) -> Option<&'static str> {
    code.parse::<CurrencyCode>().ok().map(|c| c.symbol())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
