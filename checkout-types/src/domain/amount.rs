//! Monetary value with a currency code, and its receipt formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;
use currencies::CurrencyCode;

/// Separator between the currency symbol and the digits.
pub const NO_BREAK_SPACE: char = '\u{a0}';

/// Monetary value in minor units (cents, kopecks, etc.) with its ISO code.
///
/// The currency code only has to look like one (three ASCII letters); codes
/// missing from the symbol table still format, just without a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "AmountRepr")]
pub struct Amount {
    /// Value in minor currency units
    #[schema(example = 545400)]
    value: i64,
    /// ISO 4217 currency code
    #[schema(example = "EUR")]
    currency: String,
}

#[derive(Deserialize)]
struct AmountRepr {
    value: i64,
    currency: String,
}

impl TryFrom<AmountRepr> for Amount {
    type Error = DomainError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        Amount::new(repr.value, repr.currency)
    }
}

impl Amount {
    /// Creates a new Amount, rejecting negative values and malformed codes.
    pub fn new(value: i64, currency: impl Into<String>) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::NegativeAmount);
        }
        let currency = currency.into().trim().to_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrencyCode(currency));
        }
        Ok(Self { value, currency })
    }

    /// Returns the amount in minor currency units.
    pub fn minor_units(&self) -> i64 {
        self.value
    }

    /// Returns the upper-cased currency code as given.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns the code as a known currency, if it is in the table.
    pub fn currency_code(&self) -> Option<CurrencyCode> {
        self.currency.parse().ok()
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.value, &self.currency))
    }
}

/// Formats minor units as `"<symbol>\u{a0}<grouped>.<cents>"`.
///
/// Separators are fixed (`,` for thousands, `.` for decimals) so the output
/// never depends on the device locale. Unknown currencies get an empty symbol.
pub fn format_amount(minor_units: i64, currency: &str) -> String {
    let symbol = currencies::symbol_for(currency).unwrap_or("");
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    let major = group_thousands(abs / 100);
    let minor = abs % 100;
    format!("{sign}{symbol}{NO_BREAK_SPACE}{major}.{minor:02}")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
