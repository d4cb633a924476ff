//! Card entry and the client-side checks run against it.
//!
//! Everything here is a pure function of its input, cheap enough to call on
//! every keystroke. Nothing is validated at construction: a `CardInfo` holds
//! whatever the user typed, and validity is asked for explicitly.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Shortest primary account number accepted (some Maestro cards).
pub const MIN_PAN_LENGTH: usize = 12;
/// Longest primary account number allowed by ISO/IEC 7812.
pub const MAX_PAN_LENGTH: usize = 19;
/// Expiry dates further out than this are treated as typos.
pub const MAX_EXPIRY_YEARS_AHEAD: i32 = 20;

/// Removes the spaces the card input inserts between digit groups.
pub fn normalize_pan(input: &str) -> String {
    input.chars().filter(|c| *c != ' ').collect()
}

/// Runs the Luhn (mod 10) checksum over a string of ASCII digits.
///
/// Returns false for empty input or any non-digit character.
pub fn luhn_checksum_valid(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for (i, byte) in digits.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return false;
        }
        let mut digit = u32::from(byte - b'0');
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Checks a card number: digits only (spaces allowed between groups),
/// length within bounds, and a passing Luhn checksum.
pub fn is_valid_card_number(pan: &str) -> bool {
    let digits = normalize_pan(pan);
    (MIN_PAN_LENGTH..=MAX_PAN_LENGTH).contains(&digits.len()) && luhn_checksum_valid(&digits)
}

/// Checks a card security code: exactly 3 or 4 ASCII digits.
pub fn is_valid_cvv(cvv: &str) -> bool {
    matches!(cvv.len(), 3 | 4) && cvv.bytes().all(|b| b.is_ascii_digit())
}

/// Checks an expiry month/year against `today`.
///
/// Two-digit years are read as 20YY. A card stays valid through the last day
/// of its expiry month.
pub fn is_valid_expiry(month: u8, year: u16, today: NaiveDate) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    let year = i32::from(if year < 100 { year + 2000 } else { year });
    let current = (today.year(), today.month());
    (year, u32::from(month)) >= current && year <= today.year() + MAX_EXPIRY_YEARS_AHEAD
}

/// Masks a card number for display: first six and last four digits stay.
///
/// Input that is not all ASCII digits is masked entirely.
pub fn mask_pan(pan: &str) -> String {
    let digits = normalize_pan(pan);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return "*".repeat(digits.chars().count());
    }
    let len = digits.len();
    if len >= 10 {
        format!("{}{}{}", &digits[..6], "*".repeat(len - 10), &digits[len - 4..])
    } else {
        let visible = len.min(4);
        format!("{}{}", "*".repeat(len - visible), &digits[len - visible..])
    }
}

/// Payment scheme, detected from the issuer identification number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Maestro,
    Mir,
    AmericanExpress,
    UnionPay,
    Jcb,
    Discover,
    #[serde(other)]
    Unknown,
}

impl CardBrand {
    /// Detects the brand from the leading digits of a (possibly partial) PAN.
    pub fn detect(pan: &str) -> Self {
        let digits = normalize_pan(pan);
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return CardBrand::Unknown;
        }
        let prefix = |n: usize| -> Option<u32> { digits.get(..n).and_then(|p| p.parse().ok()) };

        match (prefix(1), prefix(2), prefix(3), prefix(4)) {
            (_, _, _, Some(2200..=2204)) => CardBrand::Mir,
            (_, _, _, Some(2221..=2720)) | (_, Some(51..=55), _, _) => CardBrand::Mastercard,
            (_, Some(34 | 37), _, _) => CardBrand::AmericanExpress,
            (_, _, _, Some(3528..=3589)) => CardBrand::Jcb,
            (_, _, _, Some(6011)) | (_, _, Some(644..=649), _) | (_, Some(65), _, _) => {
                CardBrand::Discover
            }
            (_, Some(62), _, _) => CardBrand::UnionPay,
            (_, Some(50 | 56..=58 | 67), _, _) | (_, _, Some(639), _) => CardBrand::Maestro,
            (Some(4), _, _, _) => CardBrand::Visa,
            _ => CardBrand::Unknown,
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Maestro => "Maestro",
            CardBrand::Mir => "Mir",
            CardBrand::AmericanExpress => "American Express",
            CardBrand::UnionPay => "UnionPay",
            CardBrand::Jcb => "JCB",
            CardBrand::Discover => "Discover",
            CardBrand::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Raw card details as entered by the payer.
#[derive(Clone, PartialEq, Eq)]
pub struct CardInfo {
    pub pan: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub cvv: String,
    pub cardholder: Option<String>,
}

impl CardInfo {
    pub fn new(
        pan: impl Into<String>,
        expiry_month: u8,
        expiry_year: u16,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            pan: pan.into(),
            expiry_month,
            expiry_year,
            cvv: cvv.into(),
            cardholder: None,
        }
    }

    pub fn with_cardholder(mut self, name: impl Into<String>) -> Self {
        self.cardholder = Some(name.into());
        self
    }

    pub fn is_number_valid(&self) -> bool {
        is_valid_card_number(&self.pan)
    }

    pub fn is_cvv_valid(&self) -> bool {
        is_valid_cvv(&self.cvv)
    }

    pub fn is_expiry_valid_at(&self, today: NaiveDate) -> bool {
        is_valid_expiry(self.expiry_month, self.expiry_year, today)
    }

    pub fn brand(&self) -> CardBrand {
        CardBrand::detect(&self.pan)
    }

    pub fn masked_pan(&self) -> String {
        mask_pan(&self.pan)
    }
}

// PAN and CVV must never reach logs.
impl fmt::Debug for CardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInfo")
            .field("pan", &self.masked_pan())
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .field("cardholder", &self.cardholder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 15).unwrap()
    }

    /// Appends the digit that makes `body` pass the Luhn check.
    fn with_check_digit(body: &str) -> String {
        (0..=9)
            .map(|d| format!("{body}{d}"))
            .find(|candidate| luhn_checksum_valid(candidate))
            .unwrap()
    }

    #[test]
    fn test_known_test_cards() {
        assert!(is_valid_card_number("4242424242424242"));
        assert!(is_valid_card_number("5555555555554444"));
        assert!(is_valid_card_number("2200 0000 0000 0004"));
        assert!(is_valid_card_number("378282246310005"));
    }

    #[test]
    fn test_invalid_card_numbers() {
        assert!(!is_valid_card_number(""));
        assert!(!is_valid_card_number("4242424242424241"));
        assert!(!is_valid_card_number("4242-4242-4242-4242"));
        assert!(!is_valid_card_number("42424242424a4242"));
        // passes Luhn, too short
        assert!(!is_valid_card_number("0"));
        assert!(!is_valid_card_number("00000000000"));
        // passes Luhn, too long
        assert!(!is_valid_card_number("00000000000000000000"));
    }

    #[test]
    fn test_cvv() {
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("0000"));
        assert!(!is_valid_cvv(""));
        assert!(!is_valid_cvv("12"));
        assert!(!is_valid_cvv("12345"));
        assert!(!is_valid_cvv("12a"));
        assert!(!is_valid_cvv(" 123"));
        assert!(!is_valid_cvv("١٢٣"));
    }

    #[test]
    fn test_expiry() {
        let today = date(2026, 10);
        assert!(is_valid_expiry(10, 26, today));
        assert!(is_valid_expiry(11, 2026, today));
        assert!(is_valid_expiry(1, 27, today));
        assert!(!is_valid_expiry(9, 26, today));
        assert!(!is_valid_expiry(12, 25, today));
        assert!(!is_valid_expiry(0, 27, today));
        assert!(!is_valid_expiry(13, 27, today));
        assert!(!is_valid_expiry(1, 2099, today));
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardBrand::detect("4242 4242"), CardBrand::Visa);
        assert_eq!(CardBrand::detect("5555555555554444"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("2221000000000009"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("2200000000000004"), CardBrand::Mir);
        assert_eq!(CardBrand::detect("378282246310005"), CardBrand::AmericanExpress);
        assert_eq!(CardBrand::detect("3530111333300000"), CardBrand::Jcb);
        assert_eq!(CardBrand::detect("6011111111111117"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("6200000000000005"), CardBrand::UnionPay);
        assert_eq!(CardBrand::detect("6759649826438453"), CardBrand::Maestro);
        assert_eq!(CardBrand::detect(""), CardBrand::Unknown);
        assert_eq!(CardBrand::detect("9"), CardBrand::Unknown);
    }

    #[test]
    fn test_mask_pan() {
        assert_eq!(mask_pan("4242 4242 4242 4242"), "424242******4242");
        assert_eq!(mask_pan("378282246310005"), "378282*****0005");
        assert_eq!(mask_pan("123456"), "**3456");
        assert_eq!(mask_pan("12"), "12");
    }

    #[test]
    fn test_mask_pan_non_digit_input() {
        assert_eq!(mask_pan("a€€€€"), "*****");
        assert_eq!(mask_pan("4242-4242-4242-4242"), "*******************");
        assert_eq!(mask_pan("４２４２４２４２４２４２"), "************");
    }

    #[test]
    fn test_debug_of_unvalidated_card() {
        let card = CardInfo::new("a€€€€", 12, 30, "123");
        let debug = format!("{card:?}");
        assert!(debug.contains("\"*****\""));
        assert!(!debug.contains('€'));
    }

    #[test]
    fn test_card_debug_hides_secrets() {
        let card = CardInfo::new("4242424242424242", 12, 30, "987").with_cardholder("JANE DOE");
        let debug = format!("{card:?}");
        assert!(!debug.contains("4242424242424242"));
        assert!(!debug.contains("987"));
        assert!(debug.contains("424242******4242"));
    }

    #[test]
    fn test_card_info_queries() {
        let card = CardInfo::new("4242424242424242", 12, 30, "12");
        assert!(card.is_number_valid());
        assert!(!card.is_cvv_valid());
        assert!(card.is_expiry_valid_at(date(2026, 10)));
        assert_eq!(card.brand(), CardBrand::Visa);
    }

    proptest! {
        #[test]
        fn luhn_generated_numbers_are_valid(body in "[0-9]{11,18}") {
            let pan = with_check_digit(&body);
            prop_assert!(is_valid_card_number(&pan));
        }

        #[test]
        fn luhn_single_digit_change_is_rejected(
            body in "[0-9]{11,18}",
            position in any::<prop::sample::Index>(),
            delta in 1u8..=9,
        ) {
            let pan = with_check_digit(&body);
            let mut bytes = pan.into_bytes();
            let i = position.index(bytes.len());
            bytes[i] = b'0' + (bytes[i] - b'0' + delta) % 10;
            let flipped = String::from_utf8(bytes).unwrap();
            prop_assert!(!is_valid_card_number(&flipped));
        }

        #[test]
        fn cvv_accepts_only_three_or_four_digits(cvv in "\\PC{0,6}") {
            let expected = matches!(cvv.len(), 3 | 4) && cvv.bytes().all(|b| b.is_ascii_digit());
            prop_assert_eq!(is_valid_cvv(&cvv), expected);
        }

        #[test]
        fn cvv_digit_strings(cvv in "[0-9]{0,6}") {
            prop_assert_eq!(is_valid_cvv(&cvv), cvv.len() == 3 || cvv.len() == 4);
        }
    }
}
