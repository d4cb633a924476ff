//! Domain models for the checkout core.

pub mod amount;
pub mod card;

pub use amount::{Amount, NO_BREAK_SPACE, format_amount};
pub use card::{
    CardBrand, CardInfo, is_valid_card_number, is_valid_cvv, is_valid_expiry,
    luhn_checksum_valid, mask_pan, normalize_pan,
};
