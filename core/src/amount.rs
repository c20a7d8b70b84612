//! Exact conversion between human decimal strings and smallest-unit integers.
//!
//! All arithmetic is done on the decimal digits themselves; nothing passes
//! through floating point, so `"0.1"` of an 18-decimal token is exactly
//! `100_000_000_000_000_000`.

use alloy_primitives::U256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is required")]
    Empty,

    #[error("'{0}' is not a number")]
    Malformed(String),

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("too many decimal places (asset supports {0})")]
    TooPrecise(u8),

    #[error("amount is too large")]
    Overflow,
}

/// Parse a user-entered decimal amount into smallest units.
///
/// Signs are rejected outright: a negative amount is never valid for any
/// action and `+` only shows up in pasted garbage.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Malformed(s.to_string()));
    }

    let places = decimals as usize;
    let (kept, excess) = if frac.len() > places {
        frac.split_at(places)
    } else {
        (frac, "")
    };
    if excess.bytes().any(|b| b != b'0') {
        return Err(AmountError::TooPrecise(decimals));
    }

    let digits = format!("{}{:0<width$}", whole, kept, width = places);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Err(AmountError::NotPositive);
    }

    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)
}

/// Render smallest units as a decimal string, truncated to `places`
/// fractional digits.
pub fn format_units(value: U256, decimals: u8, places: usize) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    let padded = if digits.len() <= decimals {
        format!("{:0>width$}", digits, width = decimals + 1)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);

    if places == 0 {
        return whole.to_string();
    }

    let mut frac: String = frac.chars().take(places).collect();
    while frac.len() < places {
        frac.push('0');
    }
    format!("{}.{}", whole, frac)
}

/// Render smallest units with full precision and no trailing zeros.
pub fn format_exact(value: U256, decimals: u8) -> String {
    let full = format_units(value, decimals, decimals as usize);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => full,
    }
}

/// Render a scaled fraction (e.g. a WAD rate) as a percentage with two places.
pub fn format_percent(value: U256, decimals: u8) -> String {
    let hundredths = value.saturating_mul(U256::from(100u64));
    format!("{}%", format_units(hundredths, decimals, 2))
}
