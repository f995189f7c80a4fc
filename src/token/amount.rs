//! Exact decimal amount arithmetic.
//!
//! Every conversion between decimal strings and smallest-unit integers is
//! done by string manipulation over `U256`. Floating point is never used:
//! fractional digits are padded or truncated to the declared decimal count,
//! so amounts survive round-trips bit-exactly.

use std::cmp::Ordering;

use alloy::primitives::U256;
use thiserror::Error;

/// Amount conversion failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// Input is not a plain non-negative decimal number.
    #[error("invalid decimal amount: {0:?}")]
    Invalid(String),
    /// Converted value does not fit in 256 bits.
    #[error("amount exceeds 256-bit range")]
    Overflow,
}

/// Splits a decimal string into validated integer and fractional digit runs.
fn digit_parts(value: &str) -> Result<(&str, &str), AmountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Invalid(value.to_string()));
    }
    let (integer, fraction) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return Err(AmountError::Invalid(value.to_string()));
    }
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_only(integer) || !digits_only(fraction) {
        return Err(AmountError::Invalid(value.to_string()));
    }
    Ok((integer, fraction))
}

/// Converts a decimal string to the integer smallest-unit representation.
///
/// The fractional part is padded with zeros or truncated to exactly
/// `decimals` digits before conversion. Negative, empty, and non-numeric
/// inputs are rejected.
pub fn to_smallest_unit(value: &str, decimals: u8) -> Result<U256, AmountError> {
    let (integer, fraction) = digit_parts(value)?;
    let want = decimals as usize;

    let mut digits = String::with_capacity(integer.len() + want + 1);
    digits.push_str(if integer.is_empty() { "0" } else { integer });
    if fraction.len() >= want {
        digits.push_str(&fraction[..want]);
    } else {
        digits.push_str(fraction);
        for _ in fraction.len()..want {
            digits.push('0');
        }
    }

    U256::from_str_radix(&digits, 10).map_err(|_| AmountError::Overflow)
}

/// Formats a smallest-unit integer as a decimal string at full precision,
/// trimming trailing fractional zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let want = decimals as usize;
    if want == 0 {
        return raw;
    }
    let padded = if raw.len() <= want {
        let mut s = "0".repeat(want - raw.len() + 1);
        s.push_str(&raw);
        s
    } else {
        raw
    };
    let (integer, fraction) = padded.split_at(padded.len() - want);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

/// Formats a smallest-unit integer with a fixed number of fractional digits.
pub fn format_fixed(value: U256, decimals: u8, places: usize) -> String {
    let full = format_units(value, decimals);
    let (integer, fraction) = match full.split_once('.') {
        Some((i, f)) => (i, f),
        None => (full.as_str(), ""),
    };
    if places == 0 {
        return integer.to_string();
    }
    let mut out = String::with_capacity(integer.len() + places + 1);
    out.push_str(integer);
    out.push('.');
    if fraction.len() >= places {
        out.push_str(&fraction[..places]);
    } else {
        out.push_str(fraction);
        for _ in fraction.len()..places {
            out.push('0');
        }
    }
    out
}

/// Numeric ordering of two non-negative decimal strings. Values that fail
/// to parse compare as zero.
pub fn cmp_decimal(a: &str, b: &str) -> Ordering {
    let a = digit_parts(a).unwrap_or(("0", ""));
    let b = digit_parts(b).unwrap_or(("0", ""));
    let a_int = a.0.trim_start_matches('0');
    let b_int = b.0.trim_start_matches('0');

    match a_int.len().cmp(&b_int.len()).then_with(|| a_int.cmp(b_int)) {
        Ordering::Equal => {}
        other => return other,
    }

    // Integer parts equal: compare fractions digit by digit, the shorter
    // one extended with zeros.
    let len = a.1.len().max(b.1.len());
    for i in 0..len {
        let da = a.1.as_bytes().get(i).copied().unwrap_or(b'0');
        let db = b.1.as_bytes().get(i).copied().unwrap_or(b'0');
        match da.cmp(&db) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// True when the decimal string is numerically zero (or unparseable).
pub fn is_zero(value: &str) -> bool {
    cmp_decimal(value, "0") == Ordering::Equal
}
