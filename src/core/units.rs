//! Conversion between human decimal amounts ("0.03") and base units.

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};

use crate::core::errors::WalletError;

/// Largest decimals a `U256` amount can carry (10^77 < 2^256 < 10^78).
pub const MAX_DECIMALS: u8 = 77;

fn check_decimals(decimals: u8) -> Result<(), WalletError> {
    if decimals > MAX_DECIMALS {
        return Err(WalletError::InvalidAmount(format!(
            "{} decimals exceeds the maximum of {}",
            decimals, MAX_DECIMALS
        )));
    }
    Ok(())
}

/// Parses a non-negative decimal string into base units.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256, WalletError> {
    check_decimals(decimals)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(WalletError::InvalidAmount("amount is empty".into()));
    }
    if text.starts_with('-') {
        return Err(WalletError::InvalidAmount(format!("negative amount: {}", text)));
    }

    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(WalletError::InvalidAmount(format!("malformed amount: {}", text)));
    }

    // parse_units truncates extra places, reject them instead
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > decimals as usize {
        return Err(WalletError::InvalidAmount(format!(
            "{} has more than {} decimal places",
            text, decimals
        )));
    }

    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    if int_part.len() + decimals as usize > MAX_DECIMALS as usize {
        return Err(WalletError::InvalidAmount(format!("amount out of range: {}", text)));
    }

    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    };
    let parsed = parse_units(&normalized, decimals as u32)
        .map_err(|e| WalletError::InvalidAmount(format!("{}: {}", text, e)))?;
    Ok(parsed.into())
}

/// Parses an optional amount where the empty string means zero.
pub fn parse_amount_or_zero(text: &str, decimals: u8) -> Result<U256, WalletError> {
    if text.trim().is_empty() {
        Ok(U256::zero())
    } else {
        parse_amount(text, decimals)
    }
}

/// Formats base units as a decimal string with trailing zeros trimmed.
pub fn format_amount(value: U256, decimals: u8) -> Result<String, WalletError> {
    check_decimals(decimals)?;
    let formatted = format_units(value, decimals as u32)
        .map_err(|e| WalletError::InvalidAmount(format!("{}: {}", value, e)))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    Ok(formatted.trim_end_matches('0').trim_end_matches('.').to_string())
}
