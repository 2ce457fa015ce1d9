//! Scalar conversions for property values.

use crate::error::{ConfigError, Result};

/// Parse a boolean the way property files spell them.
///
/// Accepts `y yes t true on 1` and `n no f false off 0`, case-insensitively.
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value, "a boolean")),
    }
}

/// Parse a hexadecimal value into a `u8`. The `0x` prefix is optional.
pub fn parse_hex_u8(key: &str, value: &str) -> Result<u8> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::invalid_value(key, value, "a hexadecimal integer"));
    }
    let wide = u64::from_str_radix(digits, 16)
        .map_err(|_| ConfigError::invalid_value(key, value, "a hexadecimal integer"))?;
    u8::try_from(wide)
        .map_err(|_| ConfigError::invalid_value(key, value, "a hexadecimal integer no larger than 0xFF"))
}

/// Parse a decimal `u16`.
pub fn parse_u16(key: &str, value: &str) -> Result<u16> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::invalid_value(key, value, "an unsigned 16-bit integer"));
    }
    trimmed
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid_value(key, value, "an unsigned 16-bit integer"))
}
