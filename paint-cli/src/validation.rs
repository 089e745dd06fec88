//! Input validation for untrusted data.
//!
//! The core codec is lenient: it drops partial groups and skips malformed
//! ones. These checks let the CLI report such input instead of silently
//! losing pixels.

use thiserror::Error;

use paint_core::pixels::HEX_PIXEL_LEN;

/// Maximum hex payload length: every coordinate of a 256×256 canvas once.
pub const MAX_HEX_PAYLOAD_LEN: usize = 256 * 256 * HEX_PIXEL_LEN;
/// Maximum clipboard/action input size.
pub const MAX_INPUT_SIZE: usize = 16 * 1_048_576;

/// Validation error types.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Hex payload exceeds maximum length.
    #[error("hex payload too long (max {MAX_HEX_PAYLOAD_LEN} chars)")]
    PayloadTooLong,
    /// Hex payload length is not a multiple of six.
    #[error("hex payload has a trailing partial pixel ({0} chars)")]
    PartialPixel(usize),
    /// Hex payload contains a non-hex character.
    #[error("non-hex character at offset {0}")]
    InvalidHexChar(usize),
    /// Input exceeds maximum size.
    #[error("input too large (max {MAX_INPUT_SIZE} bytes)")]
    InputTooLarge,
}

/// Validate a bare hex payload (no `0x` prefix).
///
/// # Errors
///
/// Returns [`ValidationError::PayloadTooLong`] for oversized payloads,
/// [`ValidationError::InvalidHexChar`] for the first non-hex character, and
/// [`ValidationError::PartialPixel`] if the length is not a multiple of six.
pub fn validate_hex_payload(hex: &str) -> Result<(), ValidationError> {
    if hex.len() > MAX_HEX_PAYLOAD_LEN {
        return Err(ValidationError::PayloadTooLong);
    }
    if let Some(offset) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHexChar(offset));
    }
    let trailing = hex.len() % HEX_PIXEL_LEN;
    if trailing != 0 {
        return Err(ValidationError::PartialPixel(trailing));
    }
    Ok(())
}

/// Validate input size.
///
/// # Errors
///
/// Returns [`ValidationError::InputTooLarge`] if the input exceeds 16MB.
pub fn validate_input_size(size: usize) -> Result<(), ValidationError> {
    if size > MAX_INPUT_SIZE {
        return Err(ValidationError::InputTooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_payloads() {
        assert!(validate_hex_payload("").is_ok());
        assert!(validate_hex_payload("0a0B0c").is_ok());
        assert!(validate_hex_payload("000000ffffff").is_ok());
    }

    #[test]
    fn test_partial_pixel() {
        assert_eq!(
            validate_hex_payload("0102030405"),
            Err(ValidationError::PartialPixel(4))
        );
    }

    #[test]
    fn test_invalid_char() {
        assert_eq!(
            validate_hex_payload("0102zz"),
            Err(ValidationError::InvalidHexChar(4))
        );
    }

    #[test]
    fn test_too_long() {
        let hex = "0".repeat(MAX_HEX_PAYLOAD_LEN + 6);
        assert_eq!(validate_hex_payload(&hex), Err(ValidationError::PayloadTooLong));
    }

    #[test]
    fn test_input_size() {
        assert!(validate_input_size(1024).is_ok());
        assert_eq!(
            validate_input_size(MAX_INPUT_SIZE + 1),
            Err(ValidationError::InputTooLarge)
        );
    }
}
