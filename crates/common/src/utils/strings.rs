use alloy::primitives::{I256, U256};
use eyre::{eyre, Result};

/// Reinterprets an unsigned 256-bit word as a two's-complement signed integer
pub fn sign_uint(unsigned: U256) -> I256 {
    I256::from_raw(unsigned)
}

/// Decodes a hex string into a vector of bytes
///
/// ```
/// use zkevm_common::utils::strings::decode_hex;
///
/// let result = decode_hex("600160005b").expect("should decode hex");
/// assert_eq!(result, vec![0x60, 0x01, 0x60, 0x00, 0x5b]);
/// ```
pub fn decode_hex(mut s: &str) -> Result<Vec<u8>> {
    // normalize
    s = s.trim_start_matches("0x").trim();

    if s.is_empty() {
        return Ok(vec![]);
    }

    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| eyre!("invalid hex string: {}", s))
}
