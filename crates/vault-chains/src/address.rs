use alloy_primitives::Address;
use sha3::{Digest, Keccak256};

use crate::error::ChainError;

/// Strips the `0x`/`0X` prefix and checks for exactly 40 hex digits.
fn hex_body(address: &str) -> Result<&str, ChainError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ChainError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(ChainError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChainError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(hex_part)
}

/// Returns whether `address` is a well-formed account or contract address.
///
/// Letter case is not checksum-verified: all-lowercase, all-uppercase and
/// mixed-case spellings of the same 20 bytes are equally valid. Never panics.
pub fn is_valid_address(address: &str) -> bool {
    hex_body(address).is_ok()
}

/// Parses a 0x-prefixed hex address into an [`Address`].
pub fn parse_address(address: &str) -> Result<Address, ChainError> {
    let hex_part = hex_body(address)?;

    let bytes = hex::decode(hex_part)
        .map_err(|e| ChainError::InvalidAddress(format!("invalid hex: {e}")))?;

    Ok(Address::from_slice(&bytes))
}

/// Renders an address with EIP-55 mixed-case checksum encoding.
pub fn checksum_address(address: &Address) -> String {
    let hex_part = hex::encode(address.as_slice());

    // EIP-55: hash the lowercase hex address (without 0x).
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        // High nibble for even positions, low nibble for odd.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

/// Short `0x1234...abcd` form for status messages.
pub fn short_address(address: &Address) -> String {
    let full = checksum_address(address);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let parsed = parse_address(&expected.to_lowercase()).unwrap();
            assert_eq!(
                &checksum_address(&parsed),
                expected,
                "checksum mismatch for {}",
                expected
            );
        }
    }

    #[test]
    fn valid_lowercase_and_uppercase() {
        assert!(is_valid_address("0x4200000000000000000000000000000000000006"));
        assert!(is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(is_valid_address("0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"));
    }

    #[test]
    fn valid_mixed_case_without_checksum_check() {
        assert!(is_valid_address("0xA6854c1F54198D351D6d4263806F5A876099839b"));
        // Wrong checksum casing is still the same 20 bytes.
        assert!(is_valid_address("0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn empty_string_is_invalid() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
    }

    #[test]
    fn wrong_length_is_invalid() {
        assert!(!is_valid_address("0x5aAeb6053F"));
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00"));
    }

    #[test]
    fn non_hex_is_invalid() {
        assert!(!is_valid_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeA d"));
    }

    #[test]
    fn missing_prefix_is_invalid() {
        assert!(!is_valid_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert!(!is_valid_address("0x€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€€"));
        assert!(!is_valid_address("0xéééééééééééééééééééé"));
    }

    #[test]
    fn parse_is_case_insensitive() {
        let lower = parse_address("0xa6854c1f54198d351d6d4263806f5a876099839b").unwrap();
        let mixed = parse_address("0xA6854c1F54198D351D6d4263806F5A876099839b").unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn parse_reports_reason() {
        let err = parse_address("0xdead").unwrap_err();
        assert_eq!(
            err,
            ChainError::InvalidAddress("expected 40 hex characters, got 4".into())
        );
    }

    #[test]
    fn short_address_form() {
        let addr = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(short_address(&addr), "0x5aAe...eAed");
    }
}
