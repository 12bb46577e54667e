//! Minimal ABI encoding for vault and token function calls.
//!
//! Only static 32-byte words are needed by the deposit flow, so there is no
//! dynamic-type support here.

use alloy_primitives::{Address, U256};

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

/// Encodes a function call with the given 4-byte selector and ABI parameters.
///
/// The output is `selector || encode(params[0]) || encode(params[1]) || ...`
/// where each parameter is encoded as a 32-byte ABI word.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

/// Encodes a single [`AbiParam`] as a 32-byte ABI word.
fn encode_param(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<32>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_address_param() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xde;
        bytes[19] = 0xad;
        let addr = Address::from(bytes);

        let word = encode_param(&AbiParam::Address(addr));

        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &bytes);
    }

    #[test]
    fn encode_uint256_param() {
        let word = encode_param(&AbiParam::Uint256(U256::from(42u64)));
        assert_eq!(&word[..31], &[0u8; 31]);
        assert_eq!(word[31], 42);
    }

    #[test]
    fn encode_uint256_max() {
        let word = encode_param(&AbiParam::Uint256(U256::MAX));
        assert_eq!(word, [0xff; 32]);
    }

    #[test]
    fn encode_function_call_with_selector_only() {
        let selector = [0xd0, 0xe3, 0x0d, 0xb0];
        let data = encode_function_call(selector, &[]);
        assert_eq!(data, selector.to_vec());
    }

    #[test]
    fn encode_function_call_with_params() {
        let selector = [0x09, 0x5e, 0xa7, 0xb3];
        let mut bytes = [0u8; 20];
        bytes[19] = 0x01;

        let params = [
            AbiParam::Address(Address::from(bytes)),
            AbiParam::Uint256(U256::from(100u64)),
        ];
        let data = encode_function_call(selector, &params);

        // 4-byte selector + 2 * 32-byte params = 68 bytes.
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], &selector);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[35], 0x01);
        assert_eq!(data[67], 100);
    }
}
