use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::abi::{encode_function_call, AbiParam};
use crate::error::ChainError;

/// Function selector for vault `deposit(uint256)`: `0xb6b55f25`.
pub const DEPOSIT_SELECTOR: [u8; 4] = [0xb6, 0xb5, 0x5f, 0x25];

/// Function selector for vault `withdraw(uint256)`: `0x2e1a7d4d`.
pub const WITHDRAW_SELECTOR: [u8; 4] = [0x2e, 0x1a, 0x7d, 0x4d];

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Function selector for the wrapped-native payable `deposit()`: `0xd0e30db0`.
pub const WRAP_SELECTOR: [u8; 4] = [0xd0, 0xe3, 0x0d, 0xb0];

/// The state-changing calls a deposit or withdrawal can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Wrap,
    Approve,
    Deposit,
    Withdraw,
}

impl CallKind {
    /// Solidity signature of the function this call targets.
    pub fn signature(&self) -> &'static str {
        match self {
            CallKind::Wrap => "deposit()",
            CallKind::Approve => "approve(address,uint256)",
            CallKind::Deposit => "deposit(uint256)",
            CallKind::Withdraw => "withdraw(uint256)",
        }
    }

    pub fn selector(&self) -> [u8; 4] {
        match self {
            CallKind::Wrap => WRAP_SELECTOR,
            CallKind::Approve => APPROVE_SELECTOR,
            CallKind::Deposit => DEPOSIT_SELECTOR,
            CallKind::Withdraw => WITHDRAW_SELECTOR,
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CallKind::Wrap => "wrap",
            CallKind::Approve => "approve",
            CallKind::Deposit => "deposit",
            CallKind::Withdraw => "withdraw",
        };
        f.write_str(label)
    }
}

/// Parses a decimal amount in the token's smallest unit.
///
/// Rejects empty input, signs, fractional values and anything that does not
/// fit in a uint256.
pub fn parse_amount(amount: &str) -> Result<U256, ChainError> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err(ChainError::EncodingError("amount is empty".into()));
    }
    if amount.starts_with('-') {
        return Err(ChainError::EncodingError(format!(
            "amount must not be negative: {amount}"
        )));
    }
    if amount.contains('.') {
        return Err(ChainError::EncodingError(format!(
            "amount must be an integer in the smallest unit: {amount}"
        )));
    }
    if !amount.chars().all(|c| c.is_ascii_digit()) {
        return Err(ChainError::EncodingError(format!(
            "amount is not a decimal integer: {amount}"
        )));
    }

    U256::from_str_radix(amount, 10)
        .map_err(|e| ChainError::EncodingError(format!("amount out of range: {e}")))
}

/// Encodes a vault `deposit(uint256)` call.
pub fn encode_deposit(amount: U256) -> Vec<u8> {
    encode_function_call(DEPOSIT_SELECTOR, &[AbiParam::Uint256(amount)])
}

/// Encodes a vault `withdraw(uint256)` call for the given share amount.
pub fn encode_withdraw(shares: U256) -> Vec<u8> {
    encode_function_call(WITHDRAW_SELECTOR, &[AbiParam::Uint256(shares)])
}

/// Encodes a token `approve(address,uint256)` call.
pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    let params = [AbiParam::Address(spender), AbiParam::Uint256(amount)];
    encode_function_call(APPROVE_SELECTOR, &params)
}

/// Encodes the wrapped-native `deposit()` call. The amount to wrap travels as
/// the transaction value, not as calldata.
pub fn encode_wrap() -> Vec<u8> {
    encode_function_call(WRAP_SELECTOR, &[])
}
