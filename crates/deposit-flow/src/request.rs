use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use vault_chains::{parse_address, parse_amount, ChainProfile, ChainRegistry};

use crate::error::ValidationError;

/// One deposit, fixed for the lifetime of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRequest {
    vault: Address,
    amount: U256,
    chain_id: u64,
    token: Address,
    vault_id: Option<String>,
}

impl DepositRequest {
    /// Validates addresses and amount. Chain membership needs a registry and
    /// is checked by [`DepositRequest::validate`].
    pub fn new(
        vault: &str,
        amount: U256,
        chain_id: u64,
        token: &str,
        vault_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let vault = parse_address(vault)
            .map_err(|e| ValidationError::InvalidVaultAddress(e.to_string()))?;
        let token = parse_address(token)
            .map_err(|e| ValidationError::InvalidTokenAddress(e.to_string()))?;

        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }

        Ok(Self {
            vault,
            amount,
            chain_id,
            token,
            vault_id,
        })
    }

    /// Resolves the target chain, failing if it is not in `registry`.
    pub fn validate<'r>(
        &self,
        registry: &'r ChainRegistry,
    ) -> Result<&'r ChainProfile, ValidationError> {
        registry
            .resolve_chain(self.chain_id)
            .map_err(ValidationError::from)
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn vault_id(&self) -> Option<&str> {
        self.vault_id.as_deref()
    }
}

/// Deposit parameters as the UI hands them over, all amounts as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositParams {
    pub vault: String,
    pub amount: String,
    pub chain_id: u64,
    pub token_address: String,
    #[serde(default)]
    pub vault_id: Option<String>,
}

impl DepositParams {
    pub fn into_request(self) -> Result<DepositRequest, ValidationError> {
        let amount = parse_amount(&self.amount)
            .map_err(|e| ValidationError::InvalidAmount(e.to_string()))?;
        DepositRequest::new(
            &self.vault,
            amount,
            self.chain_id,
            &self.token_address,
            self.vault_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAULT: &str = "0xA6854c1F54198D351D6d4263806F5A876099839b";
    const WETH_BASE: &str = "0x4200000000000000000000000000000000000006";

    #[test]
    fn builds_valid_request() {
        let request = DepositRequest::new(
            VAULT,
            U256::from(1_000_000_000_000_000u64),
            8453,
            WETH_BASE,
            Some("moonwell-weth".into()),
        )
        .unwrap();

        assert_eq!(request.chain_id(), 8453);
        assert_eq!(request.vault_id(), Some("moonwell-weth"));
        assert_eq!(request.vault(), parse_address(VAULT).unwrap());
    }

    #[test]
    fn rejects_zero_amount() {
        let err = DepositRequest::new(VAULT, U256::ZERO, 8453, WETH_BASE, None).unwrap_err();
        assert_eq!(err, ValidationError::ZeroAmount);
    }

    #[test]
    fn rejects_bad_vault_address() {
        let err =
            DepositRequest::new("0x1234", U256::from(1u64), 8453, WETH_BASE, None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVaultAddress(_)));
    }

    #[test]
    fn rejects_bad_token_address() {
        let err = DepositRequest::new(VAULT, U256::from(1u64), 8453, "weth", None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTokenAddress(_)));
    }

    #[test]
    fn validate_resolves_chain() {
        let registry = ChainRegistry::bundled();
        let request = DepositRequest::new(VAULT, U256::from(1u64), 8453, WETH_BASE, None).unwrap();
        assert_eq!(request.validate(&registry).unwrap().name, "Base");
    }

    #[test]
    fn validate_rejects_unsupported_chain() {
        let registry = ChainRegistry::bundled();
        let request = DepositRequest::new(VAULT, U256::from(1u64), 31337, WETH_BASE, None).unwrap();
        assert_eq!(
            request.validate(&registry).unwrap_err(),
            ValidationError::UnsupportedChain(31337)
        );
    }

    #[test]
    fn params_from_json() {
        let json = format!(
            r#"{{"vault":"{VAULT}","amount":"1000000000000000","chainId":8453,"tokenAddress":"{WETH_BASE}"}}"#
        );
        let params: DepositParams = serde_json::from_str(&json).unwrap();
        let request = params.into_request().unwrap();
        assert_eq!(request.amount(), U256::from(1_000_000_000_000_000u64));
        assert!(request.vault_id().is_none());
    }

    #[test]
    fn params_reject_fractional_amount() {
        let params = DepositParams {
            vault: VAULT.into(),
            amount: "0.5".into(),
            chain_id: 8453,
            token_address: WETH_BASE.into(),
            vault_id: None,
        };
        assert!(matches!(
            params.into_request().unwrap_err(),
            ValidationError::InvalidAmount(_)
        ));
    }
}
