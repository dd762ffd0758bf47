use crate::types::{Address, Amount, TokenMetadata};
use serde::{Deserialize, Serialize};

/// Deployment parameters for a governed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Credited to the deployer at deployment.
    pub initial_supply: Amount,
    /// Custody account of the token itself. Derived from the deployer when unset.
    pub contract_address: Option<Address>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Governed Token".to_string(),
            symbol: "GOV".to_string(),
            decimals: 8,
            initial_supply: 10_000_000_000,
            contract_address: None,
        }
    }
}

impl TokenConfig {
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
        }
    }

    pub fn with_initial_supply(mut self, initial_supply: Amount) -> Self {
        self.initial_supply = initial_supply;
        self
    }

    pub fn with_contract_address(mut self, contract_address: Address) -> Self {
        self.contract_address = Some(contract_address);
        self
    }

    /// Configured custody address, or one derived from deployer and symbol.
    pub fn resolve_contract_address(&self, deployer: &Address) -> Address {
        self.contract_address.unwrap_or_else(|| {
            let mut seed = b"govtoken-contract".to_vec();
            seed.extend_from_slice(deployer.as_bytes());
            seed.extend_from_slice(self.symbol.as_bytes());
            Address::derive(&seed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_contract_address_is_stable_and_non_zero() {
        let config = TokenConfig::default();
        let deployer = Address::from_low_u8(1);
        let first = config.resolve_contract_address(&deployer);
        assert_eq!(first, config.resolve_contract_address(&deployer));
        assert!(!first.is_zero());
        assert_ne!(first, config.resolve_contract_address(&Address::from_low_u8(2)));
    }

    #[test]
    fn explicit_contract_address_wins() {
        let custody = Address::from_low_u8(0xcc);
        let config = TokenConfig::default().with_contract_address(custody);
        assert_eq!(config.resolve_contract_address(&Address::from_low_u8(1)), custody);
    }
}
