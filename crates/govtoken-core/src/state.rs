use crate::breaker::CircuitBreaker;
use crate::governance::OfficerRegistry;
use crate::ledger::TokenLedger;
use crate::roles::RoleRegistry;
use crate::types::{Address, TokenMetadata};
use serde::{Deserialize, Serialize};

/// The entire durable state of a governed token.
///
/// This is the one structure written by the snapshot store; nothing else is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub metadata: TokenMetadata,
    pub contract_address: Address,
    pub officers: OfficerRegistry,
    pub roles: RoleRegistry,
    pub breaker: CircuitBreaker,
    pub ledger: TokenLedger,
    pub destroyed: bool,
}

impl TokenState {
    pub fn new(metadata: TokenMetadata, contract_address: Address, owner: Address) -> Self {
        Self {
            metadata,
            contract_address,
            officers: OfficerRegistry::new(owner),
            roles: RoleRegistry::new(),
            breaker: CircuitBreaker::new(),
            ledger: TokenLedger::new(),
            destroyed: false,
        }
    }
}
