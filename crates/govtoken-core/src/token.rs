use crate::access::{Authority, Capability};
use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::events::{EventBuffer, TokenEvent};
use crate::governance::transfer_superuser;
use crate::journal::EventJournal;
use crate::state::TokenState;
use crate::types::{Address, Amount, OfficerSeat, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub operation_id: String,
    pub events: Vec<TokenEvent>,
}

/// Governed token: the single state structure plus its event journal.
///
/// Every public mutation runs through `execute`, which refuses work after
/// destruction, buffers events while the operation runs, and only journals
/// them when the operation succeeds. Components validate every guard before
/// writing, so an `Err` never leaves a partial change behind.
#[derive(Debug, Clone)]
pub struct GovernedToken {
    state: TokenState,
    journal: EventJournal,
}

impl GovernedToken {
    /// Deploy a new token: `deployer` becomes owner and superuser and receives
    /// the initial supply.
    pub fn deploy(config: &TokenConfig, deployer: Address) -> Result<Self, TokenError> {
        deployer.ensure_non_zero("deployer")?;

        let contract_address = config.resolve_contract_address(&deployer);
        let mut state = TokenState::new(config.metadata(), contract_address, deployer);
        let mut events = EventBuffer::new();
        state.roles.grant(Role::Superuser, deployer, &mut events);
        if config.initial_supply > 0 {
            state
                .ledger
                .issue(deployer, config.initial_supply, &mut events)?;
        }

        let mut journal = EventJournal::new();
        journal.record("deploy", deployer, events.into_vec());
        info!(
            symbol = %config.symbol,
            deployer = %deployer,
            contract = %contract_address,
            initial_supply = config.initial_supply,
            "Token deployed"
        );

        Ok(Self { state, journal })
    }

    /// Resume from a persisted snapshot. The journal starts empty.
    pub fn from_state(state: TokenState) -> Self {
        Self {
            state,
            journal: EventJournal::new(),
        }
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Check the journal entries recorded since the previous check.
    pub fn verify_journal(&mut self) -> bool {
        self.journal.verify_appended()
    }

    // ---- queries -------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.state.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.state.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.state.metadata.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.state.ledger.total_supply()
    }

    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.state.ledger.balance_of(owner)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.ledger.allowance(owner, spender)
    }

    pub fn owner(&self) -> Address {
        self.state.officers.owner()
    }

    pub fn ceo(&self) -> Address {
        self.state.officers.ceo()
    }

    pub fn cfo(&self) -> Address {
        self.state.officers.cfo()
    }

    pub fn coo(&self) -> Address {
        self.state.officers.coo()
    }

    pub fn officer(&self, seat: OfficerSeat) -> Address {
        self.state.officers.officer(seat)
    }

    pub fn has_role(&self, role: Role, address: &Address) -> bool {
        self.state.roles.has(role, address)
    }

    pub fn paused(&self) -> bool {
        self.state.breaker.paused()
    }

    pub fn minting_finished(&self) -> bool {
        self.state.ledger.minting_finished()
    }

    pub fn destroyed(&self) -> bool {
        self.state.destroyed
    }

    pub fn contract_address(&self) -> Address {
        self.state.contract_address
    }

    // ---- ledger --------------------------------------------------------

    pub fn transfer(
        &mut self,
        caller: &Address,
        to: Address,
        amount: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("transfer", caller, |state, events| {
            state
                .ledger
                .transfer(&state.breaker, caller, to, amount, events)
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("transfer_from", caller, |state, events| {
            state
                .ledger
                .transfer_from(&state.breaker, caller, from, to, amount, events)
        })
    }

    pub fn approve(
        &mut self,
        caller: &Address,
        spender: Address,
        amount: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("approve", caller, |state, events| {
            state
                .ledger
                .approve(&state.breaker, caller, spender, amount, events)
        })
    }

    pub fn increase_approval(
        &mut self,
        caller: &Address,
        spender: Address,
        delta: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("increase_approval", caller, |state, events| {
            state
                .ledger
                .increase_approval(&state.breaker, caller, spender, delta, events)
        })
    }

    pub fn decrease_approval(
        &mut self,
        caller: &Address,
        spender: Address,
        delta: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("decrease_approval", caller, |state, events| {
            state
                .ledger
                .decrease_approval(&state.breaker, caller, spender, delta, events)
        })
    }

    pub fn mint(
        &mut self,
        caller: &Address,
        to: Address,
        amount: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("mint", caller, |state, events| {
            let authority = Authority::new(&state.officers, &state.roles);
            state
                .ledger
                .mint(&state.breaker, authority, caller, to, amount, events)
        })
    }

    pub fn finish_minting(&mut self, caller: &Address) -> Result<OperationReceipt, TokenError> {
        self.execute("finish_minting", caller, |state, events| {
            let authority = Authority::new(&state.officers, &state.roles);
            state
                .ledger
                .finish_minting(&state.breaker, authority, caller, events)
        })
    }

    pub fn burn(
        &mut self,
        caller: &Address,
        who: Address,
        amount: Amount,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("burn", caller, |state, events| {
            let authority = Authority::new(&state.officers, &state.roles);
            state
                .ledger
                .burn(&state.breaker, authority, caller, who, amount, events)
        })
    }

    // ---- circuit breaker -----------------------------------------------

    pub fn pause(&mut self, caller: &Address) -> Result<OperationReceipt, TokenError> {
        self.execute("pause", caller, |state, events| {
            let authority = Authority::new(&state.officers, &state.roles);
            state.breaker.pause(authority, caller, events)
        })
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<OperationReceipt, TokenError> {
        self.execute("unpause", caller, |state, events| {
            let authority = Authority::new(&state.officers, &state.roles);
            state.breaker.unpause(authority, caller, events)
        })
    }

    // ---- governance ----------------------------------------------------

    pub fn set_officer(
        &mut self,
        caller: &Address,
        seat: OfficerSeat,
        address: Address,
    ) -> Result<OperationReceipt, TokenError> {
        let operation = match seat {
            OfficerSeat::Ceo => "set_ceo",
            OfficerSeat::Cfo => "set_cfo",
            OfficerSeat::Coo => "set_coo",
        };
        self.execute(operation, caller, |state, events| {
            state
                .officers
                .set_officer(&state.roles, caller, seat, address, events)
        })
    }

    pub fn set_ceo(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.set_officer(caller, OfficerSeat::Ceo, address)
    }

    pub fn set_cfo(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.set_officer(caller, OfficerSeat::Cfo, address)
    }

    pub fn set_coo(
        &mut self,
        caller: &Address,
        address: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.set_officer(caller, OfficerSeat::Coo, address)
    }

    pub fn transfer_superuser(
        &mut self,
        caller: &Address,
        new_superuser: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("transfer_superuser", caller, |state, events| {
            transfer_superuser(&mut state.roles, caller, new_superuser, events)
        })
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("transfer_ownership", caller, |state, events| {
            state
                .officers
                .transfer_ownership(&state.roles, caller, new_owner, events)
        })
    }

    // ---- lifecycle -----------------------------------------------------

    /// Terminal shutdown: sweep custodial funds to `recipient` and refuse all
    /// further mutations. Works while paused.
    pub fn destroy(
        &mut self,
        caller: &Address,
        recipient: Address,
    ) -> Result<OperationReceipt, TokenError> {
        self.execute("destroy", caller, |state, events| {
            Authority::new(&state.officers, &state.roles)
                .require(Capability::Holds(Role::Superuser), caller)?;
            recipient.ensure_non_zero("recipient")?;

            let swept = state
                .ledger
                .sweep(state.contract_address, recipient, events)?;
            state.destroyed = true;
            info!(recipient = %recipient, swept, by = %caller, "Contract destroyed");
            events.emit(TokenEvent::Destroyed { recipient, swept });
            Ok(())
        })
    }

    /// Restore a pre-operation state after a failed commit downstream.
    pub(crate) fn rollback(&mut self, state: TokenState, journal_len: usize) {
        self.state = state;
        self.journal.truncate(journal_len);
    }

    fn execute<F>(
        &mut self,
        operation: &str,
        caller: &Address,
        apply: F,
    ) -> Result<OperationReceipt, TokenError>
    where
        F: FnOnce(&mut TokenState, &mut EventBuffer) -> Result<(), TokenError>,
    {
        let mut events = EventBuffer::new();
        let outcome = if self.state.destroyed {
            Err(TokenError::ContractDestroyed)
        } else if caller.is_zero() {
            Err(TokenError::InvalidAddress(
                "caller must not be the zero address".to_string(),
            ))
        } else {
            apply(&mut self.state, &mut events)
        };

        if let Err(err) = outcome {
            warn!(op = operation, caller = %caller, kind = err.kind(), error = %err, "Operation rejected");
            return Err(err);
        }

        let events = events.into_vec();
        let operation_id = self.journal.record(operation, *caller, events.clone());
        Ok(OperationReceipt {
            operation_id,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: Address = Address::from_low_u8(1);
    const ALICE: Address = Address::from_low_u8(2);

    fn token() -> GovernedToken {
        GovernedToken::deploy(&TokenConfig::default().with_initial_supply(1_000), DEPLOYER)
            .unwrap()
    }

    #[test]
    fn deploy_grants_owner_superuser_and_supply() {
        let token = token();
        assert_eq!(token.owner(), DEPLOYER);
        assert!(token.has_role(Role::Superuser, &DEPLOYER));
        assert_eq!(token.balance_of(&DEPLOYER), 1_000);
        assert_eq!(token.ceo(), Address::ZERO);
        assert_eq!(token.journal().len(), 2);
    }

    #[test]
    fn deploy_rejects_zero_deployer() {
        assert!(matches!(
            GovernedToken::deploy(&TokenConfig::default(), Address::ZERO),
            Err(TokenError::InvalidAddress(_))
        ));
    }

    #[test]
    fn rejected_operation_is_not_journaled() {
        let mut token = token();
        let before = token.journal().len();
        assert!(token.transfer(&ALICE, DEPLOYER, 1).is_err());
        assert_eq!(token.journal().len(), before);
    }

    #[test]
    fn receipt_events_match_journal() {
        let mut token = token();
        let receipt = token.mint(&DEPLOYER, ALICE, 5).unwrap();
        let journaled: Vec<_> = token
            .journal()
            .operation(&receipt.operation_id)
            .into_iter()
            .map(|entry| entry.event.clone())
            .collect();
        assert_eq!(journaled, receipt.events);
        assert_eq!(
            receipt.events,
            vec![
                TokenEvent::Mint { to: ALICE, amount: 5 },
                TokenEvent::Transfer {
                    from: Address::ZERO,
                    to: ALICE,
                    value: 5
                },
            ]
        );
    }

    #[test]
    fn set_officer_routes_each_seat() {
        let mut token = token();
        token.set_ceo(&DEPLOYER, Address::from_low_u8(10)).unwrap();
        token.set_cfo(&DEPLOYER, Address::from_low_u8(11)).unwrap();
        token.set_coo(&DEPLOYER, Address::from_low_u8(12)).unwrap();
        assert_eq!(token.officer(OfficerSeat::Ceo), Address::from_low_u8(10));
        assert_eq!(token.cfo(), Address::from_low_u8(11));
        assert_eq!(token.coo(), Address::from_low_u8(12));
    }
}
