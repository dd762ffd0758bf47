use crate::access::{Authority, Capability};
use crate::breaker::CircuitBreaker;
use crate::error::{checked_add, checked_sub, TokenError};
use crate::events::{EventBuffer, TokenEvent};
use crate::types::{Address, Amount, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Balances, allowances, supply and the minting latch.
///
/// Every mutating entry point validates all of its guards and computes every
/// new value with checked arithmetic before writing anything, so a failed call
/// leaves the ledger untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    total_supply: Amount,
    minting_finished: bool,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn minting_finished(&self) -> bool {
        self.minting_finished
    }

    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// True when `total_supply` equals the sum of all balances.
    pub fn supply_matches_balances(&self) -> bool {
        self.balances
            .values()
            .try_fold(0 as Amount, |sum, balance| sum.checked_add(*balance))
            .map(|sum| sum == self.total_supply)
            .unwrap_or(false)
    }

    /// Unguarded issuance used only while deploying.
    pub(crate) fn issue(
        &mut self,
        to: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        let supply = checked_add(self.total_supply, amount)?;
        let balance = checked_add(self.balance_of(&to), amount)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        events.emit(TokenEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Any non-zero recipient is accepted, including the sender and the
    /// token's own `contract_address`: the latter is the custody account that
    /// `destroy` sweeps, so it has to be able to receive funds.
    pub(crate) fn transfer(
        &mut self,
        breaker: &CircuitBreaker,
        caller: &Address,
        to: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        to.ensure_non_zero("recipient")?;

        self.move_balance(caller, &to, amount)?;
        debug!(from = %caller, to = %to, amount, "Transfer");
        events.emit(TokenEvent::Transfer {
            from: *caller,
            to,
            value: amount,
        });
        Ok(())
    }

    pub(crate) fn transfer_from(
        &mut self,
        breaker: &CircuitBreaker,
        spender: &Address,
        from: Address,
        to: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        to.ensure_non_zero("recipient")?;

        let have = self.balance_of(&from);
        if amount > have {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        let allowed = self.allowance(&from, spender);
        if amount > allowed {
            return Err(TokenError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        let remaining = checked_sub(allowed, amount)?;

        self.move_balance(&from, &to, amount)?;
        self.set_allowance(from, *spender, remaining);
        debug!(from = %from, to = %to, spender = %spender, amount, "Delegated transfer");
        events.emit(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Overwrite the caller's allowance for `spender`.
    pub(crate) fn approve(
        &mut self,
        breaker: &CircuitBreaker,
        caller: &Address,
        spender: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        self.set_allowance(*caller, spender, amount);
        debug!(owner = %caller, spender = %spender, amount, "Approval set");
        events.emit(TokenEvent::Approval {
            owner: *caller,
            spender,
            value: amount,
        });
        Ok(())
    }

    pub(crate) fn increase_approval(
        &mut self,
        breaker: &CircuitBreaker,
        caller: &Address,
        spender: Address,
        delta: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        let value = checked_add(self.allowance(caller, &spender), delta)?;
        self.set_allowance(*caller, spender, value);
        debug!(owner = %caller, spender = %spender, delta, value, "Approval increased");
        events.emit(TokenEvent::Approval {
            owner: *caller,
            spender,
            value,
        });
        Ok(())
    }

    /// Lower an allowance, clamping at zero instead of failing.
    pub(crate) fn decrease_approval(
        &mut self,
        breaker: &CircuitBreaker,
        caller: &Address,
        spender: Address,
        delta: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        let value = self.allowance(caller, &spender).saturating_sub(delta);
        self.set_allowance(*caller, spender, value);
        debug!(owner = %caller, spender = %spender, delta, value, "Approval decreased");
        events.emit(TokenEvent::Approval {
            owner: *caller,
            spender,
            value,
        });
        Ok(())
    }

    pub(crate) fn mint(
        &mut self,
        breaker: &CircuitBreaker,
        authority: Authority<'_>,
        caller: &Address,
        to: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        authority.require(Capability::OfficerOrOwner, caller)?;
        to.ensure_non_zero("mint recipient")?;
        if self.minting_finished {
            return Err(TokenError::MintingFinished);
        }

        let supply = checked_add(self.total_supply, amount)?;
        let balance = checked_add(self.balance_of(&to), amount)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);

        info!(to = %to, amount, total_supply = supply, by = %caller, "Minted");
        events.emit(TokenEvent::Mint { to, amount });
        events.emit(TokenEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
        Ok(())
    }

    pub(crate) fn finish_minting(
        &mut self,
        breaker: &CircuitBreaker,
        authority: Authority<'_>,
        caller: &Address,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        authority.require(Capability::OfficerOrOwner, caller)?;
        if self.minting_finished {
            return Err(TokenError::MintingFinished);
        }

        self.minting_finished = true;
        info!(by = %caller, total_supply = self.total_supply, "Minting finished");
        events.emit(TokenEvent::MintFinished);
        Ok(())
    }

    pub(crate) fn burn(
        &mut self,
        breaker: &CircuitBreaker,
        authority: Authority<'_>,
        caller: &Address,
        who: Address,
        amount: Amount,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        breaker.ensure_open()?;
        authority.require(Capability::Holds(Role::Superuser), caller)?;

        let have = self.balance_of(&who);
        if amount > have {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        let balance = checked_sub(have, amount)?;
        let supply = checked_sub(self.total_supply, amount)?;
        self.balances.insert(who, balance);
        self.total_supply = supply;

        info!(burner = %who, amount, total_supply = supply, by = %caller, "Burned");
        events.emit(TokenEvent::Burn {
            burner: who,
            value: amount,
        });
        events.emit(TokenEvent::Transfer {
            from: who,
            to: Address::ZERO,
            value: amount,
        });
        Ok(())
    }

    /// Move the entire balance of `from` to `to`; returns the amount moved.
    pub(crate) fn sweep(
        &mut self,
        from: Address,
        to: Address,
        events: &mut EventBuffer,
    ) -> Result<Amount, TokenError> {
        let amount = self.balance_of(&from);
        if amount == 0 {
            return Ok(0);
        }
        self.move_balance(&from, &to, amount)?;
        events.emit(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(amount)
    }

    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let have = self.balance_of(from);
        if amount > have {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        let from_after = checked_sub(have, amount)?;
        let to_before = if from == to {
            from_after
        } else {
            self.balance_of(to)
        };
        let to_after = checked_add(to_before, amount)?;

        self.balances.insert(*from, from_after);
        self.balances.insert(*to, to_after);
        Ok(())
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, value: Amount) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, value);
    }
}
