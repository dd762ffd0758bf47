use crate::access::{Authority, Capability};
use crate::error::TokenError;
use crate::events::{EventBuffer, TokenEvent};
use crate::roles::RoleRegistry;
use crate::types::{Address, OfficerSeat, Role};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Owner plus the three officer seats.
///
/// Seats start vacant (zero address) and are only ever reassigned, never
/// cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRegistry {
    owner: Address,
    ceo: Address,
    cfo: Address,
    coo: Address,
}

impl OfficerRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            ceo: Address::ZERO,
            cfo: Address::ZERO,
            coo: Address::ZERO,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ceo(&self) -> Address {
        self.ceo
    }

    pub fn cfo(&self) -> Address {
        self.cfo
    }

    pub fn coo(&self) -> Address {
        self.coo
    }

    pub fn officer(&self, seat: OfficerSeat) -> Address {
        match seat {
            OfficerSeat::Ceo => self.ceo,
            OfficerSeat::Cfo => self.cfo,
            OfficerSeat::Coo => self.coo,
        }
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner == *address
    }

    pub fn is_officer_or_owner(&self, address: &Address) -> bool {
        [self.ceo, self.cfo, self.coo, self.owner].contains(address)
    }

    /// Assign an officer seat. Reassigning the current holder is allowed.
    pub(crate) fn set_officer(
        &mut self,
        roles: &RoleRegistry,
        caller: &Address,
        seat: OfficerSeat,
        address: Address,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        Authority::new(self, roles).require(Capability::OwnerOrSuperuser, caller)?;
        address.ensure_non_zero(seat.name())?;

        let slot = match seat {
            OfficerSeat::Ceo => &mut self.ceo,
            OfficerSeat::Cfo => &mut self.cfo,
            OfficerSeat::Coo => &mut self.coo,
        };
        let previous = std::mem::replace(slot, address);

        info!(seat = %seat, previous = %previous, new = %address, by = %caller, "Officer assigned");
        events.emit(TokenEvent::OfficerAssigned {
            seat,
            previous,
            new: address,
        });
        Ok(())
    }

    pub(crate) fn transfer_ownership(
        &mut self,
        roles: &RoleRegistry,
        caller: &Address,
        new_owner: Address,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        Authority::new(self, roles).require(Capability::Owner, caller)?;
        new_owner.ensure_non_zero("new owner")?;

        let previous = std::mem::replace(&mut self.owner, new_owner);
        info!(previous = %previous, new = %new_owner, "Ownership transferred");
        events.emit(TokenEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }
}

/// Move the superuser role from `caller` to `new_superuser`.
///
/// Revoke-then-grant on the caller only; other bearers keep the role. Passing
/// the caller's own address leaves it holding the role.
pub(crate) fn transfer_superuser(
    roles: &mut RoleRegistry,
    caller: &Address,
    new_superuser: Address,
    events: &mut EventBuffer,
) -> Result<(), TokenError> {
    roles.require(Role::Superuser, caller)?;
    new_superuser.ensure_non_zero("new superuser")?;

    roles.revoke(Role::Superuser, caller, events);
    roles.grant(Role::Superuser, new_superuser, events);
    info!(previous = %caller, new = %new_superuser, "Superuser transferred");
    Ok(())
}
