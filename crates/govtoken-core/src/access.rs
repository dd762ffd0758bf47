//! Authorization predicates.
//!
//! Each rule is a `Capability` evaluated against a borrowed `Authority` view of
//! the officer and role tables. Guards return a typed `TokenError` so they can
//! be chained with `?` at the top of every operation.

use crate::error::TokenError;
use crate::governance::OfficerRegistry;
use crate::roles::RoleRegistry;
use crate::types::{Address, Role};

/// Read-only view over everything that can grant authority.
#[derive(Debug, Clone, Copy)]
pub struct Authority<'a> {
    pub officers: &'a OfficerRegistry,
    pub roles: &'a RoleRegistry,
}

impl<'a> Authority<'a> {
    pub fn new(officers: &'a OfficerRegistry, roles: &'a RoleRegistry) -> Self {
        Self { officers, roles }
    }

    pub fn require(&self, capability: Capability, caller: &Address) -> Result<(), TokenError> {
        capability.authorize(self, caller)
    }
}

/// Authorization rule attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Caller is the current owner.
    Owner,
    /// Caller is the owner or holds the superuser role.
    OwnerOrSuperuser,
    /// Caller sits in an officer seat or is the owner.
    OfficerOrOwner,
    /// Caller holds the given role.
    Holds(Role),
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::OwnerOrSuperuser => "owner-or-superuser",
            Self::OfficerOrOwner => "officer-or-owner",
            Self::Holds(role) => role.name(),
        }
    }

    pub fn permits(&self, authority: &Authority<'_>, caller: &Address) -> bool {
        // Vacant seats hold the zero address; it must never match.
        if caller.is_zero() {
            return false;
        }

        match self {
            Self::Owner => authority.officers.is_owner(caller),
            Self::OwnerOrSuperuser => {
                authority.officers.is_owner(caller)
                    || authority.roles.has(Role::Superuser, caller)
            }
            Self::OfficerOrOwner => authority.officers.is_officer_or_owner(caller),
            Self::Holds(role) => authority.roles.has(*role, caller),
        }
    }

    pub fn authorize(&self, authority: &Authority<'_>, caller: &Address) -> Result<(), TokenError> {
        if self.permits(authority, caller) {
            Ok(())
        } else {
            Err(TokenError::unauthorized(*caller, self.label()))
        }
    }
}
