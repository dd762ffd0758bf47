use crate::error::TokenError;
use crate::events::{EventBuffer, TokenEvent};
use crate::types::{Address, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Role membership table: role -> set of bearers.
///
/// Pure set semantics. Grant and revoke are crate-internal so only governance
/// paths can reach them; every call emits a role-change event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn grant(&mut self, role: Role, address: Address, events: &mut EventBuffer) {
        self.members.entry(role).or_default().insert(address);
        events.emit(TokenEvent::RoleAdded {
            operator: address,
            role,
        });
    }

    pub(crate) fn revoke(&mut self, role: Role, address: &Address, events: &mut EventBuffer) {
        if let Some(bearers) = self.members.get_mut(&role) {
            bearers.remove(address);
            if bearers.is_empty() {
                self.members.remove(&role);
            }
        }
        events.emit(TokenEvent::RoleRemoved {
            operator: *address,
            role,
        });
    }

    pub fn has(&self, role: Role, address: &Address) -> bool {
        self.members
            .get(&role)
            .map(|bearers| bearers.contains(address))
            .unwrap_or(false)
    }

    pub fn require(&self, role: Role, address: &Address) -> Result<(), TokenError> {
        if self.has(role, address) {
            Ok(())
        } else {
            Err(TokenError::unauthorized(*address, role.name()))
        }
    }

    pub fn bearers(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members
            .get(&role)
            .map(|bearers| bearers.iter())
            .into_iter()
            .flatten()
    }
}
