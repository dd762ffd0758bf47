use crate::access::{Authority, Capability};
use crate::error::TokenError;
use crate::events::{EventBuffer, TokenEvent};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Breaker position. `Open` lets mutations through; `Closed` halts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Open,
    Closed,
}

impl BreakerState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Global pause switch.
///
/// Only two transitions exist, open->closed (`pause`) and closed->open
/// (`unpause`); both require officer-or-owner. There is no timeout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    paused: bool,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> BreakerState {
        if self.paused {
            BreakerState::Closed
        } else {
            BreakerState::Open
        }
    }

    /// Guard for every pause-gated mutation.
    pub fn ensure_open(&self) -> Result<(), TokenError> {
        if self.paused {
            return Err(TokenError::ContractPaused);
        }
        Ok(())
    }

    pub(crate) fn pause(
        &mut self,
        authority: Authority<'_>,
        caller: &Address,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        authority.require(Capability::OfficerOrOwner, caller)?;
        self.transition(BreakerState::Open, BreakerState::Closed)?;
        info!(by = %caller, "Contract paused");
        events.emit(TokenEvent::Pause);
        Ok(())
    }

    pub(crate) fn unpause(
        &mut self,
        authority: Authority<'_>,
        caller: &Address,
        events: &mut EventBuffer,
    ) -> Result<(), TokenError> {
        authority.require(Capability::OfficerOrOwner, caller)?;
        self.transition(BreakerState::Closed, BreakerState::Open)?;
        info!(by = %caller, "Contract unpaused");
        events.emit(TokenEvent::Unpause);
        Ok(())
    }

    fn transition(&mut self, expected: BreakerState, next: BreakerState) -> Result<(), TokenError> {
        match (self.state(), expected) {
            (BreakerState::Closed, BreakerState::Open) => Err(TokenError::AlreadyPaused),
            (BreakerState::Open, BreakerState::Closed) => Err(TokenError::NotPaused),
            _ => {
                self.paused = next == BreakerState::Closed;
                Ok(())
            }
        }
    }
}
