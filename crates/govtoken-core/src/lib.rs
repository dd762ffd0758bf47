//! Governed token ledger.
//!
//! A single-asset ledger whose supply and transfer operations are gated by an
//! owner, a transferable superuser role, three officer seats and a global pause
//! circuit breaker. Every public mutation is a policy decision followed by an
//! all-or-nothing ledger update, recorded in a hash-chained event journal.

#![deny(unsafe_code)]

pub mod access;
pub mod breaker;
pub mod config;
pub mod error;
pub mod events;
pub mod governance;
pub mod journal;
pub mod ledger;
pub mod roles;
pub mod state;
pub mod store;
pub mod token;
pub mod types;

pub use access::{Authority, Capability};
pub use breaker::{BreakerState, CircuitBreaker};
pub use config::TokenConfig;
pub use error::TokenError;
pub use events::{EventBuffer, TokenEvent};
pub use governance::OfficerRegistry;
pub use journal::{EventJournal, JournalEntry};
pub use ledger::TokenLedger;
pub use roles::RoleRegistry;
pub use state::TokenState;
pub use store::{CommitError, PersistentToken, SnapshotStore, SnapshotStoreConfig, StoreError};
pub use token::{GovernedToken, OperationReceipt};
pub use types::{Address, Amount, OfficerSeat, Role, TokenMetadata};
