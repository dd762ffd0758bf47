use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::state::TokenState;
use crate::token::{GovernedToken, OperationReceipt};
use crate::types::Address;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot rejected: {0}")]
    Inconsistent(String),
}

/// Failure of a persisted operation: either the operation itself was rejected
/// or its resulting state could not be written.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Snapshot persistence backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SnapshotStoreConfig {
    /// Keep state in process memory only.
    #[default]
    Memory,
    /// Persist the state structure as JSON after every committed operation.
    File { path: PathBuf },
}

impl SnapshotStoreConfig {
    pub fn memory() -> Self {
        Self::Memory
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File { .. } => "file",
        }
    }
}

/// Durable home of the single `TokenState` structure.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: SnapshotStoreConfig,
}

impl SnapshotStore {
    pub fn new(config: SnapshotStoreConfig) -> Self {
        Self { config }
    }

    pub fn label(&self) -> &'static str {
        self.config.label()
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.config {
            SnapshotStoreConfig::Memory => None,
            SnapshotStoreConfig::File { path } => Some(path),
        }
    }

    /// Load a previously saved state; `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<TokenState>, StoreError> {
        let Some(path) = self.path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let state: TokenState = serde_json::from_slice(&bytes)?;
        if !state.ledger.supply_matches_balances() {
            return Err(StoreError::Inconsistent(format!(
                "total supply {} does not equal the sum of balances in {}",
                state.ledger.total_supply(),
                path.display()
            )));
        }
        Ok(Some(state))
    }

    /// Write the snapshot via a temp file and rename, so readers never see a
    /// half-written state.
    pub fn save(&self, state: &TokenState) -> Result<(), StoreError> {
        let Some(path) = self.path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), "Snapshot saved");
        Ok(())
    }
}

/// Governed token bound to a snapshot store.
///
/// Invariant handling:
/// - The operation runs against the in-memory token first.
/// - The resulting state is persisted before the call reports success.
/// - If persisting fails the in-memory state and journal are rolled back.
#[derive(Debug, Clone)]
pub struct PersistentToken {
    token: GovernedToken,
    store: SnapshotStore,
}

impl PersistentToken {
    /// Resume from the store when it holds a snapshot, otherwise deploy fresh
    /// and persist the genesis state.
    pub fn bootstrap(
        store_config: SnapshotStoreConfig,
        token_config: &TokenConfig,
        deployer: Address,
    ) -> Result<Self, CommitError> {
        let store = SnapshotStore::new(store_config);
        if let Some(state) = store.load()? {
            info!(
                backend = store.label(),
                symbol = %state.metadata.symbol,
                total_supply = state.ledger.total_supply(),
                "Resumed token from snapshot"
            );
            return Ok(Self {
                token: GovernedToken::from_state(state),
                store,
            });
        }

        let token = GovernedToken::deploy(token_config, deployer)?;
        store.save(token.state())?;
        Ok(Self { token, store })
    }

    pub fn token(&self) -> &GovernedToken {
        &self.token
    }

    pub fn verify_journal(&mut self) -> bool {
        self.token.verify_journal()
    }

    pub fn backend_label(&self) -> &'static str {
        self.store.label()
    }

    /// Run one operation and persist its outcome.
    pub fn commit<F>(&mut self, operation: F) -> Result<OperationReceipt, CommitError>
    where
        F: FnOnce(&mut GovernedToken) -> Result<OperationReceipt, TokenError>,
    {
        let state_before = self.token.state().clone();
        let journal_before = self.token.journal().len();

        let receipt = operation(&mut self.token)?;
        if let Err(err) = self.store.save(self.token.state()) {
            warn!(error = %err, operation_id = %receipt.operation_id, "Snapshot write failed; rolling back");
            self.token.rollback(state_before, journal_before);
            return Err(err.into());
        }
        Ok(receipt)
    }
}
