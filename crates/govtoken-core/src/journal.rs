use crate::events::TokenEvent;
use crate::types::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hash-chained journal record for a single emitted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub index: u64,
    pub operation_id: String,
    pub operation: String,
    pub caller: Address,
    pub timestamp: DateTime<Utc>,
    pub event: TokenEvent,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Append-only event journal.
///
/// No in-place mutation APIs are exposed. Events are appended per operation,
/// all sharing one operation id, and only after the operation committed.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
    // Length of the prefix already checked by `verify_appended`.
    verified: usize,
}

impl EventJournal {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            verified: 0,
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn operation(&self, operation_id: &str) -> Vec<&JournalEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.operation_id == operation_id)
            .collect()
    }

    /// Append the events of one committed operation; returns its operation id.
    pub fn record(
        &mut self,
        operation: &str,
        caller: Address,
        events: Vec<TokenEvent>,
    ) -> String {
        let operation_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();

        for event in events {
            let index = self.entries.len() as u64;
            let previous_hash = self.entries.last().map(|entry| entry.entry_hash.clone());
            let entry_hash = compute_entry_hash(
                index,
                &operation_id,
                operation,
                &caller,
                timestamp,
                &event,
                previous_hash.as_deref(),
            );
            self.entries.push(JournalEntry {
                index,
                operation_id: operation_id.clone(),
                operation: operation.to_string(),
                caller,
                timestamp,
                event,
                previous_hash,
                entry_hash,
            });
        }

        operation_id
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
        self.verified = self.verified.min(len);
    }

    /// Full re-verification from the first entry.
    pub fn verify_chain(&self) -> bool {
        self.verify_from(0)
    }

    /// Verify only the entries appended since the last successful call, linked
    /// to the already verified prefix. Cost is proportional to the new entries.
    pub fn verify_appended(&mut self) -> bool {
        if !self.verify_from(self.verified) {
            return false;
        }
        self.verified = self.entries.len();
        true
    }

    fn verify_from(&self, start: usize) -> bool {
        let mut previous_hash = start
            .checked_sub(1)
            .and_then(|last| self.entries.get(last))
            .map(|entry| entry.entry_hash.clone());
        for (position, entry) in self.entries.iter().enumerate().skip(start) {
            if entry.index != position as u64 || entry.previous_hash != previous_hash {
                return false;
            }
            let expected_hash = compute_entry_hash(
                entry.index,
                &entry.operation_id,
                &entry.operation,
                &entry.caller,
                entry.timestamp,
                &entry.event,
                previous_hash.as_deref(),
            );
            if entry.entry_hash != expected_hash {
                return false;
            }
            previous_hash = Some(entry.entry_hash.clone());
        }
        true
    }
}

#[derive(Serialize)]
struct HashMaterial<'a> {
    index: u64,
    operation_id: &'a str,
    operation: &'a str,
    caller: &'a Address,
    timestamp: DateTime<Utc>,
    event: &'a TokenEvent,
    previous_hash: Option<&'a str>,
}

fn compute_entry_hash(
    index: u64,
    operation_id: &str,
    operation: &str,
    caller: &Address,
    timestamp: DateTime<Utc>,
    event: &TokenEvent,
    previous_hash: Option<&str>,
) -> String {
    let material = HashMaterial {
        index,
        operation_id,
        operation,
        caller,
        timestamp,
        event,
        previous_hash,
    };

    let bytes = serde_json::to_vec(&material).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_events() -> Vec<TokenEvent> {
        vec![
            TokenEvent::Mint {
                to: Address::from_low_u8(2),
                amount: 5,
            },
            TokenEvent::Transfer {
                from: Address::ZERO,
                to: Address::from_low_u8(2),
                value: 5,
            },
        ]
    }

    #[test]
    fn groups_events_under_one_operation() {
        let mut journal = EventJournal::new();
        let id = journal.record("mint", Address::from_low_u8(1), sample_events());
        journal.record("pause", Address::from_low_u8(1), vec![TokenEvent::Pause]);

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.operation(&id).len(), 2);
        assert!(journal.verify_chain());
    }

    #[test]
    fn detects_tampered_entries() {
        let mut journal = EventJournal::new();
        journal.record("mint", Address::from_low_u8(1), sample_events());

        let mut tampered = journal.clone();
        tampered.entries[1].event = TokenEvent::Transfer {
            from: Address::ZERO,
            to: Address::from_low_u8(3),
            value: 5,
        };

        assert!(!tampered.verify_chain());
    }

    #[test]
    fn incremental_verification_checks_only_new_entries() {
        let mut journal = EventJournal::new();
        journal.record("mint", Address::from_low_u8(1), sample_events());
        assert!(journal.verify_appended());
        assert_eq!(journal.verified, 2);

        journal.record("pause", Address::from_low_u8(1), vec![TokenEvent::Pause]);
        let mut tampered = journal.clone();
        tampered.entries[2].event = TokenEvent::Unpause;
        assert!(!tampered.verify_appended());
        assert_eq!(tampered.verified, 2);

        assert!(journal.verify_appended());
        assert_eq!(journal.verified, 3);

        journal.truncate(1);
        assert_eq!(journal.verified, 1);
        assert!(journal.verify_appended());
    }
}
