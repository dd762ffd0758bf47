use crate::types::{amount_string, Address, Amount, OfficerSeat, Role};
use serde::{Deserialize, Serialize};

/// Observable effect of a committed operation.
///
/// Events are emitted after the state change they describe, in mutation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "amount_string")]
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "amount_string")]
        value: Amount,
    },
    Mint {
        to: Address,
        #[serde(with = "amount_string")]
        amount: Amount,
    },
    MintFinished,
    Burn {
        burner: Address,
        #[serde(with = "amount_string")]
        value: Amount,
    },
    Pause,
    Unpause,
    RoleAdded {
        operator: Address,
        role: Role,
    },
    RoleRemoved {
        operator: Address,
        role: Role,
    },
    OfficerAssigned {
        seat: OfficerSeat,
        previous: Address,
        new: Address,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    Destroyed {
        recipient: Address,
        #[serde(with = "amount_string")]
        swept: Amount,
    },
}

impl TokenEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Approval { .. } => "approval",
            Self::Mint { .. } => "mint",
            Self::MintFinished => "mint_finished",
            Self::Burn { .. } => "burn",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::RoleAdded { .. } => "role_added",
            Self::RoleRemoved { .. } => "role_removed",
            Self::OfficerAssigned { .. } => "officer_assigned",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::Destroyed { .. } => "destroyed",
        }
    }
}

/// Per-operation event buffer.
///
/// Components push into the buffer while an operation runs; the buffer only
/// reaches the journal when the whole operation succeeds.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<TokenEvent>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: TokenEvent) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[TokenEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_vec(self) -> Vec<TokenEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_in_snake_case() {
        let json = serde_json::to_string(&TokenEvent::Transfer {
            from: Address::ZERO,
            to: Address::from_low_u8(1),
            value: 10,
        })
        .unwrap();
        assert!(json.contains(r#""event":"transfer""#));

        let json = serde_json::to_string(&TokenEvent::MintFinished).unwrap();
        assert_eq!(json, r#"{"event":"mint_finished"}"#);
    }

    #[test]
    fn full_width_amounts_read_back() {
        let events = vec![
            TokenEvent::Approval {
                owner: Address::from_low_u8(1),
                spender: Address::from_low_u8(2),
                value: Amount::MAX,
            },
            TokenEvent::Mint {
                to: Address::from_low_u8(3),
                amount: Amount::MAX,
            },
            TokenEvent::Destroyed {
                recipient: Address::from_low_u8(4),
                swept: u128::from(u64::MAX) + 1,
            },
        ];

        let json = serde_json::to_string(&events).unwrap();
        assert!(json.contains(&format!(r#""value":"{}""#, Amount::MAX)));
        let decoded: Vec<TokenEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, events);
    }

    #[test]
    fn small_integer_amounts_are_accepted() {
        let decoded: TokenEvent =
            serde_json::from_str(r#"{"event":"burn","burner":"0x0000000000000000000000000000000000000001","value":25}"#)
                .unwrap();
        assert_eq!(
            decoded,
            TokenEvent::Burn {
                burner: Address::from_low_u8(1),
                value: 25
            }
        );
    }

    #[test]
    fn buffer_preserves_emission_order() {
        let mut buffer = EventBuffer::new();
        buffer.emit(TokenEvent::Pause);
        buffer.emit(TokenEvent::Unpause);
        let names: Vec<_> = buffer.as_slice().iter().map(TokenEvent::name).collect();
        assert_eq!(names, vec!["pause", "unpause"]);
    }
}
