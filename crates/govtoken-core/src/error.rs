use crate::types::{Address, Amount};
use thiserror::Error;

/// Typed failure for every guarded token operation.
///
/// A returned error means the operation committed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unauthorized: {caller} does not satisfy {capability}")]
    Unauthorized {
        caller: Address,
        capability: String,
    },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("contract is paused")]
    ContractPaused,

    #[error("contract is already paused")]
    AlreadyPaused,

    #[error("contract is not paused")]
    NotPaused,

    #[error("minting is finished")]
    MintingFinished,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("contract has been destroyed")]
    ContractDestroyed,

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown officer seat '{0}'")]
    UnknownOfficerSeat(String),
}

impl TokenError {
    pub fn unauthorized(caller: Address, capability: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller,
            capability: capability.into(),
        }
    }

    /// Stable snake_case code for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidAddress(_) => "invalid_address",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::ContractPaused => "contract_paused",
            Self::AlreadyPaused => "already_paused",
            Self::NotPaused => "not_paused",
            Self::MintingFinished => "minting_finished",
            Self::ArithmeticOverflow => "arithmetic_overflow",
            Self::ArithmeticUnderflow => "arithmetic_underflow",
            Self::ContractDestroyed => "contract_destroyed",
            Self::UnknownRole(_) => "unknown_role",
            Self::UnknownOfficerSeat(_) => "unknown_officer_seat",
        }
    }
}

pub(crate) fn checked_add(lhs: Amount, rhs: Amount) -> Result<Amount, TokenError> {
    lhs.checked_add(rhs).ok_or(TokenError::ArithmeticOverflow)
}

pub(crate) fn checked_sub(lhs: Amount, rhs: Amount) -> Result<Amount, TokenError> {
    lhs.checked_sub(rhs).ok_or(TokenError::ArithmeticUnderflow)
}
