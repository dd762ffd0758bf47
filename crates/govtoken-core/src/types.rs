use crate::error::TokenError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token amounts in base units.
pub type Amount = u128;

/// Serde adapter writing an [`Amount`] as a decimal string.
///
/// Needed wherever amounts pass through an internally tagged enum, whose
/// buffered representation cannot carry integers wider than 64 bits. Plain
/// JSON integers up to `u64::MAX` are still accepted on input.
pub mod amount_string {
    use super::Amount;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer amount as a decimal string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Amount, E>
        where
            E: de::Error,
        {
            value
                .parse::<Amount>()
                .map_err(|err| E::custom(format!("invalid amount '{value}': {err}")))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Amount, E>
        where
            E: de::Error,
        {
            Ok(Amount::from(value))
        }
    }
}

/// Opaque 20-byte account identity.
///
/// The text form is `0x` followed by 40 lowercase hex digits; that form is also
/// used by serde so addresses can key JSON maps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// The null address. It never matches a caller for authorization.
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose last byte is `tag`; convenient for fixtures and demos.
    pub const fn from_low_u8(tag: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = tag;
        Self(bytes)
    }

    /// Deterministic address derived from arbitrary seed material.
    pub fn derive(seed: &[u8]) -> Self {
        let digest = blake3::hash(seed);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Fails with `InvalidAddress` for the null address.
    pub fn ensure_non_zero(self, what: &str) -> Result<Self, TokenError> {
        if self.is_zero() {
            return Err(TokenError::InvalidAddress(format!(
                "{what} must not be the zero address"
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = TokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != Self::LEN * 2 {
            return Err(TokenError::InvalidAddress(format!(
                "'{value}' must be {} hex digits",
                Self::LEN * 2
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| TokenError::InvalidAddress(format!("'{value}': {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Closed set of named roles held in the role registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Elevated role: officer assignment, burning, role transfer, destroy.
    Superuser,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Self::Superuser => "superuser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = TokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "superuser" => Ok(Self::Superuser),
            other => Err(TokenError::UnknownRole(other.to_string())),
        }
    }
}

/// The three fixed officer seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerSeat {
    Ceo,
    Cfo,
    Coo,
}

impl OfficerSeat {
    pub const ALL: [OfficerSeat; 3] = [Self::Ceo, Self::Cfo, Self::Coo];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ceo => "ceo",
            Self::Cfo => "cfo",
            Self::Coo => "coo",
        }
    }
}

impl fmt::Display for OfficerSeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OfficerSeat {
    type Err = TokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "ceo" => Ok(Self::Ceo),
            "cfo" => Ok(Self::Cfo),
            "coo" => Ok(Self::Coo),
            other => Err(TokenError::UnknownOfficerSeat(other.to_string())),
        }
    }
}

/// Immutable descriptive metadata fixed at deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}
