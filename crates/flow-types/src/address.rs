//! Account address parsing and normalization.
//!
//! This module is the canonical source for address handling in the workspace.
//! Other crates should import from here rather than defining their own logic.
//!
//! Flow addresses are 8-byte values, but they're often represented in different formats:
//! - Short form: "0x1"
//! - Full form: "0x0000000000000001"
//! - Without prefix: "ee82856bf20e2aa6"
//! - Zero-padded wide form (40 hex digits), as emitted by some EVM-flavoured tooling
//!
//! All of them parse to the same [`Address`], which always renders in full form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of bytes in an account address.
pub const ADDRESS_LENGTH: usize = 8;

/// Number of hex digits in the full-form rendering (without the `0x` prefix).
pub const ADDRESS_HEX_DIGITS: usize = ADDRESS_LENGTH * 2;

/// An account address on the host chain.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The zero address, used as the target of scripts and transactions.
    pub const ZERO: Self = Self([0; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a hex address.
    ///
    /// Accepts an optional `0x`/`0X` prefix, either case and surrounding whitespace.
    /// Short inputs are left-padded with zeros. Inputs wider than
    /// [`ADDRESS_HEX_DIGITS`] are accepted only when the excess leading digits are all zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use flow_deployer_types::Address;
    ///
    /// let addr = Address::from_hex("0x2").unwrap();
    /// assert_eq!(addr.to_hex_literal(), "0x0000000000000002");
    ///
    /// let addr = Address::from_hex("EE82856BF20E2AA6").unwrap();
    /// assert_eq!(addr.to_hex(), "ee82856bf20e2aa6");
    /// ```
    pub fn from_hex(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(AddressError::Empty);
        }
        if let Some(character) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacter {
                input: input.to_string(),
                character,
            });
        }

        // Only ASCII hex digits remain, so byte offsets are char boundaries.
        let digits = if digits.len() > ADDRESS_HEX_DIGITS {
            let (excess, rest) = digits.split_at(digits.len() - ADDRESS_HEX_DIGITS);
            if !excess.bytes().all(|b| b == b'0') {
                return Err(AddressError::TooLong {
                    input: input.to_string(),
                    digits: digits.trim_start_matches('0').len(),
                });
            }
            rest
        } else {
            digits
        };

        let padded = format!("{:0>width$}", digits, width = ADDRESS_HEX_DIGITS);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|source| AddressError::InvalidHex {
            input: input.to_string(),
            source,
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Full-form lowercase hex without prefix (16 digits).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Full-form lowercase hex with the `0x` prefix.
    ///
    /// This is the form substituted into rewritten source code.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", self.to_hex())
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_literal())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Normalize an address string to lowercase full form with the `0x` prefix.
///
/// # Examples
///
/// ```
/// use flow_deployer_types::address::normalize_address;
///
/// assert_eq!(normalize_address("0xABC").unwrap(), "0x0000000000000abc");
/// assert!(normalize_address("not-hex").is_err());
/// ```
pub fn normalize_address(addr: &str) -> Result<String, AddressError> {
    Address::from_hex(addr).map(|a| a.to_hex_literal())
}

/// Errors produced while parsing an [`Address`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddressError {
    /// Nothing but an optional prefix was given.
    Empty,
    /// A character outside `[0-9a-fA-F]` was found.
    InvalidCharacter { input: String, character: char },
    /// More significant digits than fit in an address.
    TooLong { input: String, digits: usize },
    /// The hex decoder rejected the padded digits.
    InvalidHex {
        input: String,
        source: hex::FromHexError,
    },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Empty => write!(f, "empty address"),
            AddressError::InvalidCharacter { input, character } => {
                write!(f, "invalid character {:?} in address {:?}", character, input)
            }
            AddressError::TooLong { input, digits } => write!(
                f,
                "address {:?} has {} significant hex digits, at most {} allowed",
                input, digits, ADDRESS_HEX_DIGITS
            ),
            AddressError::InvalidHex { input, source } => {
                write!(f, "invalid hex address {:?}: {}", input, source)
            }
        }
    }
}

impl std::error::Error for AddressError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AddressError::InvalidHex { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_forms_are_left_padded() {
        assert_eq!(
            Address::from_hex("0x01").unwrap().to_hex_literal(),
            "0x0000000000000001"
        );
        assert_eq!(
            Address::from_hex("abc").unwrap().to_hex_literal(),
            "0x0000000000000abc"
        );
    }

    #[test]
    fn test_case_insensitive() {
        let lower = Address::from_hex("ee82856bf20e2aa6").unwrap();
        let upper = Address::from_hex("0XEE82856BF20E2AA6").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), "0xee82856bf20e2aa6");
    }

    #[test]
    fn test_wide_zero_padded_form() {
        let wide = "0x000000000000000000000000ee82856bf20e2aa6";
        assert_eq!(wide.len(), 42);
        let addr = Address::from_hex(wide).unwrap();
        assert_eq!(addr, Address::from_hex("ee82856bf20e2aa6").unwrap());
    }

    #[test]
    fn test_too_long() {
        let err = Address::from_hex("0x1ee82856bf20e2aa6").unwrap_err();
        assert!(matches!(err, AddressError::TooLong { digits: 17, .. }));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(Address::from_hex("0x").unwrap_err(), AddressError::Empty);
        assert_eq!(Address::from_hex("  ").unwrap_err(), AddressError::Empty);
        assert!(matches!(
            Address::from_hex("0xzz").unwrap_err(),
            AddressError::InvalidCharacter { character: 'z', .. }
        ));
        assert!(matches!(
            Address::from_hex("0xé1").unwrap_err(),
            AddressError::InvalidCharacter { character: 'é', .. }
        ));
    }

    #[test]
    fn test_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::from_hex("0x0").unwrap().is_zero());
        assert_eq!(Address::default(), Address::ZERO);
        assert_eq!(Address::ZERO.to_hex_literal(), "0x0000000000000000");
    }

    #[test]
    fn test_bytes_are_big_endian() {
        let addr = Address::new([0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(addr.to_hex_literal(), "0x0000000000000102");
        assert_eq!(addr.as_bytes(), &[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(Address::from(*addr.as_bytes()), addr);
        assert_eq!(Address::from_hex("0x102").unwrap(), addr);
    }

    #[test]
    fn test_serde_round_trip_uses_hex_literal() {
        let addr = Address::from_hex("0xf8d6e0586b0a20c7").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xf8d6e0586b0a20c7\"");
        let back: Address = serde_json::from_str("\"F8D6E0586B0A20C7\"").unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"0xnope\"").is_err());
    }
}
