//! Alias table: import locations bound to contracts that are already on chain.
//!
//! Aliases are how a project imports contracts it does not deploy itself, such as
//! the standard token interfaces. The table is keyed by the import location exactly
//! as it appears in source; addresses are validated on insertion so that resolution
//! never sees malformed hex.
//!
//! The serialized form is a JSON object of `location -> hex address`:
//!
//! ```
//! use flow_deployer_types::Aliases;
//!
//! let aliases = Aliases::from_json_str(r#"{"FungibleToken": "EE82856BF20E2AA6"}"#).unwrap();
//! assert_eq!(
//!     aliases.get("FungibleToken").unwrap().to_hex_literal(),
//!     "0xee82856bf20e2aa6"
//! );
//! ```

use crate::address::{Address, AddressError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from import location to a pre-deployed account address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aliases {
    entries: BTreeMap<String, Address>,
}

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(location, hex address)` pairs, rejecting the first bad address.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, AliasError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut aliases = Self::new();
        for (location, address) in pairs {
            aliases.insert(location, address.as_ref())?;
        }
        Ok(aliases)
    }

    /// Parse a JSON object of `location -> hex address`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Insert an alias from its hex form. Returns the address previously bound to the location.
    pub fn insert(
        &mut self,
        location: impl Into<String>,
        address: &str,
    ) -> Result<Option<Address>, AliasError> {
        let location = location.into();
        let parsed = Address::from_hex(address).map_err(|source| AliasError {
            location: location.clone(),
            source,
        })?;
        Ok(self.entries.insert(location, parsed))
    }

    pub fn get(&self, location: &str) -> Option<Address> {
        self.entries.get(location).copied()
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in location order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Serialize for Aliases {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v.to_hex())))
    }
}

impl<'de> Deserialize<'de> for Aliases {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Self::try_from_pairs(raw).map_err(D::Error::custom)
    }
}

/// An alias whose address did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasError {
    pub location: String,
    pub source: AddressError,
}

impl fmt::Display for AliasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alias for {:?}: {}", self.location, self.source)
    }
}

impl std::error::Error for AliasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut aliases = Aliases::new();
        assert!(aliases.is_empty());

        let previous = aliases.insert("FungibleToken", "ee82856bf20e2aa6").unwrap();
        assert!(previous.is_none());
        assert!(aliases.contains("FungibleToken"));
        assert!(!aliases.contains("fungibletoken"));
        assert_eq!(
            aliases.get("FungibleToken").unwrap().to_hex(),
            "ee82856bf20e2aa6"
        );

        let previous = aliases.insert("FungibleToken", "0x9a0766d93b6608b7").unwrap();
        assert_eq!(previous, Some(Address::from_hex("ee82856bf20e2aa6").unwrap()));
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut aliases = Aliases::new();
        let err = aliases.insert("NonFungibleToken", "0xnothex").unwrap_err();
        assert_eq!(err.location, "NonFungibleToken");
        assert!(err.to_string().contains("NonFungibleToken"));
        assert!(aliases.is_empty());
    }

    #[test]
    fn test_json_round_trip_is_canonical() {
        let aliases = Aliases::from_json_str(
            r#"{"FlowToken": "0x7E60DF042A9C0868", "FungibleToken": "9a0766d93b6608b7"}"#,
        )
        .unwrap();
        assert_eq!(aliases.len(), 2);

        let json = serde_json::to_string(&aliases).unwrap();
        assert_eq!(
            json,
            r#"{"FlowToken":"7e60df042a9c0868","FungibleToken":"9a0766d93b6608b7"}"#
        );
    }

    #[test]
    fn test_json_with_bad_address_fails() {
        let err = Aliases::from_json_str(r#"{"Foo": "0x12345678901234567"}"#).unwrap_err();
        assert!(err.to_string().contains("Foo"));
    }

    #[test]
    fn test_iter_is_location_ordered() {
        let aliases = Aliases::try_from_pairs([("b", "0x2"), ("a", "0x1")]).unwrap();
        let locations: Vec<_> = aliases.iter().map(|(loc, _)| loc).collect();
        assert_eq!(locations, vec!["a", "b"]);
    }
}
