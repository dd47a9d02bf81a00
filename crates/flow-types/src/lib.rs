//! Shared types for the flow-deployer workspace.
//!
//! This crate provides the value types every other crate in the workspace agrees on:
//! - [`Address`](address::Address) - 8-byte account address with hex parsing/normalization
//! - [`Aliases`](aliases::Aliases) - import location to pre-deployed address table
//! - [`Args`] - opaque, ordered program arguments

pub mod address;
pub mod aliases;

pub use address::{normalize_address, Address, AddressError, ADDRESS_HEX_DIGITS, ADDRESS_LENGTH};
pub use aliases::{AliasError, Aliases};

/// Arguments passed to a contract initializer, script or transaction.
///
/// Values are JSON-Cadence encoded and are never inspected by the resolver.
pub type Args = Vec<serde_json::Value>;
