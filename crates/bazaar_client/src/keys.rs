//! # Cache Keys
//!
//! Deterministic, injective cache keys for marketplace reads.
//!
//! A key renders as `bazaar:{chain}:{contract}:{operation}:{params}`.
//! The params segment is canonical JSON: objects serialize with sorted
//! field names, so two structurally-equal parameter sets always produce
//! the same key no matter how the caller built them. The leading
//! segments give writes a prefix to invalidate a whole contract scope.

use std::fmt;

use alloy_primitives::Address;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Leading segment of every key, isolating this client's entries.
pub const KEY_DOMAIN: &str = "bazaar";

/// Placeholder segment for reads that are not bound to a contract.
const NO_ADDRESS: &str = "-";

/// A derived cache key for one marketplace read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    chain_id: u64,
    address: Option<Address>,
    operation: &'static str,
    params: String,
}

impl QueryKey {
    /// Derives the key for an operation against a contract scope.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] when the parameters cannot
    /// be serialized (a non-string map key, for example).
    pub fn derive<P>(
        chain_id: u64,
        address: Option<Address>,
        operation: &'static str,
        params: &P,
    ) -> ClientResult<Self>
    where
        P: Serialize + ?Sized,
    {
        // `to_value` routes maps through a sorted representation, so the
        // rendered JSON never depends on insertion order.
        let value = serde_json::to_value(params).map_err(|err| ClientError::Serialization {
            message: err.to_string(),
        })?;
        Ok(Self {
            chain_id,
            address,
            operation,
            params: value.to_string(),
        })
    }

    /// Prefix shared by every key under one contract scope.
    ///
    /// Writes invalidate by matching this prefix; the trailing colon
    /// keeps a scope from capturing keys of a longer address.
    #[must_use]
    pub fn scope_prefix(chain_id: u64, address: Address) -> String {
        format!("{KEY_DOMAIN}:{chain_id}:{address}:")
    }

    /// Chain the keyed read targets.
    #[inline]
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Contract the keyed read targets, if it is contract-bound.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        self.address
    }

    /// Name of the read operation.
    #[inline]
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Canonical JSON of the read parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &str {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KEY_DOMAIN}:{}:", self.chain_id)?;
        match self.address {
            Some(address) => write!(f, "{address}")?,
            None => f.write_str(NO_ADDRESS)?,
        }
        write!(f, ":{}:{}", self.operation, self.params)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const MARKET: Address = Address::repeat_byte(0x5a);

    #[test]
    fn test_equal_params_equal_keys() {
        let a = QueryKey::derive(1, Some(MARKET), "get_listing", &7u64).unwrap();
        let b = QueryKey::derive(1, Some(MARKET), "get_listing", &7u64).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_any_segment_changes_the_key() {
        let base = QueryKey::derive(1, Some(MARKET), "get_listing", &7u64).unwrap();
        let other_chain = QueryKey::derive(137, Some(MARKET), "get_listing", &7u64).unwrap();
        let other_contract =
            QueryKey::derive(1, Some(Address::repeat_byte(0x5b)), "get_listing", &7u64).unwrap();
        let other_op = QueryKey::derive(1, Some(MARKET), "get_winner", &7u64).unwrap();
        let other_params = QueryKey::derive(1, Some(MARKET), "get_listing", &8u64).unwrap();

        let rendered = base.to_string();
        for different in [other_chain, other_contract, other_op, other_params] {
            assert_ne!(rendered, different.to_string());
        }
    }

    #[test]
    fn test_map_insertion_order_does_not_leak() {
        let mut forward = HashMap::new();
        forward.insert("seller", 1u64);
        forward.insert("start", 2u64);
        forward.insert("count", 3u64);

        let mut backward = HashMap::new();
        backward.insert("count", 3u64);
        backward.insert("start", 2u64);
        backward.insert("seller", 1u64);

        let a = QueryKey::derive(1, Some(MARKET), "get_all", &forward).unwrap();
        let b = QueryKey::derive(1, Some(MARKET), "get_all", &backward).unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_scope_prefix_matches_only_its_scope() {
        let key = QueryKey::derive(1, Some(MARKET), "get_listing", &7u64).unwrap();
        let scope = QueryKey::scope_prefix(1, MARKET);
        assert!(key.to_string().starts_with(&scope));

        let foreign = QueryKey::scope_prefix(1, Address::repeat_byte(0x5b));
        assert!(!key.to_string().starts_with(&foreign));

        let other_chain = QueryKey::scope_prefix(137, MARKET);
        assert!(!key.to_string().starts_with(&other_chain));
    }

    #[test]
    fn test_unbound_read_renders_placeholder() {
        let key = QueryKey::derive(1, None, "get_chains", &()).unwrap();
        assert_eq!(key.to_string(), "bazaar:1:-:get_chains:null");
    }
}
