#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors returned by fallible table operations.
pub mod error;

/// A HashMap over the open-addressing engine.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with pluggable hash strategies.
pub mod hash_map;

/// A HashSet over the open-addressing engine.
///
/// This module provides a `HashSet` that wraps the `HashTable` in set mode,
/// storing no values.
pub mod hash_set;

/// The open-addressing engine shared by [`HashMap`](crate::HashMap) and
/// [`HashSet`](crate::HashSet).
///
/// Keys live in a power-of-two array of slots and are found by linear probing
/// from `hash & (capacity - 1)`. Removal never leaves tombstones: entries that
/// follow the freed slot in the same cluster are shifted back into the gap.
/// Set mode is the same engine with `V = ()`, whose value array occupies no
/// memory.
pub mod hash_table;

/// Maps and sets keyed by object identity.
///
/// Keys are compared by the address they refer to, so two keys whose values
/// compare equal are still distinct entries unless they point at the same
/// object. See [`Identity`] for the address contract.
pub mod identity;

/// Growth policy configuration.
pub mod load_factor;

/// Pluggable hash and equality policies.
///
/// A [`HashStrategy`] decides how keys are hashed and compared. The table
/// caches the hash of every stored key, so a strategy is consulted only to
/// hash a probe key and to compare it against stored keys whose cached hash
/// matches.
pub mod strategy;

pub use error::Error;
pub use error::Result;
#[cfg(any(feature = "std", feature = "foldhash"))]
pub use hash_map::DefaultHashMap;
pub use hash_map::Entry;
pub use hash_map::HashMap;
#[cfg(any(feature = "std", feature = "foldhash"))]
pub use hash_set::DefaultHashSet;
pub use hash_set::HashSet;
#[cfg(feature = "stats")]
pub use hash_table::ProbeStats;
pub use hash_table::HashTable;
pub use identity::IdentityMap;
pub use identity::IdentitySet;
pub use load_factor::LoadFactor;
#[cfg(any(feature = "std", feature = "foldhash"))]
pub use strategy::DefaultHashBuilder;
pub use strategy::HashStrategy;
pub use strategy::Identity;
pub use strategy::IdentityKey;
pub use strategy::Natural;
