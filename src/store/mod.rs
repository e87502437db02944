//! Shared record store
//!
//! The keypair record lives in one well-known hash record in a shared
//! key-value store. This module defines the record contract and its two
//! implementations: Redis for production and an in-memory store for tests
//! and development.
//!
//! `set_field_if_absent` is the only point of mutual exclusion in the whole
//! system. It must be a single atomic operation at the store, never a
//! read-then-write composed by the caller.

pub mod memory;
pub mod redis;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::Result;

pub use self::memory::{MemoryStore, StoreStatsSnapshot};
pub use self::redis::{RedisConnector, RedisRecord};

/// Typed operations against the single well-known keypair record.
#[async_trait]
pub trait RecordStore: Send {
    /// Read every field of the record. A record that does not exist yet
    /// reads as an empty map, not an error.
    async fn read_all(&mut self) -> Result<HashMap<String, String>>;

    /// Atomically create `field` with `value` only if the field does not
    /// already exist. Returns true iff this call was the writer.
    async fn set_field_if_absent(&mut self, field: &str, value: &str) -> Result<bool>;
}

/// Hands out store leases.
///
/// Each `acquire` call is an independent lease, released when the returned
/// handle is dropped. Concurrent acquisitions are not serialized against
/// each other.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    type Handle: RecordStore + Send;

    /// Establish one connection to the store, bounded by the configured
    /// timeout. Fails with `StoreUnavailable`; in that case nothing was
    /// acquired and nothing is released.
    async fn acquire(&self) -> Result<Self::Handle>;
}
