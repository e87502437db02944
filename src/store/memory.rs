//! In-memory record store
//!
//! Implements the record contract against a process-local map, for tests and
//! development. Clones share one logical record, so many "instances" can
//! race against it the way deployed instances race against Redis.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::types::Result;

use super::{RecordStore, StoreConnector};

/// Operation counters, shared by every clone of the store.
#[derive(Debug, Default)]
struct StoreStats {
    reads: AtomicU64,
    write_attempts: AtomicU64,
    writes_won: AtomicU64,
}

/// Snapshot of store statistics.
#[derive(Debug, Clone)]
pub struct StoreStatsSnapshot {
    /// Total `read_all` calls
    pub reads: u64,
    /// Total `set_field_if_absent` calls
    pub write_attempts: u64,
    /// `set_field_if_absent` calls that created their field
    pub writes_won: u64,
}

/// Cloneable in-memory implementation of the record contract.
///
/// `set_field_if_absent` holds the map lock across check and insert, so the
/// atomicity matches what Redis guarantees for `HSETNX`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<HashMap<String, String>>>,
    stats: Arc<StoreStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a field, bypassing the counters. Test setup helper.
    pub async fn seed(&self, field: &str, value: &str) {
        self.record
            .lock()
            .await
            .insert(field.to_string(), value.to_string());
    }

    /// Current contents of the record.
    pub async fn dump(&self) -> HashMap<String, String> {
        self.record.lock().await.clone()
    }

    /// Get snapshot of current stats.
    pub fn stats(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            reads: self.stats.reads.load(Ordering::Relaxed),
            write_attempts: self.stats.write_attempts.load(Ordering::Relaxed),
            writes_won: self.stats.writes_won.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_all(&mut self) -> Result<HashMap<String, String>> {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.record.lock().await.clone())
    }

    async fn set_field_if_absent(&mut self, field: &str, value: &str) -> Result<bool> {
        self.stats.write_attempts.fetch_add(1, Ordering::Relaxed);

        let mut record = self.record.lock().await;
        if record.contains_key(field) {
            return Ok(false);
        }

        record.insert(field.to_string(), value.to_string());
        self.stats.writes_won.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    type Handle = MemoryStore;

    async fn acquire(&self) -> Result<MemoryStore> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_record_reads_empty() {
        let mut store = MemoryStore::new();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_field_if_absent_first_writer_wins() {
        let mut store = MemoryStore::new();

        assert!(store.set_field_if_absent("field", "first").await.unwrap());
        assert!(!store.set_field_if_absent("field", "second").await.unwrap());

        let fields = store.read_all().await.unwrap();
        assert_eq!(fields["field"], "first");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_claims_have_one_winner() {
        let store = MemoryStore::new();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let mut instance = store.clone();
            tasks.spawn(async move {
                instance
                    .set_field_if_absent("field", &format!("value-{}", i))
                    .await
                    .unwrap()
            });
        }

        let mut winners = 0;
        while let Some(created) = tasks.join_next().await {
            if created.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.stats().writes_won, 1);
        assert_eq!(store.stats().write_attempts, 16);
    }

    #[tokio::test]
    async fn test_clones_share_the_record() {
        let store = MemoryStore::new();
        store.seed("field", "value").await;

        let mut other = store.acquire().await.unwrap();
        assert_eq!(other.read_all().await.unwrap()["field"], "value");
    }
}
