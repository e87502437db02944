//! Redis connector and record handle

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::config::Args;
use crate::types::{KeyrootError, Result};

use super::{RecordStore, StoreConnector};

/// Connects to Redis and hands out per-operation record handles.
#[derive(Clone, Debug)]
pub struct RedisConnector {
    client: redis::Client,
    record_key: String,
    connect_timeout: Duration,
}

impl RedisConnector {
    /// Build a connector from configuration. No connection is made here;
    /// each lease is established per `acquire` call.
    pub fn new(args: &Args) -> Result<Self> {
        let url = args.store_url();
        info!("Using store at {}", url);

        let client = redis::Client::open(url)
            .map_err(|e| KeyrootError::Config(format!("Invalid store URL: {}", e)))?;

        Ok(Self {
            client,
            record_key: args.keypair_record_key.clone(),
            connect_timeout: Duration::from_millis(args.store_connect_timeout_ms),
        })
    }
}

#[async_trait]
impl StoreConnector for RedisConnector {
    type Handle = RedisRecord;

    async fn acquire(&self) -> Result<RedisRecord> {
        debug!("Connecting to store");

        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            KeyrootError::StoreUnavailable(format!(
                "Connection attempt timed out after {:?}",
                self.connect_timeout
            ))
        })?
        .map_err(|e| KeyrootError::StoreUnavailable(format!("Failed to connect: {}", e)))?;

        let mut handle = RedisRecord {
            conn,
            record_key: self.record_key.clone(),
        };

        // Verify the lease before handing it out
        let _: String = redis::cmd("PING")
            .query_async(&mut handle.conn)
            .await
            .map_err(|e| KeyrootError::StoreUnavailable(format!("Store ping failed: {}", e)))?;

        debug!("Store connection established");
        Ok(handle)
    }
}

/// A leased connection scoped to the well-known keypair record.
///
/// Dropping the handle releases the lease on every exit path. Release can
/// only be logged, never surfaced, so cleanup cannot mask the operation's
/// real result.
pub struct RedisRecord {
    conn: MultiplexedConnection,
    record_key: String,
}

impl RedisRecord {
    /// The record key this handle operates on.
    pub fn record_key(&self) -> &str {
        &self.record_key
    }
}

#[async_trait]
impl RecordStore for RedisRecord {
    async fn read_all(&mut self) -> Result<HashMap<String, String>> {
        let fields: HashMap<String, String> = self.conn.hgetall(&self.record_key).await?;
        Ok(fields)
    }

    async fn set_field_if_absent(&mut self, field: &str, value: &str) -> Result<bool> {
        let created: bool = self.conn.hset_nx(&self.record_key, field, value).await?;
        Ok(created)
    }
}

impl Drop for RedisRecord {
    fn drop(&mut self) {
        debug!("Store connection released");
    }
}

#[cfg(test)]
mod tests {
    // Store round-trips require a running Redis instance; the in-memory
    // store covers the record contract in-process. Connector construction
    // is testable offline.

    use super::*;
    use crate::keypair::record::RECORD_KEY;

    fn args(url: Option<&str>) -> Args {
        Args {
            redis_url: url.map(str::to_string),
            store_connect_timeout_ms: 3000,
            keypair_record_key: RECORD_KEY.to_string(),
            rsa_key_bits: 2048,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_connector_accepts_default_url() {
        assert!(RedisConnector::new(&args(None)).is_ok());
    }

    #[test]
    fn test_connector_rejects_malformed_url() {
        let err = RedisConnector::new(&args(Some("not-a-url"))).unwrap_err();
        assert!(matches!(err, KeyrootError::Config(_)));
    }
}
