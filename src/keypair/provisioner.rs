//! Keypair provisioning
//!
//! Any number of instances may race to initialize the shared record. The
//! store's create-if-absent primitive arbitrates: one writer wins, every
//! other instance discards its candidate and converges on the winner's
//! keypair. A record observed with only one half populated is an
//! inconsistency this module reports and never papers over.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::crypto::keys::{LocalKeypair, PrivateKey, PublicKey};
use crate::store::{RecordStore, StoreConnector};
use crate::types::{KeyrootError, Result};

use super::record::{KeypairRecord, PRIVATE_PEM_FIELD, PUBLIC_PEM_FIELD};

/// A valid keypair parsed out of the shared record.
///
/// Never mutated after construction; shared read-only once memoized.
#[derive(Debug)]
pub struct ResolvedKeypair {
    /// Parsed public half
    pub public: PublicKey,
    /// Parsed private half
    pub private: PrivateKey,
    /// The record the keys were parsed from
    pub record: KeypairRecord,
}

impl ResolvedKeypair {
    /// Parse a complete record into key objects.
    pub fn from_record(record: KeypairRecord) -> Result<Self> {
        let public = PublicKey::from_pem(&record.public_pem)?;
        let private = PrivateKey::from_pem(&record.private_pem)?;

        Ok(Self {
            public,
            private,
            record,
        })
    }
}

/// Converges the cluster onto a single shared keypair.
pub struct KeypairProvisioner<C: StoreConnector> {
    connector: C,
    key_bits: u32,
    resolved: OnceCell<Arc<ResolvedKeypair>>,
}

impl<C: StoreConnector> KeypairProvisioner<C> {
    pub fn new(connector: C, key_bits: u32) -> Self {
        Self {
            connector,
            key_bits,
            resolved: OnceCell::new(),
        }
    }

    /// The resolved cluster keypair, memoized per instance.
    ///
    /// Concurrent first callers share a single in-flight `provision`; later
    /// callers take the cached value with no store round-trip. A failed
    /// resolution leaves the cell empty so the next caller tries again.
    pub async fn resolve(&self) -> Result<Arc<ResolvedKeypair>> {
        self.resolved
            .get_or_try_init(|| async {
                let record = self.provision().await?;
                Ok(Arc::new(ResolvedKeypair::from_record(record)?))
            })
            .await
            .map(Arc::clone)
    }

    /// Run the convergence protocol against the shared record.
    ///
    /// Always talks to the store; `resolve` is the memoized entry point.
    /// Acquires one store lease for the whole pass.
    pub async fn provision(&self) -> Result<KeypairRecord> {
        let mut store = self.connector.acquire().await?;

        let existing = store.read_all().await?;
        if let Some(record) = KeypairRecord::from_fields(&existing) {
            debug!("Shared keypair already present");
            return Ok(record);
        }

        warn!(
            state = ?KeypairRecord::classify(&existing),
            "No usable keypair record; generating a local candidate"
        );
        let candidate = self.generate_candidate().await?;

        if store
            .set_field_if_absent(PUBLIC_PEM_FIELD, &candidate.public_pem)
            .await?
        {
            if store
                .set_field_if_absent(PRIVATE_PEM_FIELD, &candidate.private_pem)
                .await?
            {
                info!("Stored new cluster keypair");
            } else {
                error!(
                    "Claimed the public field but the private field was already taken; \
                     the stored record can no longer be trusted"
                );
                return Err(KeyrootError::ProvisioningConflict(
                    "public field claimed but private field lost".to_string(),
                ));
            }
        } else {
            warn!("Another instance claimed the keypair record; discarding local candidate");
        }

        let fields = store.read_all().await?;
        KeypairRecord::from_fields(&fields).ok_or_else(|| {
            KeyrootError::ProvisioningIncomplete(format!(
                "record is {:?} after provisioning pass",
                KeypairRecord::classify(&fields)
            ))
        })
    }

    /// Generate a provisional keypair off the event loop.
    async fn generate_candidate(&self) -> Result<LocalKeypair> {
        let bits = self.key_bits;

        tokio::task::spawn_blocking(move || LocalKeypair::generate(bits))
            .await
            .map_err(|e| KeyrootError::Internal(format!("Key generation task failed: {}", e)))?
    }
}
