//! Keyroot - cluster-shared RSA trust root
//!
//! Provisions a single RSA keypair across any number of stateless,
//! horizontally-scaled service instances, using one well-known record in a
//! shared key-value store as the only coordination mechanism. On top of the
//! resolved keypair it exposes envelope-encryption and origin-authentication
//! primitives for the embedding service layer.
//!
//! ## Services
//!
//! - **Store**: leased store connections and the atomic record contract
//!   (`HGETALL` / `HSETNX`), with an in-memory implementation for tests
//! - **Provisioner**: read-or-create-then-reread convergence onto exactly
//!   one keypair, with an in-process resolve-once cache
//! - **Crypto**: keyed encrypt/decrypt operations with optional explicit
//!   keys, defaulting to the provisioned keypair

pub mod config;
pub mod crypto;
pub mod keypair;
pub mod logging;
pub mod store;
pub mod types;

pub use config::Args;
pub use crypto::{CryptoService, PrivateKey, PublicKey};
pub use keypair::{KeypairProvisioner, KeypairRecord, RecordState, ResolvedKeypair};
pub use store::{MemoryStore, RecordStore, RedisConnector, StoreConnector};
pub use types::{KeyrootError, Result};
