//! Configuration for Keyroot
//!
//! Environment variable and CLI argument handling using clap. The struct is
//! meant to be `#[command(flatten)]`-ed into an embedding service's own
//! argument parser; `Args::from_env` covers callers without a CLI.

use clap::Parser;

use crate::keypair::record::RECORD_KEY;

/// Store URL used when `REDIS_URL` is unset or blank.
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";

/// Keyroot - cluster-shared RSA trust root
#[derive(Parser, Debug, Clone)]
#[command(name = "keyroot")]
#[command(about = "Cluster-shared RSA trust root backed by a shared key-value store")]
pub struct Args {
    /// Store connection URL; unset or blank means a local default instance
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Store connection timeout in milliseconds
    #[arg(long, env = "STORE_CONNECT_TIMEOUT_MS", default_value = "3000")]
    pub store_connect_timeout_ms: u64,

    /// Well-known record key holding the shared keypair
    #[arg(long, env = "KEYPAIR_RECORD_KEY", default_value = RECORD_KEY)]
    pub keypair_record_key: String,

    /// RSA modulus size in bits for locally generated candidates
    #[arg(long, env = "RSA_KEY_BITS", default_value = "2048")]
    pub rsa_key_bits: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Load configuration from the environment only (no CLI arguments),
    /// reading a `.env` file first if one is present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse_from(["keyroot"])
    }

    /// Get the effective store URL (falls back to the local default when the
    /// configured URL is unset or blank)
    pub fn store_url(&self) -> &str {
        match self.redis_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_STORE_URL,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rsa_key_bits < 2048 {
            return Err("RSA_KEY_BITS must be at least 2048".to_string());
        }

        if self.keypair_record_key.trim().is_empty() {
            return Err("KEYPAIR_RECORD_KEY must not be empty".to_string());
        }

        Ok(())
    }
}
