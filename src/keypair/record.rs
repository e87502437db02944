//! The shared keypair record
//!
//! One well-known hash record holds the cluster's keypair as two PEM text
//! fields. The field names are part of the deployed data format; existing
//! records must keep reading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known store key for the cluster keypair record.
pub const RECORD_KEY: &str = "meta:rsa";

/// Hash field holding the public half.
pub const PUBLIC_PEM_FIELD: &str = "publicPem";

/// Hash field holding the private half.
pub const PRIVATE_PEM_FIELD: &str = "privatePem";

/// Observed state of the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Neither field present
    Absent,
    /// Exactly one field present: a crashed winner or a write in flight
    Partial,
    /// Both fields present and non-empty
    Complete,
}

/// The cluster-wide keypair record, both PEM halves as stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypairRecord {
    /// PEM-encoded RSA public key
    pub public_pem: String,
    /// PEM-encoded RSA private key
    pub private_pem: String,
}

impl KeypairRecord {
    /// Classify raw record fields.
    pub fn classify(fields: &HashMap<String, String>) -> RecordState {
        let public = field_present(fields, PUBLIC_PEM_FIELD);
        let private = field_present(fields, PRIVATE_PEM_FIELD);

        match (public, private) {
            (true, true) => RecordState::Complete,
            (false, false) => RecordState::Absent,
            _ => RecordState::Partial,
        }
    }

    /// Build a record from raw fields. Only a complete record qualifies; a
    /// partial record is the transient window callers must never observe as
    /// a keypair.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        match Self::classify(fields) {
            RecordState::Complete => Some(Self {
                public_pem: fields[PUBLIC_PEM_FIELD].clone(),
                private_pem: fields[PRIVATE_PEM_FIELD].clone(),
            }),
            _ => None,
        }
    }
}

fn field_present(fields: &HashMap<String, String>, field: &str) -> bool {
    fields.get(field).map(|v| !v.is_empty()).unwrap_or(false)
}

impl std::fmt::Debug for KeypairRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairRecord")
            .field("public_pem", &self.public_pem)
            .field("private_pem", &"<redacted>")
            .finish()
    }
}
