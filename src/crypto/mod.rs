//! Cryptographic operations on the shared keypair
//!
//! # Primitives
//!
//! - **Envelope encryption**: RSA-OAEP encrypt with the public key, decrypt
//!   with the private key. Confidentiality.
//! - **Origin authentication**: raw RSA transform (PKCS#1 v1.5 padding, no
//!   digest) encrypt with the private key, decrypt with the public key.
//!   Anyone holding the public key can recover the content and thereby prove
//!   it came from the private-key holder. Weaker than a real signature
//!   scheme; preserved for compatibility with existing token consumers.
//!
//! Every operation defaults to the provisioned cluster keypair and accepts
//! an explicit key override.

pub mod keys;
pub mod service;

pub use keys::{LocalKeypair, PrivateKey, PublicKey, MIN_KEY_BITS};
pub use service::CryptoService;
