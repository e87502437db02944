//! Crypto service
//!
//! The keyed operations exposed to the embedding service layer. Every
//! operation takes an optional explicit key; `None` means the provisioned
//! cluster keypair, resolved through the provisioner's memoized cache.
//! Explicit keys never touch the store.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::keypair::KeypairProvisioner;
use crate::store::StoreConnector;
use crate::types::{KeyrootError, Result};

use super::keys::{PrivateKey, PublicKey};

/// Keyed operations over the shared cluster keypair.
pub struct CryptoService<C: StoreConnector> {
    provisioner: Arc<KeypairProvisioner<C>>,
}

impl<C: StoreConnector> CryptoService<C> {
    pub fn new(provisioner: Arc<KeypairProvisioner<C>>) -> Self {
        Self { provisioner }
    }

    /// Encrypt for the holder of the matching private key. Returns base64
    /// ciphertext safe for transport.
    pub async fn encrypt_with_public(
        &self,
        plaintext: &[u8],
        key: Option<&PublicKey>,
    ) -> Result<String> {
        let ciphertext = match key {
            Some(key) => key.encrypt_oaep(plaintext)?,
            None => {
                self.provisioner
                    .resolve()
                    .await?
                    .public
                    .encrypt_oaep(plaintext)?
            }
        };

        Ok(BASE64.encode(ciphertext))
    }

    /// Recover the plaintext of an envelope produced by
    /// `encrypt_with_public`.
    pub async fn decrypt_with_private(
        &self,
        ciphertext: &str,
        key: Option<&PrivateKey>,
    ) -> Result<Vec<u8>> {
        let raw = BASE64.decode(ciphertext.trim()).map_err(|e| {
            KeyrootError::DecryptionFailed(format!("Ciphertext is not valid base64: {}", e))
        })?;

        match key {
            Some(key) => key.decrypt_oaep(&raw),
            None => self.provisioner.resolve().await?.private.decrypt_oaep(&raw),
        }
    }

    /// Produce a base64 token anyone holding the public key can invert,
    /// proving this instance's private key produced it. Origin
    /// authentication, not confidentiality.
    pub async fn encrypt_with_private(
        &self,
        content: &[u8],
        key: Option<&PrivateKey>,
    ) -> Result<String> {
        let token = match key {
            Some(key) => key.encrypt_raw(content)?,
            None => self.provisioner.resolve().await?.private.encrypt_raw(content)?,
        };

        Ok(BASE64.encode(token))
    }

    /// Recover the content of a token produced by `encrypt_with_private`,
    /// verifying it came from the matching private key.
    pub async fn decrypt_with_public(
        &self,
        token: &str,
        key: Option<&PublicKey>,
    ) -> Result<Vec<u8>> {
        let raw = BASE64.decode(token.trim()).map_err(|e| {
            KeyrootError::VerificationFailed(format!("Token is not valid base64: {}", e))
        })?;

        match key {
            Some(key) => key.decrypt_raw(&raw),
            None => self.provisioner.resolve().await?.public.decrypt_raw(&raw),
        }
    }

    /// Serialize a public key as PEM text for distribution to services that
    /// must verify tokens.
    pub async fn export_public_pem(&self, key: Option<&PublicKey>) -> Result<String> {
        match key {
            Some(key) => key.to_pem(),
            None => self.provisioner.resolve().await?.public.to_pem(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::LocalKeypair;
    use crate::store::MemoryStore;

    fn service(store: &MemoryStore) -> CryptoService<MemoryStore> {
        CryptoService::new(Arc::new(KeypairProvisioner::new(store.clone(), 2048)))
    }

    #[tokio::test]
    async fn test_envelope_round_trip_with_default_keys() {
        let service = service(&MemoryStore::new());

        let ciphertext = service
            .encrypt_with_public(b"attack at dawn", None)
            .await
            .unwrap();
        let plaintext = service
            .decrypt_with_private(&ciphertext, None)
            .await
            .unwrap();

        assert_eq!(plaintext, b"attack at dawn");
    }

    #[tokio::test]
    async fn test_token_round_trip_with_default_keys() {
        let service = service(&MemoryStore::new());

        let token = service.encrypt_with_private(b"issued", None).await.unwrap();
        let content = service.decrypt_with_public(&token, None).await.unwrap();

        assert_eq!(content, b"issued");
    }

    #[tokio::test]
    async fn test_foreign_token_fails_verification() {
        let service = service(&MemoryStore::new());

        let foreign = LocalKeypair::generate(2048).unwrap();
        let foreign_key = PrivateKey::from_pem(&foreign.private_pem).unwrap();
        let token = service
            .encrypt_with_private(b"forged", Some(&foreign_key))
            .await
            .unwrap();

        let err = service.decrypt_with_public(&token, None).await.unwrap_err();
        assert!(matches!(err, KeyrootError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_garbage_ciphertext_fails_decryption() {
        let service = service(&MemoryStore::new());

        let err = service
            .decrypt_with_private("not base64!!", None)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyrootError::DecryptionFailed(_)));

        let err = service
            .decrypt_with_private(&BASE64.encode(b"random bytes"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyrootError::DecryptionFailed(_)));
    }

    #[tokio::test]
    async fn test_explicit_keys_bypass_the_store() {
        let store = MemoryStore::new();
        let service = service(&store);

        let keypair = LocalKeypair::generate(2048).unwrap();
        let public = PublicKey::from_pem(&keypair.public_pem).unwrap();
        let private = PrivateKey::from_pem(&keypair.private_pem).unwrap();

        let ciphertext = service
            .encrypt_with_public(b"direct", Some(&public))
            .await
            .unwrap();
        let plaintext = service
            .decrypt_with_private(&ciphertext, Some(&private))
            .await
            .unwrap();
        assert_eq!(plaintext, b"direct");

        let pem = service.export_public_pem(Some(&public)).await.unwrap();
        assert_eq!(pem, keypair.public_pem);

        let stats = store.stats();
        assert_eq!(stats.reads, 0);
        assert_eq!(stats.write_attempts, 0);
    }

    #[tokio::test]
    async fn test_exported_pem_matches_the_stored_record() {
        let store = MemoryStore::new();
        let service = service(&store);

        let pem = service.export_public_pem(None).await.unwrap();

        let fields = store.dump().await;
        assert_eq!(pem, fields[crate::keypair::record::PUBLIC_PEM_FIELD]);
    }

    #[tokio::test]
    async fn test_operations_share_one_resolution() {
        let store = MemoryStore::new();
        let service = service(&store);

        service.encrypt_with_public(b"one", None).await.unwrap();
        let reads_after_first = store.stats().reads;

        service.encrypt_with_private(b"two", None).await.unwrap();
        service.export_public_pem(None).await.unwrap();
        assert_eq!(store.stats().reads, reads_after_first);
    }
}
