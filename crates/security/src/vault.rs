//! Ephemeral credential vault.
//!
//! Each vault owns one AES-256-GCM key generated at construction. The key is
//! never written anywhere, so ciphertext produced by one vault cannot be
//! opened by another one, including a vault created by a later process.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use thiserror::Error;

/// Vault errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("failed to generate vault key")]
    KeyGeneration,

    #[error("failed to encrypt credential")]
    Encrypt,

    #[error("ciphertext is not valid base64")]
    Encoding,

    #[error("ciphertext was not produced by this vault")]
    Decrypt,

    #[error("decrypted credential is not valid UTF-8")]
    Utf8,
}

/// Symmetric encrypt/decrypt with a process-lifetime key.
pub struct CredentialVault {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl CredentialVault {
    /// Create a vault with a freshly generated key.
    pub fn new() -> Result<Self, VaultError> {
        let rng = SystemRandom::new();
        let mut key_bytes = [0u8; 32];
        rng.fill(&mut key_bytes).map_err(|_| VaultError::KeyGeneration)?;

        let unbound =
            UnboundKey::new(&AES_256_GCM, &key_bytes).map_err(|_| VaultError::KeyGeneration)?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng,
        })
    }

    /// Encrypt a credential. The result is `base64(nonce || ciphertext || tag)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce_bytes).map_err(|_| VaultError::Encrypt)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| VaultError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(BASE64.encode(sealed))
    }

    /// Decrypt a credential produced by [`CredentialVault::encrypt`] on this vault.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, VaultError> {
        let sealed = BASE64.decode(ciphertext).map_err(|_| VaultError::Encoding)?;
        if sealed.len() < NONCE_LEN {
            return Err(VaultError::Decrypt);
        }

        let (nonce_bytes, body) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| VaultError::Decrypt)?;

        let mut in_out = body.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| VaultError::Decrypt)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| VaultError::Utf8)
    }
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let vault = CredentialVault::new().unwrap();
        for secret in ["", "hunter2", "pässwörd with spaces", "🔑"] {
            let sealed = vault.encrypt(secret).unwrap();
            assert_ne!(sealed, secret);
            assert_eq!(vault.decrypt(&sealed).unwrap(), secret);
        }
    }

    #[test]
    fn test_nonce_is_fresh_per_encryption() {
        let vault = CredentialVault::new().unwrap();
        let a = vault.encrypt("same").unwrap();
        let b = vault.encrypt("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_other_vault_cannot_decrypt() {
        let vault = CredentialVault::new().unwrap();
        let sealed = vault.encrypt("secret").unwrap();

        let fresh = CredentialVault::new().unwrap();
        assert_eq!(fresh.decrypt(&sealed), Err(VaultError::Decrypt));
    }

    #[test]
    fn test_garbage_input() {
        let vault = CredentialVault::new().unwrap();
        assert_eq!(vault.decrypt("not base64!"), Err(VaultError::Encoding));
        assert_eq!(vault.decrypt("AAAA"), Err(VaultError::Decrypt));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let vault = CredentialVault::new().unwrap();
        let sealed = vault.encrypt("secret").unwrap();
        let mut bytes = BASE64.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(vault.decrypt(&BASE64.encode(bytes)), Err(VaultError::Decrypt));
    }
}
