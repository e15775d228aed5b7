//! Secret value encryption using AES-256-GCM
//!
//! Provides encryption at rest for secret values held by the in-memory
//! backend. The key never leaves this module; the broker only ever sees
//! [`EncryptedValue`] payloads.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use smarter_store::{EncryptedValue, StoreError};

/// Nonce size for AES-256-GCM (96 bits)
const NONCE_SIZE: usize = 12;

/// Key size for AES-256 (256 bits)
pub const KEY_SIZE: usize = 32;

/// Symmetric cipher for secret values.
#[derive(Clone)]
pub struct SecretCipher {
    key: [u8; KEY_SIZE],
    key_id: String,
}

impl SecretCipher {
    pub fn new(key: [u8; KEY_SIZE], key_id: impl Into<String>) -> Self {
        Self {
            key,
            key_id: key_id.into(),
        }
    }

    /// Build a cipher from a hex- or base64-encoded key string.
    pub fn from_key_str(key_str: &str, key_id: &str) -> Result<Self, StoreError> {
        Ok(Self::new(parse_key(key_str)?, key_id))
    }

    /// Generate a new random key.
    pub fn generate_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Encrypt a plaintext value.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, StoreError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| StoreError::encryption(format!("Failed to create cipher: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| StoreError::encryption(format!("Encryption failed: {e}")))?;

        Ok(EncryptedValue {
            ciphertext: BASE64.encode(&ciphertext),
            nonce: BASE64.encode(nonce_bytes),
            key_id: self.key_id.clone(),
        })
    }

    /// Decrypt a sealed value.
    pub fn decrypt(&self, value: &EncryptedValue) -> Result<String, StoreError> {
        if value.key_id != self.key_id {
            return Err(StoreError::encryption(format!(
                "Key '{}' not available (current key is '{}')",
                value.key_id, self.key_id
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| StoreError::encryption(format!("Failed to create cipher: {e}")))?;

        let ciphertext = BASE64
            .decode(&value.ciphertext)
            .map_err(|e| StoreError::encryption(format!("Invalid ciphertext base64: {e}")))?;

        let nonce_bytes = BASE64
            .decode(&value.nonce)
            .map_err(|e| StoreError::encryption(format!("Invalid nonce base64: {e}")))?;

        if nonce_bytes.len() != NONCE_SIZE {
            return Err(StoreError::encryption("Invalid nonce size"));
        }

        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|e| StoreError::encryption(format!("Decryption failed: {e}")))?;

        String::from_utf8(plaintext)
            .map_err(|e| StoreError::encryption(format!("Invalid UTF-8 in decrypted value: {e}")))
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher")
            .field("key_id", &self.key_id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Parse a key from a hex or base64 string.
fn parse_key(key_str: &str) -> Result<[u8; KEY_SIZE], StoreError> {
    // Try hex first
    if key_str.len() == KEY_SIZE * 2 {
        if let Ok(bytes) = hex::decode(key_str) {
            if bytes.len() == KEY_SIZE {
                let mut key = [0u8; KEY_SIZE];
                key.copy_from_slice(&bytes);
                return Ok(key);
            }
        }
    }

    // Try base64
    let bytes = BASE64
        .decode(key_str.trim())
        .map_err(|e| StoreError::encryption(format!("Invalid base64 key: {e}")))?;

    if bytes.len() != KEY_SIZE {
        return Err(StoreError::encryption(format!(
            "Key must be {} bytes, got {}",
            KEY_SIZE,
            bytes.len()
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = SecretCipher::new(SecretCipher::generate_key(), "test-key");
        let plaintext = "my-secret-password";

        let sealed = cipher.encrypt(plaintext).unwrap();
        assert_ne!(sealed.ciphertext, plaintext);
        assert_eq!(sealed.key_id, "test-key");

        let decrypted = cipher.decrypt(&sealed).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher1 = SecretCipher::new(SecretCipher::generate_key(), "k");
        let cipher2 = SecretCipher::new(SecretCipher::generate_key(), "k");

        let sealed = cipher1.encrypt("secret").unwrap();
        assert!(cipher2.decrypt(&sealed).is_err());
    }

    #[test]
    fn test_unknown_key_id_fails() {
        let key = SecretCipher::generate_key();
        let old = SecretCipher::new(key, "old");
        let current = SecretCipher::new(key, "current");

        let sealed = old.encrypt("secret").unwrap();
        let err = current.decrypt(&sealed).unwrap_err();
        assert!(err.to_string().contains("old"));
    }

    #[test]
    fn test_hex_key_parsing() {
        let key = SecretCipher::generate_key();
        let hex_str = hex::encode(key);
        let cipher = SecretCipher::from_key_str(&hex_str, "primary").unwrap();
        let sealed = cipher.encrypt("value").unwrap();
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "value");
    }

    #[test]
    fn test_base64_key_parsing() {
        let key = SecretCipher::generate_key();
        let b64 = BASE64.encode(key);
        assert!(SecretCipher::from_key_str(&b64, "primary").is_ok());
    }

    #[test]
    fn test_short_key_rejected() {
        let b64 = BASE64.encode([0u8; 16]);
        assert!(SecretCipher::from_key_str(&b64, "primary").is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let cipher = SecretCipher::new(SecretCipher::generate_key(), "primary");
        let rendered = format!("{cipher:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("primary"));
    }
}
