//! At-rest encryption of submitted symptom lists
//!
//! AES-256-GCM with a random 96-bit nonce per message. Stored layout is
//! `[12-byte nonce][ciphertext + 16-byte tag]`.

use crate::config::CryptoConfig;
use crate::error::{Error, Result};
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

pub const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Symmetric cipher for patient payloads
#[derive(Clone)]
pub struct SymptomCipher {
    key: [u8; KEY_LENGTH],
}

impl std::fmt::Debug for SymptomCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymptomCipher").finish_non_exhaustive()
    }
}

impl SymptomCipher {
    pub fn new(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Fresh random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        Self::new(key)
    }

    /// Parse a base64-encoded 32-byte key
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Crypto(format!("key is not valid base64: {}", e)))?;
        let key: [u8; KEY_LENGTH] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::Crypto(format!(
                "key must be {} bytes, got {}",
                KEY_LENGTH,
                b.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// Resolve the key from the environment variable named in `config`.
    ///
    /// An unset variable is an error unless ephemeral keys are allowed.
    pub fn from_config(config: &CryptoConfig) -> Result<Self> {
        match std::env::var(&config.key_env) {
            Ok(encoded) => Self::from_base64(&encoded),
            Err(_) if config.allow_ephemeral_key => {
                warn!(
                    "{} is not set; using an ephemeral key. Records written now cannot be decrypted after restart",
                    config.key_env
                );
                Ok(Self::generate())
            }
            Err(_) => Err(Error::Crypto(format!(
                "{} is not set. Generate a key with `symptom-checker keygen`",
                config.key_env
            ))),
        }
    }

    /// Base64 form of the key, as accepted by `from_base64`
    pub fn key_base64(&self) -> String {
        STANDARD.encode(self.key)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key))
    }

    /// Encrypt to `[nonce][ciphertext]`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(nonce, plaintext)
            .map_err(|_| Error::Crypto("encryption failed".to_string()))?;

        let mut bytes = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        bytes.extend_from_slice(&nonce_bytes);
        bytes.extend_from_slice(&ciphertext);
        Ok(bytes)
    }

    /// Decrypt bytes produced by `encrypt`
    pub fn decrypt(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(Error::Crypto("ciphertext too short".to_string()));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LENGTH);

        self.cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Crypto("decryption failed (wrong key or tampered data)".to_string()))
    }

    /// Encrypt a submitted symptom id list
    pub fn encrypt_symptoms(&self, symptom_ids: &[i64]) -> Result<Vec<u8>> {
        let plaintext = serde_json::to_vec(symptom_ids)?;
        self.encrypt(&plaintext)
    }

    /// Recover a symptom id list stored by `encrypt_symptoms`
    pub fn decrypt_symptoms(&self, bytes: &[u8]) -> Result<Vec<i64>> {
        let plaintext = self.decrypt(bytes)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_key_survives_base64() {
        let cipher = SymptomCipher::new([7u8; KEY_LENGTH]);
        let restored = SymptomCipher::from_base64(&cipher.key_base64()).unwrap();

        let sealed = cipher.encrypt_symptoms(&[3, 4]).unwrap();
        assert_eq!(restored.decrypt_symptoms(&sealed).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_symptom_round_trip() {
        let cipher = SymptomCipher::generate();
        let ids = vec![1, 2, 9, 2];
        let encrypted = cipher.encrypt_symptoms(&ids).unwrap();
        assert_eq!(cipher.decrypt_symptoms(&encrypted).unwrap(), ids);
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = SymptomCipher::generate().encrypt(b"secret").unwrap();
        assert!(matches!(
            SymptomCipher::generate().decrypt(&encrypted),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_detected() {
        let cipher = SymptomCipher::generate();
        let mut encrypted = cipher.encrypt(b"secret data").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;
        assert!(cipher.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_nonces_differ() {
        let cipher = SymptomCipher::generate();
        let a = cipher.encrypt(b"same").unwrap();
        let b = cipher.encrypt(b"same").unwrap();
        assert_ne!(a[..NONCE_LENGTH], b[..NONCE_LENGTH]);
    }

    #[test]
    fn test_too_short_rejected() {
        let cipher = SymptomCipher::generate();
        assert!(cipher.decrypt(&[0u8; 10]).is_err());
    }

    #[test]
    fn test_base64_key_round_trip() {
        let cipher = SymptomCipher::generate();
        let restored = SymptomCipher::from_base64(&cipher.key_base64()).unwrap();
        let encrypted = cipher.encrypt_symptoms(&[3, 4]).unwrap();
        assert_eq!(restored.decrypt_symptoms(&encrypted).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_bad_keys_rejected() {
        assert!(SymptomCipher::from_base64("not base64!!").is_err());
        assert!(SymptomCipher::from_base64(&STANDARD.encode([0u8; 16])).is_err());
    }

    #[test]
    fn test_missing_env_key_policy() {
        let mut config = CryptoConfig {
            key_env: "SYMPTOM_CHECKER_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            allow_ephemeral_key: false,
        };
        assert!(matches!(
            SymptomCipher::from_config(&config),
            Err(Error::Crypto(_))
        ));

        config.allow_ephemeral_key = true;
        assert!(SymptomCipher::from_config(&config).is_ok());
    }
}
