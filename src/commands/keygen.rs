//! Keygen command implementation

use crate::crypto::SymptomCipher;

/// A fresh base64 AES-256 key
pub fn cmd_keygen() -> String {
    SymptomCipher::generate().key_base64()
}
