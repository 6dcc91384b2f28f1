//! Cryptor configuration

use fieldcrypt_crypto::{AeadCipher, KdfParams};
use serde::{Deserialize, Serialize};

/// Tuning knobs shared by every call of a [`crate::FieldCryptor`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptConfig {
    /// AEAD cipher used when sealing leaves
    pub cipher: AeadCipher,
    /// Argon2id parameters used when deriving password keys
    pub kdf: KdfParams,
    /// Most expensive Argon2id parameters accepted from a ciphertext header
    ///
    /// Never admits more than [`KdfParams::hard_limit`]; `kdf` is always admitted.
    pub kdf_limit: KdfParams,
    /// Maximum number of leaves transformed at once
    pub max_concurrency: usize,
}

impl Default for CryptConfig {
    fn default() -> Self {
        Self {
            cipher: AeadCipher::default(),
            kdf: KdfParams::default(),
            kdf_limit: KdfParams::hard_limit(),
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl CryptConfig {
    /// Set the AEAD cipher
    pub fn with_cipher(mut self, cipher: AeadCipher) -> Self {
        self.cipher = cipher;
        self
    }

    /// Set the Argon2id parameters
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Cap the Argon2id parameters accepted when decrypting
    pub fn with_kdf_limit(mut self, kdf_limit: KdfParams) -> Self {
        self.kdf_limit = kdf_limit;
        self
    }

    /// Parameters a password header may ask for before it is refused
    pub fn decrypt_ceiling(&self) -> KdfParams {
        self.kdf_limit.max_with(self.kdf)
    }

    /// Set the concurrency limit (values below 1 are treated as 1)
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}
