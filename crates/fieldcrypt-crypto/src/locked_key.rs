//! Passphrase-locked private keys
//!
//! A secret key is stored as base64 text of
//! `01 | 03 | cipher | m_cost | t_cost | p_cost | salt[16] | nonce[12] | aead(secret[32])`,
//! so the passphrase is the only other input needed to unlock it.

use crate::{
    frame::{self, Reader, SealKind},
    kdf::{self, KdfParams, Salt, SALT_SIZE},
    keys::{SecretKey, NONCE_SIZE},
    symmetric::{Aead, AeadCipher, Nonce},
    CryptoError,
    Result,
};
use base64::Engine;

/// Text form of a passphrase-locked X25519 secret key
pub struct LockedSecretKey;

impl LockedSecretKey {
    /// Lock a secret key under a passphrase
    pub fn lock(secret: &SecretKey, passphrase: &str, params: &KdfParams) -> Result<String> {
        let cipher = AeadCipher::default();
        let salt = Salt::generate();
        let mut out = Vec::new();
        frame::write_prefix(&mut out, SealKind::LockedKey, cipher);
        frame::write_kdf_params(&mut out, params);
        out.extend_from_slice(salt.as_bytes());

        let key = kdf::derive_key(passphrase.as_bytes(), &salt, params)?;
        let nonce = Nonce::generate();
        let ciphertext = Aead::new(&key, cipher).encrypt_with_aad(&nonce, secret.as_bytes(), &out)?;
        out.extend_from_slice(nonce.as_bytes());
        out.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(out))
    }

    /// Unlock a secret key; a wrong passphrase yields [`CryptoError::KeyUnlock`]
    pub fn unlock(text: &str, passphrase: &str) -> Result<SecretKey> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("private key is not base64: {e}")))?;

        let mut reader = Reader::new(&bytes);
        let cipher = reader
            .expect_prefix(SealKind::LockedKey)
            .map_err(|e| CryptoError::InvalidKey(format!("not a locked private key: {e}")))?;
        let params = reader.kdf_params().map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let salt = Salt::from_bytes(reader.take(SALT_SIZE)?)?;
        let header = reader.consumed();
        let nonce = Nonce::from_bytes(reader.take(NONCE_SIZE)?)?;
        let ciphertext = reader.rest();

        let key = kdf::derive_key(passphrase.as_bytes(), &salt, &params)?;
        let secret = Aead::new(&key, cipher)
            .decrypt_with_aad(&nonce, ciphertext, header)
            .map_err(|_| CryptoError::KeyUnlock("wrong passphrase or corrupted key".to_string()))?;
        SecretKey::from_bytes(&secret)
    }
}
