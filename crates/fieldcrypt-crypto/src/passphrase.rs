//! Password-based sealing
//!
//! Layout: `01 | 01 | cipher | m_cost | t_cost | p_cost | salt[16] | nonce[12] | aead(ct)`.
//! The KDF parameters and salt travel with the ciphertext so only the
//! passphrase is needed to open it.

use crate::{
    frame::{self, Reader, SealKind},
    kdf::{self, KdfParams, Salt, SALT_SIZE},
    keys::{DekKey, NONCE_SIZE},
    symmetric::{Aead, AeadCipher, Nonce},
    CryptoError,
    Result,
};
use dashmap::DashMap;
use tracing::trace;
use zeroize::Zeroizing;

/// Seals and opens values under one passphrase
///
/// One salt is drawn per instance, so every value sealed by the same
/// instance shares a single Argon2id derivation. Keys derived while
/// opening are cached by `(salt, params)`, which makes opening many values
/// produced by one sealing call cost one derivation as well.
pub struct PassphraseCipher {
    passphrase: Zeroizing<Vec<u8>>,
    params: KdfParams,
    cipher: AeadCipher,
    salt: Salt,
    limit: KdfParams,
    keys: DashMap<(Salt, KdfParams), DekKey>,
}

impl PassphraseCipher {
    /// Create with default Argon2id parameters and AES-256-GCM
    pub fn new(passphrase: impl AsRef<[u8]>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.as_ref().to_vec()),
            params: KdfParams::default(),
            cipher: AeadCipher::default(),
            salt: Salt::generate(),
            limit: KdfParams::hard_limit(),
            keys: DashMap::new(),
        }
    }

    /// Set the Argon2id parameters used when sealing
    pub fn with_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    /// Set the AEAD cipher used when sealing
    pub fn with_cipher(mut self, cipher: AeadCipher) -> Self {
        self.cipher = cipher;
        self
    }

    /// Cap the Argon2id parameters accepted from headers when opening
    ///
    /// The cap can only tighten [`KdfParams::hard_limit`], never lift it.
    pub fn with_limit(mut self, limit: KdfParams) -> Self {
        self.limit = limit;
        self
    }

    /// Number of distinct keys derived so far
    pub fn derived_key_count(&self) -> usize {
        self.keys.len()
    }

    fn key_for(&self, salt: Salt, params: KdfParams) -> Result<DekKey> {
        let entry = self
            .keys
            .entry((salt, params))
            .or_try_insert_with(|| {
                trace!(?params, "deriving password key");
                kdf::derive_key(&self.passphrase, &salt, &params)
            })?;
        Ok(entry.value().clone())
    }

    /// Seal a plaintext
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(31 + NONCE_SIZE + plaintext.len() + 16);
        frame::write_prefix(&mut out, SealKind::Password, self.cipher);
        frame::write_kdf_params(&mut out, &self.params);
        out.extend_from_slice(self.salt.as_bytes());

        let key = self.key_for(self.salt, self.params)?;
        let nonce = Nonce::generate();
        let ciphertext = Aead::new(&key, self.cipher).encrypt_with_aad(&nonce, plaintext, &out)?;

        out.extend_from_slice(nonce.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Open a value sealed under the same passphrase
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        let mut reader = Reader::new(sealed);
        let cipher = reader.expect_prefix(SealKind::Password)?;
        let params = reader.kdf_params()?;
        params.check_within(&self.limit)?;
        let salt = Salt::from_bytes(reader.take(SALT_SIZE)?)?;
        let header = reader.consumed();
        let nonce = Nonce::from_bytes(reader.take(NONCE_SIZE)?)?;
        let ciphertext = reader.rest();

        let key = self.key_for(salt, params)?;
        Aead::new(&key, cipher)
            .decrypt_with_aad(&nonce, ciphertext, header)
            .map_err(|_| {
                CryptoError::Decryption("wrong password or corrupted ciphertext".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cipher(passphrase: &str) -> PassphraseCipher {
        PassphraseCipher::new(passphrase).with_params(KdfParams::new(256, 1, 1))
    }

    #[test]
    fn test_roundtrip() {
        let c = cipher("thats my kung fu");
        let sealed = c.encrypt(b"\"order103\"").unwrap();
        assert_eq!(c.decrypt(&sealed).unwrap(), b"\"order103\"");
    }

    #[test]
    fn test_roundtrip_with_fresh_instance() {
        let sealed = cipher("pw").encrypt(b"value").unwrap();
        assert_eq!(cipher("pw").decrypt(&sealed).unwrap(), b"value");
    }

    #[test]
    fn test_chacha_roundtrip() {
        let c = cipher("pw").with_cipher(AeadCipher::ChaCha20Poly1305);
        let sealed = c.encrypt(b"value").unwrap();
        assert_eq!(sealed[2], AeadCipher::ChaCha20Poly1305.to_byte());
        assert_eq!(cipher("pw").decrypt(&sealed).unwrap(), b"value");
    }

    #[test]
    fn test_empty_plaintext() {
        let c = cipher("pw");
        let sealed = c.encrypt(b"").unwrap();
        assert!(c.decrypt(&sealed).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_passphrase_fails() {
        let sealed = cipher("thats my kung fu").encrypt(b"secret").unwrap();
        let result = cipher("thats my kung fusomesalt").decrypt(&sealed);
        assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn test_one_derivation_per_instance() {
        let c = cipher("pw");
        let sealed: Vec<_> = (0..8).map(|i| c.encrypt(format!("{i}").as_bytes()).unwrap()).collect();
        assert_eq!(c.derived_key_count(), 1);

        let opener = cipher("pw");
        for s in &sealed {
            opener.decrypt(s).unwrap();
        }
        assert_eq!(opener.derived_key_count(), 1);
    }

    #[test]
    fn test_semantic_security() {
        let c = cipher("pw");
        assert_ne!(c.encrypt(b"same").unwrap(), c.encrypt(b"same").unwrap());
    }

    #[test]
    fn test_header_tampering_detected() {
        let c = cipher("pw");
        let mut sealed = c.encrypt(b"value").unwrap();
        // flip a salt byte
        sealed[15] ^= 0x01;
        assert!(cipher("pw").decrypt(&sealed).is_err());
    }

    #[test]
    fn test_ciphertext_tampering_detected() {
        let c = cipher("pw");
        let mut sealed = c.encrypt(b"value").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(c.decrypt(&sealed).is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        let c = cipher("pw");
        let sealed = c.encrypt(b"value").unwrap();
        assert!(c.decrypt(&sealed[..20]).is_err());
        assert!(c.decrypt(&[]).is_err());
    }

    #[test]
    fn test_costly_header_refused_before_derivation() {
        let sealed = PassphraseCipher::new("pw")
            .with_params(KdfParams::new(512, 2, 1))
            .encrypt(b"value")
            .unwrap();
        let opener = cipher("pw").with_limit(KdfParams::new(256, 1, 1));
        let result = opener.decrypt(&sealed);
        assert!(matches!(result, Err(CryptoError::InvalidCiphertext(_))));
        assert_eq!(opener.derived_key_count(), 0);

        let relaxed = cipher("pw").with_limit(KdfParams::new(512, 2, 1));
        assert_eq!(relaxed.decrypt(&sealed).unwrap(), b"value");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_roundtrip_any_plaintext(plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
            let c = cipher("pw");
            let sealed = c.encrypt(&plaintext).unwrap();
            prop_assert_eq!(c.decrypt(&sealed).unwrap(), plaintext);
        }
    }
}
