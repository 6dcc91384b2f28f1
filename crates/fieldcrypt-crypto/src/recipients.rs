//! Multi-recipient sealing
//!
//! A fresh DEK seals the body once; the DEK is wrapped for every recipient.
//! Any one recipient's secret key opens the value.
//!
//! Layout:
//! `01 | 02 | cipher | count | count x (key_id[8] | epk[32] | nonce[12] | wrapped[48]) | nonce[12] | aead(ct)`

use crate::{
    frame::{self, Reader, SealKind},
    hpke::{
        Decryptor, Encryptor, WrappedKey, ENCAPSULATED_KEY_SIZE, WRAPPED_DEK_SIZE, WRAPPED_KEY_LEN,
    },
    keys::{DekKey, PublicKey, SecretKey, KEY_ID_SIZE, NONCE_SIZE},
    symmetric::{Aead, AeadCipher, Nonce},
    CryptoError,
    Result,
};
use tracing::trace;

/// Largest number of recipients one value can be sealed for
pub const MAX_RECIPIENTS: usize = u8::MAX as usize;

/// Seals values for a fixed set of recipients
pub struct RecipientSealer {
    recipients: Vec<PublicKey>,
    cipher: AeadCipher,
}

impl RecipientSealer {
    /// Create a sealer; the recipient list must hold 1..=255 keys
    pub fn new(recipients: Vec<PublicKey>) -> Result<Self> {
        if recipients.is_empty() || recipients.len() > MAX_RECIPIENTS {
            return Err(CryptoError::InvalidKey(format!(
                "recipient count must be between 1 and {MAX_RECIPIENTS}, got {}",
                recipients.len()
            )));
        }
        Ok(Self {
            recipients,
            cipher: AeadCipher::default(),
        })
    }

    /// Set the AEAD cipher
    pub fn with_cipher(mut self, cipher: AeadCipher) -> Self {
        self.cipher = cipher;
        self
    }

    /// Recipients this sealer encrypts for
    pub fn recipients(&self) -> &[PublicKey] {
        &self.recipients
    }

    /// Seal a plaintext for all recipients
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let table_len = self.recipients.len() * (KEY_ID_SIZE + WRAPPED_KEY_LEN);
        let mut out = Vec::with_capacity(4 + table_len + NONCE_SIZE + plaintext.len() + 16);
        frame::write_prefix(&mut out, SealKind::Recipients, self.cipher);
        out.push(self.recipients.len() as u8);
        let wrap_aad = out.clone();

        let dek = DekKey::generate();
        for recipient in &self.recipients {
            let wrapped = Encryptor::new(recipient, self.cipher).wrap_dek(&dek, &wrap_aad)?;
            out.extend_from_slice(&recipient.key_id());
            out.extend_from_slice(&wrapped.ephemeral_public);
            out.extend_from_slice(wrapped.nonce.as_bytes());
            out.extend_from_slice(&wrapped.wrapped);
        }

        let nonce = Nonce::generate();
        let ciphertext = Aead::new(&dek, self.cipher).encrypt_with_aad(&nonce, plaintext, &out)?;
        out.extend_from_slice(nonce.as_bytes());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

/// Opens values sealed for one recipient
pub struct RecipientOpener {
    secret: SecretKey,
    key_id: [u8; KEY_ID_SIZE],
}

impl RecipientOpener {
    /// Create from the recipient's (already unlocked) secret key
    pub fn new(secret: SecretKey) -> Self {
        let key_id = secret.public_key().key_id();
        Self { secret, key_id }
    }

    /// Open a sealed value
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        let mut reader = Reader::new(sealed);
        let cipher = reader.expect_prefix(SealKind::Recipients)?;
        let count = reader.u8()? as usize;
        if count == 0 {
            return Err(CryptoError::InvalidCiphertext("empty recipient table".to_string()));
        }
        let wrap_aad = reader.consumed();

        let mut ours = Vec::new();
        for _ in 0..count {
            let key_id = reader.take(KEY_ID_SIZE)?;
            let mut ephemeral_public = [0u8; ENCAPSULATED_KEY_SIZE];
            ephemeral_public.copy_from_slice(reader.take(ENCAPSULATED_KEY_SIZE)?);
            let nonce = Nonce::from_bytes(reader.take(NONCE_SIZE)?)?;
            let wrapped = reader.take(WRAPPED_DEK_SIZE)?.to_vec();
            if key_id == self.key_id {
                ours.push(WrappedKey {
                    ephemeral_public,
                    nonce,
                    wrapped,
                });
            }
        }
        let header = reader.consumed();
        let nonce = Nonce::from_bytes(reader.take(NONCE_SIZE)?)?;
        let ciphertext = reader.rest();

        trace!(entries = count, matching = ours.len(), "scanned recipient table");
        if ours.is_empty() {
            return Err(CryptoError::NoMatchingRecipient);
        }

        let decryptor = Decryptor::new(&self.secret, cipher);
        let mut last_err = None;
        for wrapped in &ours {
            match decryptor.unwrap_dek(wrapped, wrap_aad) {
                Ok(dek) => {
                    return Aead::new(&dek, cipher)
                        .decrypt_with_aad(&nonce, ciphertext, header)
                        .map_err(|_| {
                            CryptoError::Decryption("sealed body failed authentication".to_string())
                        });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or(CryptoError::NoMatchingRecipient))
    }
}
