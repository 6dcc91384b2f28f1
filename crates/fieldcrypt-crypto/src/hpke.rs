//! HPKE-style key wrapping
//!
//! A DEK is wrapped for one recipient with an ephemeral X25519 exchange; the
//! shared secret goes through BLAKE3 key derivation to produce the wrapping
//! key. Used by [`crate::recipients`] once per recipient.

use crate::{
    keys::{DekKey, PublicKey, SecretKey, KEY_SIZE, NONCE_SIZE},
    symmetric::{Aead, AeadCipher, Nonce},
    CryptoError,
    Result,
};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

/// Ephemeral public key length
pub const ENCAPSULATED_KEY_SIZE: usize = 32;

/// Size of a wrapped DEK (key plus AEAD tag)
pub const WRAPPED_DEK_SIZE: usize = KEY_SIZE + 16;

const WRAP_CONTEXT: &str = "fieldcrypt-hpke-wrap-v1";

/// A DEK wrapped for one recipient
#[derive(Clone, Debug)]
pub struct WrappedKey {
    pub ephemeral_public: [u8; ENCAPSULATED_KEY_SIZE],
    pub nonce: Nonce,
    /// The encrypted DEK
    pub wrapped: Vec<u8>,
}

/// Wraps DEKs for a recipient
pub struct Encryptor<'a> {
    recipient_public: &'a PublicKey,
    cipher: AeadCipher,
}

impl<'a> Encryptor<'a> {
    pub fn new(recipient_public: &'a PublicKey, cipher: AeadCipher) -> Self {
        Self {
            recipient_public,
            cipher,
        }
    }

    /// Wrap a DEK, binding `aad` into the wrapping
    pub fn wrap_dek(&self, dek: &DekKey, aad: &[u8]) -> Result<WrappedKey> {
        let ephemeral = StaticSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519Public::from(&ephemeral).to_bytes();
        let recipient = self.recipient_public.as_bytes();
        let shared = ephemeral.diffie_hellman(&X25519Public::from(*recipient));

        let kek = derive_kek(shared.as_bytes(), &ephemeral_public, recipient)?;
        let nonce = Nonce::generate();
        let wrapped = Aead::new(&kek, self.cipher).encrypt_with_aad(&nonce, dek.as_bytes(), aad)?;
        Ok(WrappedKey {
            ephemeral_public,
            nonce,
            wrapped,
        })
    }
}

/// Unwraps DEKs with the recipient's secret key
pub struct Decryptor<'a> {
    secret: &'a SecretKey,
    cipher: AeadCipher,
}

impl<'a> Decryptor<'a> {
    pub fn new(secret: &'a SecretKey, cipher: AeadCipher) -> Self {
        Self { secret, cipher }
    }

    /// Unwrap a DEK
    pub fn unwrap_dek(&self, wrapped: &WrappedKey, aad: &[u8]) -> Result<DekKey> {
        let ours = StaticSecret::from(*self.secret.as_bytes());
        let shared = ours.diffie_hellman(&X25519Public::from(wrapped.ephemeral_public));
        let recipient = X25519Public::from(&ours).to_bytes();

        let kek = derive_kek(shared.as_bytes(), &wrapped.ephemeral_public, &recipient)?;
        let bytes = Aead::new(&kek, self.cipher)
            .decrypt_with_aad(&wrapped.nonce, &wrapped.wrapped, aad)
            .map_err(|_| CryptoError::Decryption("key unwrap failed".to_string()))?;
        DekKey::from_bytes(&bytes)
    }
}

/// Wrapping key over the shared secret and both public keys
fn derive_kek(shared: &[u8], ephemeral_public: &[u8], recipient_public: &[u8]) -> Result<DekKey> {
    let derived = crate::hashing::derive_key(
        WRAP_CONTEXT,
        &[shared, ephemeral_public, recipient_public].concat(),
    );
    DekKey::from_bytes(&derived)
}

/// Size of one serialized wrapped key
pub(crate) const WRAPPED_KEY_LEN: usize = ENCAPSULATED_KEY_SIZE + NONCE_SIZE + WRAPPED_DEK_SIZE;
