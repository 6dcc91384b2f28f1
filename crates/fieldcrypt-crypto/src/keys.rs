//! Key material
//!
//! A [`DekKey`] seals field values; X25519 pairs identify recipients.
//! Public keys travel as standard base64 text.

use crate::{CryptoError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};
use x25519_dalek::StaticSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AEAD and X25519 key length
pub const KEY_SIZE: usize = 32;

/// AEAD nonce length
pub const NONCE_SIZE: usize = 12;

/// Length of the recipient identifier stored in sealed values
pub const KEY_ID_SIZE: usize = 8;

fn random_key() -> [u8; KEY_SIZE] {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

fn fixed_key(what: &str, bytes: &[u8]) -> Result<[u8; KEY_SIZE]> {
    <[u8; KEY_SIZE]>::try_from(bytes).map_err(|_| {
        CryptoError::InvalidKey(format!("{what} must be {KEY_SIZE} bytes, got {}", bytes.len()))
    })
}

/// Data encryption key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DekKey {
    key: [u8; KEY_SIZE],
}

impl DekKey {
    pub fn generate() -> Self {
        Self { key: random_key() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        fixed_key("DEK", bytes).map(|key| Self { key })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

/// Recipient public key
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; KEY_SIZE],
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        fixed_key("public key", bytes).map(|bytes| Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Short identifier used to find this recipient's entry in a sealed value
    pub fn key_id(&self) -> [u8; KEY_ID_SIZE] {
        let digest = crate::hashing::derive_key("fieldcrypt-key-id-v1", &self.bytes);
        let mut id = [0u8; KEY_ID_SIZE];
        id.copy_from_slice(&digest[..KEY_ID_SIZE]);
        id
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Parse the text form; surrounding whitespace is ignored
    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(&STANDARD.decode(s.trim())?)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// Recipient private key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

impl SecretKey {
    pub fn generate() -> Self {
        Self { bytes: random_key() }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        fixed_key("secret key", bytes).map(|bytes| Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn public_key(&self) -> PublicKey {
        let secret = StaticSecret::from(self.bytes);
        PublicKey {
            bytes: x25519_dalek::PublicKey::from(&secret).to_bytes(),
        }
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A secret key with its public half
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    pub fn from_secret_key(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}
