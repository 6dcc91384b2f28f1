//! AEAD layer shared by every sealed format
//!
//! Every sealed format in this crate ends in an AEAD ciphertext whose
//! associated data is the format header, so header tampering is detected.

use crate::{
    keys::{DekKey, KEY_SIZE, NONCE_SIZE},
    CryptoError,
    Result,
};
use aes_gcm::{
    aead::{self, Aead as _, KeyInit, Payload},
    Aes256Gcm,
};
use chacha20poly1305::ChaCha20Poly1305;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// 96-bit AEAD nonce, fresh for every sealed value
#[derive(Clone, Debug)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Draw a nonce from the OS generator
    pub fn generate() -> Self {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        Self(nonce)
    }

    /// Read a nonce out of a ciphertext frame
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        <[u8; NONCE_SIZE]>::try_from(bytes).map(Self).map_err(|_| {
            CryptoError::InvalidCiphertext(format!("bad nonce length {}", bytes.len()))
        })
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// Cipher used for sealing; the choice travels in every frame header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AeadCipher {
    #[default]
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl AeadCipher {
    /// Human-readable algorithm name
    pub fn algorithm_id(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }

    /// Bytes the AEAD adds to every plaintext
    pub fn tag_size(&self) -> usize {
        16
    }

    /// Identifier byte stored in ciphertext headers
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Aes256Gcm => 1,
            Self::ChaCha20Poly1305 => 2,
        }
    }

    /// Parse the identifier byte from a ciphertext header
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(Self::Aes256Gcm),
            2 => Ok(Self::ChaCha20Poly1305),
            other => Err(CryptoError::InvalidCiphertext(format!(
                "unknown cipher id {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Seal,
    Open,
}

fn apply<C>(key: &[u8], nonce: &Nonce, payload: Payload<'_, '_>, direction: Direction) -> Result<Vec<u8>>
where
    C: KeyInit + aead::Aead,
{
    let cipher = C::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let nonce = aead::Nonce::<C>::from_slice(nonce.as_bytes());
    match direction {
        Direction::Seal => cipher
            .encrypt(nonce, payload)
            .map_err(|e| CryptoError::Encryption(e.to_string())),
        Direction::Open => cipher
            .decrypt(nonce, payload)
            .map_err(|e| CryptoError::Decryption(e.to_string())),
    }
}

/// A DEK bound to one cipher
pub struct Aead {
    cipher: AeadCipher,
    key: [u8; KEY_SIZE],
}

impl Aead {
    pub fn new(key: &DekKey, cipher: AeadCipher) -> Self {
        Self {
            cipher,
            key: *key.as_bytes(),
        }
    }

    /// AES-256-GCM
    pub fn new_default(key: &DekKey) -> Self {
        Self::new(key, AeadCipher::default())
    }

    fn run(&self, nonce: &Nonce, msg: &[u8], aad: &[u8], direction: Direction) -> Result<Vec<u8>> {
        let payload = Payload { msg, aad };
        match self.cipher {
            AeadCipher::Aes256Gcm => apply::<Aes256Gcm>(&self.key, nonce, payload, direction),
            AeadCipher::ChaCha20Poly1305 => {
                apply::<ChaCha20Poly1305>(&self.key, nonce, payload, direction)
            }
        }
    }

    /// Seal `plaintext`, authenticating `aad` alongside it
    pub fn encrypt_with_aad(&self, nonce: &Nonce, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.run(nonce, plaintext, aad, Direction::Seal)
    }

    /// Open `ciphertext`; fails unless `aad` matches what was sealed
    pub fn decrypt_with_aad(&self, nonce: &Nonce, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.run(nonce, ciphertext, aad, Direction::Open)
    }
}

impl Drop for Aead {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
