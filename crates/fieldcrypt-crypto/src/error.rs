//! Error types for the fieldcrypt-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key, wrong passphrase or tampered data)
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// None of the recipient entries was sealed for the given private key
    #[error("no recipient entry matches the private key")]
    NoMatchingRecipient,

    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A locked private key could not be unlocked with the passphrase
    #[error("private key unlock failed: {0}")]
    KeyUnlock(String),

    /// Password key derivation failed or was given unusable parameters
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Invalid ciphertext format
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Ciphertext was produced by an unknown format version
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// Integrity tag did not verify
    #[error("integrity tag mismatch")]
    TagMismatch,

    /// Base64 decode error
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Hex decode error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
