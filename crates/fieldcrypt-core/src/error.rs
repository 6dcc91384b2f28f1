//! Error types for the fieldcrypt-core crate

use fieldcrypt_crypto::CryptoError;
use thiserror::Error;

/// Result type alias using `FieldCryptError`
pub type Result<T> = std::result::Result<T, FieldCryptError>;

/// Errors that can occur while encrypting or decrypting a document
#[derive(Error, Debug)]
pub enum FieldCryptError {
    /// The request is invalid (mode exclusivity, missing or empty inputs, bad paths)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A leaf or envelope does not have the expected shape
    #[error("format error: {0}")]
    Format(String),

    /// A public or private key could not be parsed or unlocked
    #[error("key error: {0}")]
    Key(String),

    /// A ciphertext could not be decrypted
    #[error("decryption error: {0}")]
    Decryption(String),

    /// An integrity tag did not verify
    #[error("integrity error: {0}")]
    Integrity(String),

    /// A leaf could not be encrypted
    #[error("encryption error: {0}")]
    Encryption(String),

    /// The input document is not valid JSON
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    /// A blocking worker panicked or was cancelled
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FieldCryptError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Map a crypto failure raised while parsing or unlocking key material
    pub(crate) fn from_key_error(err: CryptoError) -> Self {
        Self::Key(err.to_string())
    }

    /// Map a crypto failure raised while opening a ciphertext
    pub(crate) fn from_open_error(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidCiphertext(_) | CryptoError::UnsupportedVersion(_) => {
                Self::Decryption(format!("ciphertext format error: {err}"))
            }
            other => Self::Decryption(other.to_string()),
        }
    }

    /// Map a crypto failure raised while sealing a leaf
    pub(crate) fn from_seal_error(err: CryptoError) -> Self {
        Self::Encryption(err.to_string())
    }

    /// Returns true for invalid requests
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true for malformed leaves or envelopes
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true for key parse or unlock failures
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Returns true when a ciphertext could not be opened
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }

    /// Returns true when an integrity tag did not verify
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_error_mapping() {
        assert!(FieldCryptError::from_key_error(CryptoError::KeyUnlock("x".into())).is_key());
        assert!(FieldCryptError::from_open_error(CryptoError::NoMatchingRecipient).is_decryption());
        assert!(FieldCryptError::from_open_error(CryptoError::UnsupportedVersion(7)).is_decryption());
        assert!(matches!(
            FieldCryptError::from_seal_error(CryptoError::Encryption("x".into())),
            FieldCryptError::Encryption(_)
        ));
    }

    #[test]
    fn test_display() {
        let err = FieldCryptError::Integrity("verification error".into());
        assert_eq!(err.to_string(), "integrity error: verification error");
    }
}
