//! # fieldcrypt Crypto
//!
//! Cryptographic primitives behind selective field encryption.
//!
//! This crate provides:
//! - **Password sealing**: Argon2id-derived keys with AES-256-GCM or ChaCha20-Poly1305
//! - **Multi-recipient sealing**: one ciphertext any listed X25519 key can open
//! - **Locked private keys**: X25519 secret keys stored under a passphrase
//! - **Integrity tags**: HMAC-SHA256 hex digests with constant-time verification
//!
//! Every sealed value is a self-describing byte string; callers only need
//! the passphrase or the private key to open it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fieldcrypt_crypto::{KeyPair, RecipientOpener, RecipientSealer};
//!
//! let alice = KeyPair::generate();
//! let sealer = RecipientSealer::new(vec![alice.public_key().clone()])?;
//! let sealed = sealer.seal(b"\"order103\"")?;
//!
//! let opened = RecipientOpener::new(alice.secret_key().clone()).open(&sealed)?;
//! ```

pub mod error;
pub(crate) mod frame;
pub mod hashing;
pub mod hpke;
pub mod kdf;
pub mod keys;
pub mod locked_key;
pub mod passphrase;
pub mod recipients;
pub mod symmetric;

pub use error::{CryptoError, Result};
pub use hashing::{integrity_tag, verify_integrity_tag, TAG_HEX_LEN};
pub use kdf::KdfParams;
pub use keys::{DekKey, KeyPair, PublicKey, SecretKey};
pub use locked_key::LockedSecretKey;
pub use passphrase::PassphraseCipher;
pub use recipients::{RecipientOpener, RecipientSealer};
pub use symmetric::{Aead, AeadCipher, Nonce};

/// The version of the sealed byte formats
pub const FORMAT_VERSION: u8 = 1;
