//! # fieldcrypt Core
//!
//! Selective field-level encryption of JSON documents.
//!
//! This crate provides:
//! - **Path schemas**: dot paths with a `$` array wildcard that pick leaves
//! - **Field selection**: encrypt only the listed paths, or everything except them
//! - **Key modes**: password plus salt, or a list of X25519 recipients
//! - **Envelopes**: `_data:<base64>[;_hmac:<hex>]` tokens that replace leaves
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │      FieldCryptor (encrypt / decrypt)    │
//! ├────────────────────┬─────────────────────┤
//! │  FieldSelection    │  EncryptionMode /   │
//! │  (PathSchema)      │  DecryptionMode     │
//! ├────────────────────┴─────────────────────┤
//! │  walker -> LeafEncryptor / LeafDecryptor │
//! ├────────────────────┬─────────────────────┤
//! │  envelope          │  fieldcrypt-crypto  │
//! └────────────────────┴─────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use fieldcrypt_core::{DecryptRequest, EncryptRequest, FieldCryptor};
//!
//! let cryptor = FieldCryptor::default();
//! let sealed = cryptor
//!     .encrypt(EncryptRequest::new(doc).with_fields(["Account.Order.$.OrderID"]).with_password("pw"))
//!     .await?;
//! let opened = cryptor
//!     .decrypt(DecryptRequest::new(sealed).with_fields(["Account.Order.$.OrderID"]).with_password("pw"))
//!     .await?;
//! ```

pub mod config;
pub mod cryptor;
pub mod envelope;
pub mod error;
pub mod key_mode;
pub mod path;
pub mod request;
pub mod selection;
pub mod transform;
pub mod walker;

pub use config::CryptConfig;
pub use cryptor::{decrypt, encrypt, FieldCryptor};
pub use envelope::Envelope;
pub use error::{FieldCryptError, Result};
pub use key_mode::{DecryptionMode, EncryptionMode};
pub use path::{LocationStep, PathSchema, PathSegment, SchemaPath};
pub use request::{DecryptRequest, Document, EncryptRequest};
pub use selection::FieldSelection;
pub use transform::{LeafDecryptor, LeafEncryptor};
pub use walker::{resolve_targets, walk, LeafLocation, LeafTransform, SelectionMode, Walked};
