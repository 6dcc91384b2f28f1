//! Leaf transformers
//!
//! A leaf's plaintext is the JSON text of its scalar value, so decrypting
//! restores the exact JSON type. Cipher work runs on tokio's blocking pool.
//!
//! The integrity tag covers the contents of a string leaf without its JSON
//! quotes, and the JSON text of any other scalar. A tag over `"order103"`
//! therefore equals `integrity_tag(key, b"order103")`.

use crate::{
    envelope::{self, Envelope},
    key_mode::{DecryptionMode, EncryptionMode},
    walker::{LeafLocation, LeafTransform},
    FieldCryptError,
    Result,
};
use async_trait::async_trait;
use fieldcrypt_crypto::{integrity_tag, verify_integrity_tag, CryptoError};
use serde_json::Value;
use std::sync::Arc;
use zeroize::Zeroizing;

fn tag_key(key: Option<&str>) -> Option<Zeroizing<Vec<u8>>> {
    key.map(|k| Zeroizing::new(k.as_bytes().to_vec()))
}

/// Bytes covered by the integrity tag of a leaf whose plaintext is `json_text`
fn tag_input<'a>(value: &'a Value, json_text: &'a [u8]) -> &'a [u8] {
    match value {
        Value::String(s) => s.as_bytes(),
        _ => json_text,
    }
}

struct EncryptState {
    mode: EncryptionMode,
    tag_key: Option<Zeroizing<Vec<u8>>>,
}

/// Replaces a leaf with its envelope token
#[derive(Clone)]
pub struct LeafEncryptor {
    state: Arc<EncryptState>,
}

impl LeafEncryptor {
    /// Create from a resolved mode and an optional integrity tag key
    pub fn new(mode: EncryptionMode, tag_key: Option<&str>) -> Self {
        Self {
            state: Arc::new(EncryptState {
                mode,
                tag_key: self::tag_key(tag_key),
            }),
        }
    }

    /// Encrypt one scalar value into an envelope token
    pub fn encrypt_value(&self, value: &Value) -> Result<String> {
        self.state.encrypt_value(value)
    }
}

impl EncryptState {
    fn encrypt_value(&self, value: &Value) -> Result<String> {
        let plaintext = Zeroizing::new(serde_json::to_string(value)?);
        let sealed = self.mode.seal(plaintext.as_bytes())?;
        let tag = self
            .tag_key
            .as_ref()
            .map(|key| integrity_tag(key, tag_input(value, plaintext.as_bytes())))
            .transpose()
            .map_err(FieldCryptError::from_seal_error)?;
        Ok(envelope::wrap(sealed, tag))
    }
}

#[async_trait]
impl LeafTransform for LeafEncryptor {
    async fn transform(&self, _location: &LeafLocation, value: Value) -> Result<Value> {
        let state = Arc::clone(&self.state);
        let token = tokio::task::spawn_blocking(move || state.encrypt_value(&value)).await??;
        Ok(Value::String(token))
    }
}

struct DecryptState {
    mode: DecryptionMode,
    tag_key: Option<Zeroizing<Vec<u8>>>,
}

/// Replaces an envelope token with the value it protects
#[derive(Clone)]
pub struct LeafDecryptor {
    state: Arc<DecryptState>,
}

impl LeafDecryptor {
    /// Create from a resolved mode and an optional integrity tag key
    ///
    /// Without a tag key any tag in the envelope is ignored.
    pub fn new(mode: DecryptionMode, tag_key: Option<&str>) -> Self {
        Self {
            state: Arc::new(DecryptState {
                mode,
                tag_key: self::tag_key(tag_key),
            }),
        }
    }

    /// Decrypt one envelope token back into its scalar value
    pub fn decrypt_token(&self, token: &str) -> Result<Value> {
        self.state.decrypt_token(token)
    }
}

impl DecryptState {
    fn decrypt_token(&self, token: &str) -> Result<Value> {
        let envelope: Envelope = token.parse()?;
        let plaintext = self.mode.open(envelope.ciphertext())?;
        let value: Value = serde_json::from_slice(&plaintext)
            .map_err(|_| FieldCryptError::format("decrypted field is not JSON"))?;

        if let Some(key) = &self.tag_key {
            let tag = envelope
                .tag()
                .ok_or_else(|| FieldCryptError::format("ciphertext does not contain a tag part"))?;
            verify_integrity_tag(key, tag_input(&value, &plaintext), tag).map_err(|e| match e {
                CryptoError::HexDecode(_) => {
                    FieldCryptError::format("integrity tag is not valid hex")
                }
                _ => FieldCryptError::Integrity("verification error".to_string()),
            })?;
        }

        if value.is_object() || value.is_array() {
            return Err(FieldCryptError::format("decrypted field is not a JSON scalar"));
        }
        Ok(value)
    }
}

#[async_trait]
impl LeafTransform for LeafDecryptor {
    async fn transform(&self, location: &LeafLocation, value: Value) -> Result<Value> {
        let token = match value {
            Value::String(token) if Envelope::is_envelope(&token) => token,
            _ => {
                return Err(FieldCryptError::format(format!(
                    "field {location} is not an encrypted value"
                )));
            }
        };
        let state = Arc::clone(&self.state);
        tokio::task::spawn_blocking(move || state.decrypt_token(&token)).await?
    }
}
