//! Typed encrypt and decrypt requests

use crate::{selection::FieldSelection, FieldCryptError, Result};
use serde_json::Value;
use std::fmt;
use zeroize::Zeroizing;

/// A JSON document, as text or as an in-memory value
///
/// Results come back in the representation the request used.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    /// JSON text
    Text(String),
    /// Parsed JSON value
    Value(Value),
}

impl Document {
    /// Parse (or clone) into a JSON value
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Self::Text(text) => Ok(serde_json::from_str(text)?),
            Self::Value(value) => Ok(value.clone()),
        }
    }

    /// Wrap `value` in the same representation as `self`
    pub fn same_representation(&self, value: Value) -> Result<Document> {
        match self {
            Self::Text(_) => Ok(Self::Text(serde_json::to_string(&value)?)),
            Self::Value(_) => Ok(Self::Value(value)),
        }
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Result<Value> {
        match self {
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
            Self::Value(value) => Ok(value),
        }
    }

    /// Convert into JSON text
    pub fn into_text(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Value(value) => Ok(serde_json::to_string(&value)?),
        }
    }

    /// True for the text representation
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

fn collect(paths: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    paths.into_iter().map(Into::into).collect()
}

fn check_hmac_key(hmac_key: Option<&str>) -> Result<()> {
    match hmac_key {
        Some("") => Err(FieldCryptError::config("hmac key must not be empty")),
        _ => Ok(()),
    }
}

/// Request to encrypt selected fields of a document
#[derive(Clone)]
pub struct EncryptRequest {
    /// Document to encrypt
    pub document: Document,
    /// Paths to encrypt
    pub fields: Vec<String>,
    /// Paths to leave in clear text (everything else is encrypted)
    pub exclude_fields: Vec<String>,
    /// Password for symmetric mode
    pub password: Option<Zeroizing<String>>,
    /// Salt appended to the password
    pub salt: Zeroizing<String>,
    /// Recipient public keys; when present the call is asymmetric
    pub public_keys: Option<Vec<String>>,
    /// Key for per-field integrity tags
    pub hmac_key: Option<Zeroizing<String>>,
}

impl EncryptRequest {
    /// Create a request for `document` with no selection and no keys
    pub fn new(document: impl Into<Document>) -> Self {
        Self {
            document: document.into(),
            fields: Vec::new(),
            exclude_fields: Vec::new(),
            password: None,
            salt: Zeroizing::new(String::new()),
            public_keys: None,
            hmac_key: None,
        }
    }

    /// Encrypt only these paths
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = collect(fields);
        self
    }

    /// Encrypt everything except these paths
    pub fn with_exclude_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_fields = collect(fields);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Set the salt
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Zeroizing::new(salt.into());
        self
    }

    /// Encrypt for these recipients (standard base64 X25519 keys)
    pub fn with_public_keys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.public_keys = Some(collect(keys));
        self
    }

    /// Attach an integrity tag to every encrypted field
    pub fn with_hmac_key(mut self, key: impl Into<String>) -> Self {
        self.hmac_key = Some(Zeroizing::new(key.into()));
        self
    }

    /// Check the request shape and return the active selection
    pub fn validate(&self) -> Result<FieldSelection> {
        let selection = FieldSelection::resolve(&self.fields, &self.exclude_fields)?;
        check_hmac_key(self.hmac_key.as_deref().map(String::as_str))?;
        Ok(selection)
    }
}

impl fmt::Debug for EncryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptRequest")
            .field("fields", &self.fields)
            .field("exclude_fields", &self.exclude_fields)
            .field("password", &self.password.as_ref().map(|_| ".."))
            .field("public_keys", &self.public_keys.as_ref().map(Vec::len))
            .field("hmac_key", &self.hmac_key.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

/// Request to decrypt selected fields of a document
#[derive(Clone)]
pub struct DecryptRequest {
    /// Document to decrypt
    pub document: Document,
    /// Paths to decrypt
    pub fields: Vec<String>,
    /// Paths that were left in clear text
    pub exclude_fields: Vec<String>,
    /// Password for symmetric mode, or the passphrase of the private key
    pub password: Option<Zeroizing<String>>,
    /// Salt appended to the password in symmetric mode
    pub salt: Zeroizing<String>,
    /// Locked private key; when present the call is asymmetric
    pub private_key: Option<Zeroizing<String>>,
    /// Key for verifying integrity tags
    pub hmac_key: Option<Zeroizing<String>>,
}

impl DecryptRequest {
    /// Create a request for `document` with no selection and no keys
    pub fn new(document: impl Into<Document>) -> Self {
        Self {
            document: document.into(),
            fields: Vec::new(),
            exclude_fields: Vec::new(),
            password: None,
            salt: Zeroizing::new(String::new()),
            private_key: None,
            hmac_key: None,
        }
    }

    /// Decrypt only these paths
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = collect(fields);
        self
    }

    /// Decrypt everything except these paths
    pub fn with_exclude_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_fields = collect(fields);
        self
    }

    /// Set the password (or private key passphrase)
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Set the salt
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Zeroizing::new(salt.into());
        self
    }

    /// Decrypt with this locked private key
    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(Zeroizing::new(key.into()));
        self
    }

    /// Verify integrity tags with this key
    pub fn with_hmac_key(mut self, key: impl Into<String>) -> Self {
        self.hmac_key = Some(Zeroizing::new(key.into()));
        self
    }

    /// Check the request shape and return the active selection
    pub fn validate(&self) -> Result<FieldSelection> {
        let selection = FieldSelection::resolve(&self.fields, &self.exclude_fields)?;
        check_hmac_key(self.hmac_key.as_deref().map(String::as_str))?;
        Ok(selection)
    }
}

impl fmt::Debug for DecryptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptRequest")
            .field("fields", &self.fields)
            .field("exclude_fields", &self.exclude_fields)
            .field("password", &self.password.as_ref().map(|_| ".."))
            .field("private_key", &self.private_key.as_ref().map(|_| ".."))
            .field("hmac_key", &self.hmac_key.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}
