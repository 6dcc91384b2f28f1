//! Envelope codec
//!
//! An encrypted leaf is the single string
//!
//! ```text
//! token      := "_data:" base64part [";_hmac:" tag]
//! base64part := standard base64 alphabet with padding, no line wraps
//! tag        := lowercase hex digest
//! ```

use crate::{FieldCryptError, Result};
use base64::Engine;
use std::fmt;
use std::str::FromStr;

/// Prefix of the ciphertext part
pub const DATA_PREFIX: &str = "_data:";

/// Prefix of the integrity tag part
pub const TAG_PREFIX: &str = "_hmac:";

/// Separator between the parts
pub const SEPARATOR: char = ';';

const FORMAT_ERROR: &str = "ciphertext format error";

/// Ciphertext bytes plus an optional integrity tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    ciphertext: Vec<u8>,
    tag: Option<String>,
}

impl Envelope {
    /// Wrap ciphertext bytes with an optional tag
    pub fn new(ciphertext: Vec<u8>, tag: Option<String>) -> Self {
        Self { ciphertext, tag }
    }

    /// True if `token` carries the ciphertext prefix
    pub fn is_envelope(token: &str) -> bool {
        token.starts_with(DATA_PREFIX)
    }

    /// The ciphertext bytes
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The integrity tag, if one was attached
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Split into ciphertext and tag
    pub fn into_parts(self) -> (Vec<u8>, Option<String>) {
        (self.ciphertext, self.tag)
    }
}

impl FromStr for Envelope {
    type Err = FieldCryptError;

    fn from_str(token: &str) -> Result<Self> {
        let Some(rest) = token.strip_prefix(DATA_PREFIX) else {
            return Err(FieldCryptError::format(format!(
                "{FORMAT_ERROR}: missing {DATA_PREFIX} prefix"
            )));
        };

        let mut parts = rest.split(SEPARATOR);
        let data = parts.next().unwrap_or_default();
        let tag = match parts.next() {
            None => None,
            Some(part) => {
                let tag = part.strip_prefix(TAG_PREFIX).ok_or_else(|| {
                    FieldCryptError::format(format!("{FORMAT_ERROR}: missing {TAG_PREFIX} prefix"))
                })?;
                if tag.is_empty() {
                    return Err(FieldCryptError::format(format!("{FORMAT_ERROR}: empty tag")));
                }
                Some(tag.to_string())
            }
        };
        if parts.next().is_some() {
            return Err(FieldCryptError::format(format!(
                "{FORMAT_ERROR}: too many parts"
            )));
        }

        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| FieldCryptError::format(format!("{FORMAT_ERROR}: {e}")))?;

        Ok(Self { ciphertext, tag })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DATA_PREFIX)?;
        f.write_str(&base64::engine::general_purpose::STANDARD.encode(&self.ciphertext))?;
        if let Some(tag) = &self.tag {
            write!(f, "{SEPARATOR}{TAG_PREFIX}{tag}")?;
        }
        Ok(())
    }
}

/// Build the token for ciphertext bytes and an optional tag
pub fn wrap(ciphertext: Vec<u8>, tag: Option<String>) -> String {
    Envelope::new(ciphertext, tag).to_string()
}

/// Parse a token into ciphertext bytes and an optional tag
pub fn unwrap(token: &str) -> Result<(Vec<u8>, Option<String>)> {
    Ok(token.parse::<Envelope>()?.into_parts())
}
