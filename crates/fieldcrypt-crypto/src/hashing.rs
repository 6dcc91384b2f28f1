//! Hashing utilities
//!
//! - BLAKE3 key derivation for wrapping keys and recipient identifiers
//! - HMAC-SHA256 integrity tags over field plaintexts

use crate::{CryptoError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Length of an integrity tag in hex characters (HMAC-SHA256)
pub const TAG_HEX_LEN: usize = 64;

type HmacSha256 = Hmac<Sha256>;

/// BLAKE3 key derivation bound to a context string
pub fn derive_key(context: &str, material: &[u8]) -> [u8; 32] {
    blake3::derive_key(context, material)
}

fn keyed_mac(key: &[u8], message: &[u8]) -> Result<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    mac.update(message);
    Ok(mac)
}

/// Compute the integrity tag of `message` under `key` as lowercase hex
pub fn integrity_tag(key: &[u8], message: &[u8]) -> Result<String> {
    Ok(hex::encode(keyed_mac(key, message)?.finalize().into_bytes()))
}

/// Verify a hex integrity tag in constant time
pub fn verify_integrity_tag(key: &[u8], message: &[u8], tag_hex: &str) -> Result<()> {
    let expected = hex::decode(tag_hex)?;
    keyed_mac(key, message)?
        .verify_slice(&expected)
        .map_err(|_| CryptoError::TagMismatch)
}
