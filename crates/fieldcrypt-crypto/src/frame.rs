//! Binary framing shared by the sealed formats
//!
//! Every sealed value starts with `version | kind | cipher`. Integers are
//! big-endian.

use crate::{kdf::KdfParams, symmetric::AeadCipher, CryptoError, Result, FORMAT_VERSION};

/// What a sealed byte string contains
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SealKind {
    /// Sealed under a password-derived key
    Password = 1,
    /// Sealed for a list of X25519 recipients
    Recipients = 2,
    /// An X25519 secret key locked under a passphrase
    LockedKey = 3,
}

impl SealKind {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(Self::Password),
            2 => Ok(Self::Recipients),
            3 => Ok(Self::LockedKey),
            other => Err(CryptoError::InvalidCiphertext(format!(
                "unknown seal kind {other}"
            ))),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Password => "password-sealed value",
            Self::Recipients => "recipient-sealed value",
            Self::LockedKey => "locked private key",
        }
    }
}

/// Write the common prefix
pub(crate) fn write_prefix(out: &mut Vec<u8>, kind: SealKind, cipher: AeadCipher) {
    out.push(FORMAT_VERSION);
    out.push(kind as u8);
    out.push(cipher.to_byte());
}

/// Write Argon2id parameters
pub(crate) fn write_kdf_params(out: &mut Vec<u8>, params: &KdfParams) {
    out.extend_from_slice(&params.memory_kib.to_be_bytes());
    out.extend_from_slice(&params.iterations.to_be_bytes());
    out.extend_from_slice(&params.parallelism.to_be_bytes());
}

/// Cursor over a sealed byte string
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Read and check the common prefix, returning the cipher
    pub(crate) fn expect_prefix(&mut self, expected: SealKind) -> Result<AeadCipher> {
        let version = self.u8()?;
        if version != FORMAT_VERSION {
            return Err(CryptoError::UnsupportedVersion(version));
        }
        let kind = SealKind::from_byte(self.u8()?)?;
        if kind != expected {
            return Err(CryptoError::Decryption(format!(
                "expected a {}, found a {}",
                expected.describe(),
                kind.describe()
            )));
        }
        AeadCipher::from_byte(self.u8()?)
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| CryptoError::InvalidCiphertext("truncated input".to_string()))?;
        let bytes: &'a [u8] = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(arr))
    }

    pub(crate) fn kdf_params(&mut self) -> Result<KdfParams> {
        let params = KdfParams::new(self.u32()?, self.u32()?, self.u32()?);
        params.check_bounds()?;
        Ok(params)
    }

    /// Bytes consumed so far (the authenticated header)
    pub(crate) fn consumed(&self) -> &'a [u8] {
        let bytes: &'a [u8] = self.bytes;
        &bytes[..self.pos]
    }

    /// Everything not yet consumed
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let bytes: &'a [u8] = self.bytes;
        let rest = &bytes[self.pos..];
        self.pos = self.bytes.len();
        rest
    }
}
