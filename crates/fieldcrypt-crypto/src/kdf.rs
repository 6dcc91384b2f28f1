//! Password key derivation (Argon2id)

use crate::{
    keys::{DekKey, KEY_SIZE},
    CryptoError,
    Result,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Size of a password salt in bytes
pub const SALT_SIZE: usize = 16;

/// Largest memory cost accepted from a ciphertext header (64 MiB)
pub const MAX_MEMORY_KIB: u32 = 64 * 1024;

/// Largest iteration count accepted from a ciphertext header
pub const MAX_ITERATIONS: u32 = 10;

/// Largest parallelism accepted from a ciphertext header
pub const MAX_PARALLELISM: u32 = 8;

/// Argon2id cost parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    /// Create explicit parameters
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// The most expensive parameters ever accepted from a header
    pub fn hard_limit() -> Self {
        Self::new(MAX_MEMORY_KIB, MAX_ITERATIONS, MAX_PARALLELISM)
    }

    /// Componentwise maximum of two parameter sets
    pub fn max_with(self, other: Self) -> Self {
        Self::new(
            self.memory_kib.max(other.memory_kib),
            self.iterations.max(other.iterations),
            self.parallelism.max(other.parallelism),
        )
    }

    /// Reject parameters read from untrusted input that would exhaust resources
    pub fn check_bounds(&self) -> Result<()> {
        self.check_within(&Self::hard_limit())
    }

    /// Reject parameters costlier than `limit` or the hard limit, whichever is lower
    pub fn check_within(&self, limit: &KdfParams) -> Result<()> {
        let hard = Self::hard_limit();
        if self.memory_kib > limit.memory_kib.min(hard.memory_kib)
            || self.iterations > limit.iterations.min(hard.iterations)
            || self.parallelism > limit.parallelism.min(hard.parallelism)
        {
            return Err(CryptoError::InvalidCiphertext(format!(
                "key derivation parameters out of range: {self:?}"
            )));
        }
        Ok(())
    }

    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(format!("invalid Argon2 parameters: {e}")))
    }
}

/// A random password salt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generate a random salt
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SALT_SIZE {
            return Err(CryptoError::InvalidCiphertext(format!(
                "salt must be {} bytes, got {}",
                SALT_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; SALT_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Get the salt bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Derive a 256-bit key from a passphrase with Argon2id
pub fn derive_key(passphrase: &[u8], salt: &Salt, params: &KdfParams) -> Result<DekKey> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);
    let mut out = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(passphrase, salt.as_bytes(), &mut *out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    DekKey::from_bytes(&*out)
}
