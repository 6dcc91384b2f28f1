//! Key-mode resolution
//!
//! Decides between password and public-key cryptography for a call and
//! prepares the key material once: public keys are parsed and the private
//! key is unlocked before any leaf is touched.

use crate::{CryptConfig, FieldCryptError, Result};
use fieldcrypt_crypto::{
    LockedSecretKey, PassphraseCipher, PublicKey, RecipientOpener, RecipientSealer,
};
use tracing::debug;
use zeroize::Zeroizing;

fn passphrase(password: Option<&str>, salt: &str) -> Result<Zeroizing<String>> {
    match password {
        Some(password) if !password.is_empty() => {
            let mut joined = Zeroizing::new(String::with_capacity(password.len() + salt.len()));
            joined.push_str(password);
            joined.push_str(salt);
            Ok(joined)
        }
        _ => Err(FieldCryptError::config(
            "password is required for symmetric encryption",
        )),
    }
}

/// Key material for an encrypt call
pub enum EncryptionMode {
    /// Password plus salt
    Password(PassphraseCipher),
    /// One ciphertext for every listed recipient
    Recipients(RecipientSealer),
}

impl EncryptionMode {
    /// Resolve the mode; a recipient list wins over the password
    pub fn resolve(
        password: Option<&str>,
        salt: &str,
        public_keys: Option<&[String]>,
        config: &CryptConfig,
    ) -> Result<Self> {
        match public_keys {
            Some([]) => Err(FieldCryptError::config(
                "public key list must not be empty",
            )),
            Some(keys) => {
                let keys = keys
                    .iter()
                    .map(|k| PublicKey::from_base64(k))
                    .collect::<fieldcrypt_crypto::Result<Vec<_>>>()
                    .map_err(FieldCryptError::from_key_error)?;
                let sealer = RecipientSealer::new(keys)
                    .map_err(FieldCryptError::from_key_error)?
                    .with_cipher(config.cipher);
                debug!(recipients = sealer.recipients().len(), "resolved recipient mode");
                Ok(Self::Recipients(sealer))
            }
            None => {
                let passphrase = passphrase(password, salt)?;
                config
                    .kdf
                    .check_bounds()
                    .map_err(|_| {
                        FieldCryptError::config(format!(
                            "key derivation parameters exceed the hard limit: {:?}",
                            config.kdf
                        ))
                    })?;
                Ok(Self::Password(
                    PassphraseCipher::new(passphrase.as_bytes())
                        .with_params(config.kdf)
                        .with_cipher(config.cipher),
                ))
            }
        }
    }

    /// Mode name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::Recipients(_) => "recipients",
        }
    }

    /// Seal one leaf plaintext
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Password(cipher) => cipher.encrypt(plaintext),
            Self::Recipients(sealer) => sealer.seal(plaintext),
        }
        .map_err(FieldCryptError::from_seal_error)
    }
}

/// Key material for a decrypt call
pub enum DecryptionMode {
    /// Password plus salt
    Password(PassphraseCipher),
    /// An unlocked private key
    PrivateKey(RecipientOpener),
}

impl DecryptionMode {
    /// Resolve the mode; a private key wins over symmetric decryption
    ///
    /// In private-key mode the password is the passphrase that unlocks the key.
    /// In password mode headers asking for more than
    /// [`CryptConfig::decrypt_ceiling`] are refused before any derivation.
    pub async fn resolve(
        password: Option<&str>,
        salt: &str,
        private_key: Option<&str>,
        config: &CryptConfig,
    ) -> Result<Self> {
        match private_key {
            Some("") => Err(FieldCryptError::config("private key must not be empty")),
            Some(text) => {
                let unlock_with = match password {
                    Some(password) => Zeroizing::new(password.to_string()),
                    None => {
                        return Err(FieldCryptError::config(
                            "password is required to unlock the private key",
                        ));
                    }
                };
                let text = Zeroizing::new(text.to_string());
                let secret =
                    tokio::task::spawn_blocking(move || LockedSecretKey::unlock(&text, &unlock_with))
                        .await?
                        .map_err(FieldCryptError::from_key_error)?;
                debug!("unlocked private key");
                Ok(Self::PrivateKey(RecipientOpener::new(secret)))
            }
            None => {
                let passphrase = passphrase(password, salt)?;
                Ok(Self::Password(
                    PassphraseCipher::new(passphrase.as_bytes())
                        .with_params(config.kdf)
                        .with_cipher(config.cipher)
                        .with_limit(config.decrypt_ceiling()),
                ))
            }
        }
    }

    /// Mode name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Password(_) => "password",
            Self::PrivateKey(_) => "private-key",
        }
    }

    /// Open one sealed leaf
    pub fn open(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Password(cipher) => cipher.decrypt(sealed),
            Self::PrivateKey(opener) => opener.open(sealed),
        }
        .map(Zeroizing::new)
        .map_err(FieldCryptError::from_open_error)
    }
}
