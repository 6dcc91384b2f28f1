//! Encrypt and decrypt entry points

use crate::{
    key_mode::{DecryptionMode, EncryptionMode},
    request::{DecryptRequest, Document, EncryptRequest},
    transform::{LeafDecryptor, LeafEncryptor},
    walker::walk,
    CryptConfig,
    Result,
};
use std::time::Instant;
use tracing::{debug, instrument};

/// Encrypts and decrypts selected fields of JSON documents
#[derive(Clone, Debug, Default)]
pub struct FieldCryptor {
    config: CryptConfig,
}

impl FieldCryptor {
    /// Create with an explicit configuration
    pub fn new(config: CryptConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &CryptConfig {
        &self.config
    }

    /// Encrypt the fields the request selects
    ///
    /// Request errors are reported before any key is parsed. The document
    /// comes back in the representation it was given in.
    #[instrument(skip(self, request), fields(mode = tracing::field::Empty))]
    pub async fn encrypt(&self, request: EncryptRequest) -> Result<Document> {
        let started = Instant::now();
        let selection = request.validate()?;
        let mode = EncryptionMode::resolve(
            request.password.as_deref().map(String::as_str),
            &request.salt,
            request.public_keys.as_deref(),
            &self.config,
        )?;
        tracing::Span::current().record("mode", mode.name());

        let document = request.document.to_value()?;
        let encryptor = LeafEncryptor::new(mode, request.hmac_key.as_deref().map(String::as_str));
        let walked = walk(
            &document,
            &selection.schema,
            selection.mode,
            &encryptor,
            self.config.max_concurrency,
        )
        .await?;

        debug!(
            leaves = walked.leaves,
            tagged = request.hmac_key.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "encrypted document"
        );
        request.document.same_representation(walked.document)
    }

    /// Decrypt the fields the request selects
    ///
    /// Every selected leaf must be an envelope token; the first failing
    /// leaf aborts the call.
    #[instrument(skip(self, request), fields(mode = tracing::field::Empty))]
    pub async fn decrypt(&self, request: DecryptRequest) -> Result<Document> {
        let started = Instant::now();
        let selection = request.validate()?;
        let mode = DecryptionMode::resolve(
            request.password.as_deref().map(String::as_str),
            &request.salt,
            request.private_key.as_deref().map(String::as_str),
            &self.config,
        )
        .await?;
        tracing::Span::current().record("mode", mode.name());

        let document = request.document.to_value()?;
        let decryptor = LeafDecryptor::new(mode, request.hmac_key.as_deref().map(String::as_str));
        let walked = walk(
            &document,
            &selection.schema,
            selection.mode,
            &decryptor,
            self.config.max_concurrency,
        )
        .await?;

        debug!(
            leaves = walked.leaves,
            verified = request.hmac_key.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decrypted document"
        );
        request.document.same_representation(walked.document)
    }
}

/// Encrypt with the default configuration
pub async fn encrypt(request: EncryptRequest) -> Result<Document> {
    FieldCryptor::default().encrypt(request).await
}

/// Decrypt with the default configuration
pub async fn decrypt(request: DecryptRequest) -> Result<Document> {
    FieldCryptor::default().decrypt(request).await
}
