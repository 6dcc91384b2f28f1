//! # fieldcrypt CLI
//!
//! Command-line front end for selective JSON field encryption.
//!
//! ```text
//! fieldcrypt encrypt -i order.json -o sealed.json -f 'Account.Order.$.OrderID' --password pw
//! fieldcrypt decrypt -i sealed.json -f 'Account.Order.$.OrderID' --password pw --pretty
//! ```
//!
//! Secrets can also come from `FIELDCRYPT_PASSWORD`, `FIELDCRYPT_SALT` and
//! `FIELDCRYPT_HMAC_KEY`, including through a `.env` file.

pub mod cli;
pub mod config;

pub use cli::{Cli, Command, DecryptArgs, EncryptArgs, JobArgs};
pub use config::load_config;

use anyhow::Context;
use fieldcrypt_core::{DecryptRequest, Document, EncryptRequest, FieldCryptor};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == cli::STDIO
}

/// Read the input document as text
pub async fn read_input(path: &Path) -> anyhow::Result<String> {
    if is_stdio(path) {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Write the output document
pub async fn write_output(path: &Path, document: Document, pretty: bool) -> anyhow::Result<()> {
    let mut text = if pretty {
        serde_json::to_string_pretty(&document.into_value()?)?
    } else {
        document.into_text()?
    };
    text.push('\n');

    if is_stdio(path) {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await.context("failed to write stdout")?;
        stdout.flush().await?;
        return Ok(());
    }
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

async fn read_key_file(path: &Path) -> anyhow::Result<String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    Ok(text.trim().to_string())
}

/// Run the `encrypt` subcommand
pub async fn run_encrypt(cryptor: &FieldCryptor, args: &EncryptArgs) -> anyhow::Result<()> {
    let job = &args.job;
    let mut request = EncryptRequest::new(read_input(&job.input).await?)
        .with_fields(job.fields.iter().cloned())
        .with_exclude_fields(job.exclude_fields.iter().cloned())
        .with_salt(job.salt.clone());
    if let Some(password) = &job.password {
        request = request.with_password(password.clone());
    }
    if !args.public_key_files.is_empty() {
        let mut keys = Vec::with_capacity(args.public_key_files.len());
        for path in &args.public_key_files {
            keys.push(read_key_file(path).await?);
        }
        request = request.with_public_keys(keys);
    }
    if let Some(key) = &job.hmac_key {
        request = request.with_hmac_key(key.clone());
    }

    let document = cryptor.encrypt(request).await.context("encryption failed")?;
    write_output(&job.output, document, job.pretty).await?;
    info!(output = %job.output.display(), "document encrypted");
    Ok(())
}

/// Run the `decrypt` subcommand
pub async fn run_decrypt(cryptor: &FieldCryptor, args: &DecryptArgs) -> anyhow::Result<()> {
    let job = &args.job;
    let mut request = DecryptRequest::new(read_input(&job.input).await?)
        .with_fields(job.fields.iter().cloned())
        .with_exclude_fields(job.exclude_fields.iter().cloned())
        .with_salt(job.salt.clone());
    if let Some(password) = &job.password {
        request = request.with_password(password.clone());
    }
    if let Some(path) = &args.private_key_file {
        request = request.with_private_key(read_key_file(path).await?);
    }
    if let Some(key) = &job.hmac_key {
        request = request.with_hmac_key(key.clone());
    }

    let document = cryptor.decrypt(request).await.context("decryption failed")?;
    write_output(&job.output, document, job.pretty).await?;
    info!(output = %job.output.display(), "document decrypted");
    Ok(())
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let cryptor = FieldCryptor::new(config);
    match &cli.command {
        Command::Encrypt(args) => run_encrypt(&cryptor, args).await,
        Command::Decrypt(args) => run_decrypt(&cryptor, args).await,
    }
}
