//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// `-` means stdin or stdout
pub const STDIO: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "fieldcrypt")]
#[command(about = "Encrypt and decrypt selected fields of JSON documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "FIELDCRYPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "FIELDCRYPT_DEBUG")]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt fields of a document
    Encrypt(EncryptArgs),
    /// Decrypt fields of a document
    Decrypt(DecryptArgs),
}

/// Options shared by both directions
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Input document, `-` for stdin
    #[arg(short, long, default_value = STDIO)]
    pub input: PathBuf,

    /// Output document, `-` for stdout
    #[arg(short, long, default_value = STDIO)]
    pub output: PathBuf,

    /// Path to transform (repeatable)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Path to leave untouched; every other field is transformed (repeatable)
    #[arg(short = 'x', long = "exclude-field")]
    pub exclude_fields: Vec<String>,

    /// Password, or the passphrase of the private key
    #[arg(long, env = "FIELDCRYPT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Salt appended to the password
    #[arg(long, env = "FIELDCRYPT_SALT", default_value = "", hide_env_values = true)]
    pub salt: String,

    /// Key for per-field integrity tags
    #[arg(long, env = "FIELDCRYPT_HMAC_KEY", hide_env_values = true)]
    pub hmac_key: Option<String>,

    /// Pretty-print the output document
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EncryptArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// File holding a recipient public key (repeatable); switches to public-key mode
    #[arg(long = "public-key-file")]
    pub public_key_files: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DecryptArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// File holding a passphrase-locked private key; switches to private-key mode
    #[arg(long)]
    pub private_key_file: Option<PathBuf>,
}
