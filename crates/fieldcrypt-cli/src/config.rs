//! Configuration loading
//!
//! Defaults, then an optional TOML file, then `FIELDCRYPT_*` environment
//! variables. The prefix is joined with `_` and nested keys with `__`:
//! `FIELDCRYPT_MAX_CONCURRENCY`, `FIELDCRYPT_KDF__ITERATIONS`,
//! `FIELDCRYPT_KDF_LIMIT__MEMORY_KIB`.

use anyhow::Context;
use config::{Config, Environment, File};
use fieldcrypt_core::CryptConfig;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FIELDCRYPT";

/// Build the cryptor configuration
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CryptConfig> {
    let mut builder = Config::builder().add_source(
        Config::try_from(&CryptConfig::default()).context("failed to encode default configuration")?,
    );
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: CryptConfig = builder
        .build()
        .context("failed to load configuration")?
        .try_deserialize()
        .context("invalid configuration")?;
    let max_concurrency = config.max_concurrency;
    Ok(config.with_max_concurrency(max_concurrency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcrypt_crypto::AeadCipher;
    use serial_test::serial;

    const OVERRIDES: [(&str, &str); 3] = [
        ("FIELDCRYPT_MAX_CONCURRENCY", "2"),
        ("FIELDCRYPT_KDF__ITERATIONS", "3"),
        ("FIELDCRYPT_KDF_LIMIT__MEMORY_KIB", "8192"),
    ];

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.cipher, CryptConfig::default().cipher);
        assert_eq!(config.kdf, CryptConfig::default().kdf);
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldcrypt.toml");
        std::fs::write(
            &path,
            "cipher = \"chacha20poly1305\"\nmax_concurrency = 3\n\n[kdf]\niterations = 2\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.cipher, AeadCipher::ChaCha20Poly1305);
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.kdf.iterations, 2);
        assert_eq!(config.kdf.memory_kib, CryptConfig::default().kdf.memory_kib);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        for (key, value) in OVERRIDES {
            std::env::set_var(key, value);
        }
        let loaded = load_config(None);
        for (key, _) in OVERRIDES {
            std::env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.kdf.iterations, 3);
        assert_eq!(config.kdf.memory_kib, CryptConfig::default().kdf.memory_kib);
        assert_eq!(config.kdf_limit.memory_kib, 8192);
        assert_eq!(config.kdf_limit.iterations, CryptConfig::default().kdf_limit.iterations);
    }
}
