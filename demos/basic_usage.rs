//! Basic usage example for fieldcrypt
//!
//! This example demonstrates:
//! - Encrypting selected fields with a password and salt
//! - Attaching and verifying integrity tags
//! - Encrypting for several recipients and decrypting with one of them
//!
//! Run with: cargo run --example basic_usage

use fieldcrypt_core::{CryptConfig, DecryptRequest, EncryptRequest, FieldCryptor};
use fieldcrypt_crypto::{KdfParams, KeyPair, LockedSecretKey};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let order = json!({
        "Account": {
            "Account Name": "Firefly",
            "Order": [
                {"OrderID": "order103", "Price": 34.45, "Quantity": 2},
                {"OrderID": "order104", "Price": 107.99, "Quantity": 1}
            ]
        }
    });
    let fields = ["Account.Order.$.OrderID"];
    let cryptor = FieldCryptor::new(CryptConfig::default());

    // ==================== Password Mode ====================

    println!("Encrypting order ids with a password...");
    let sealed = cryptor
        .encrypt(
            EncryptRequest::new(order.clone())
                .with_fields(fields)
                .with_password("thats my kung fu")
                .with_salt("somesalt")
                .with_hmac_key("integrity"),
        )
        .await?
        .into_value()?;
    println!("{}", serde_json::to_string_pretty(&sealed)?);

    let opened = cryptor
        .decrypt(
            DecryptRequest::new(sealed)
                .with_fields(fields)
                .with_password("thats my kung fu")
                .with_salt("somesalt")
                .with_hmac_key("integrity"),
        )
        .await?
        .into_value()?;
    assert_eq!(opened, order);
    println!("Decrypted and verified\n");

    // ==================== Recipient Mode ====================

    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let bob_locked = LockedSecretKey::lock(bob.secret_key(), "bob's passphrase", &KdfParams::default())?;

    println!("Encrypting everything except the account name for Alice and Bob...");
    let sealed = cryptor
        .encrypt(
            EncryptRequest::new(order.to_string())
                .with_exclude_fields(["Account.Account Name"])
                .with_public_keys([alice.public_key().to_base64(), bob.public_key().to_base64()]),
        )
        .await?;

    let opened = cryptor
        .decrypt(
            DecryptRequest::new(sealed)
                .with_exclude_fields(["Account.Account Name"])
                .with_private_key(bob_locked)
                .with_password("bob's passphrase"),
        )
        .await?
        .into_value()?;
    assert_eq!(opened, order);
    println!("Bob decrypted the document");

    Ok(())
}
