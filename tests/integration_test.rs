//! Integration tests for fieldcrypt
//!
//! These tests drive `FieldCryptor` end to end in both key modes.

use fieldcrypt_core::{
    resolve_targets, CryptConfig, DecryptRequest, Document, EncryptRequest, FieldCryptError,
    FieldCryptor, PathSchema, SelectionMode,
};
use fieldcrypt_crypto::{KdfParams, KeyPair, LockedSecretKey};
use rstest::rstest;
use serde_json::{json, Value};

const PASSWORD: &str = "thats my kung fu";
const ORDER_IDS: &str = "Account.Order.$.OrderID";

fn plain_text() -> Value {
    json!({
        "Account": {
            "Account Name": "Firefly",
            "Order": [
                {
                    "OrderID": "order103",
                    "Product": [
                        {
                            "Product Name": "Bowler Hat",
                            "ProductID": 858383,
                            "SKU": "0406654608",
                            "Description": {
                                "Colour": "Purple",
                                "Width": 300,
                                "Height": 200,
                                "Depth": 210,
                                "Weight": 0.75
                            },
                            "Price": 34.45,
                            "Quantity": 2
                        },
                        {
                            "Product Name": "Trilby hat",
                            "ProductID": 858236,
                            "SKU": "0406634348",
                            "Description": {
                                "Colour": "Orange",
                                "Width": 300,
                                "Height": 200,
                                "Depth": 210,
                                "Weight": 0.6
                            },
                            "Price": 21.67,
                            "Quantity": 1
                        }
                    ]
                },
                {
                    "OrderID": "order104",
                    "Product": [
                        {
                            "Product Name": "Bowler Hat",
                            "ProductID": 858383,
                            "SKU": "040657863",
                            "Description": {
                                "Colour": "Purple",
                                "Width": 300,
                                "Height": 200,
                                "Depth": 210,
                                "Weight": 0.75
                            },
                            "Price": 34.45,
                            "Quantity": 4
                        },
                        {
                            "ProductID": 345664,
                            "SKU": "0406654603",
                            "Product Name": "Cloak",
                            "Description": {
                                "Colour": "Black",
                                "Width": 30,
                                "Height": 20,
                                "Depth": 210,
                                "Weight": 2
                            },
                            "Price": 107.99,
                            "Quantity": 1
                        }
                    ]
                }
            ]
        }
    })
}

fn cryptor() -> FieldCryptor {
    FieldCryptor::new(
        CryptConfig::default()
            .with_kdf(KdfParams::new(256, 1, 1))
            .with_max_concurrency(8),
    )
}

fn locked(kp: &KeyPair, passphrase: &str) -> String {
    LockedSecretKey::lock(kp.secret_key(), passphrase, &KdfParams::new(256, 1, 1)).unwrap()
}

fn is_token(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.starts_with("_data:"))
}

async fn encrypt_value(request: EncryptRequest) -> Value {
    cryptor().encrypt(request).await.unwrap().into_value().unwrap()
}

async fn decrypt_value(request: DecryptRequest) -> Result<Value, FieldCryptError> {
    cryptor().decrypt(request).await?.into_value()
}

/// Symmetric mode without a salt
#[tokio::test]
async fn test_password_without_salt() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await;

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// Symmetric mode with a salt
#[tokio::test]
async fn test_password_with_salt() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_salt("somesalt"),
    )
    .await;

    let opened = decrypt_value(
        DecryptRequest::new(sealed.clone())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_salt("somesalt"),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());

    let err = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_salt("othersalt"),
    )
    .await
    .unwrap_err();
    assert!(err.is_decryption());
}

/// A salt is only a suffix of the passphrase
#[tokio::test]
async fn test_salt_concatenates_with_password() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password("thats my")
            .with_salt(" kung fu"),
    )
    .await;

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// Asymmetric mode with a single recipient
#[tokio::test]
async fn test_single_recipient() {
    let alice = KeyPair::generate();
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_public_keys([alice.public_key().to_base64()]),
    )
    .await;

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_private_key(locked(&alice, PASSWORD)),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// Asymmetric mode with several recipients; each can decrypt on their own
#[tokio::test]
async fn test_multiple_recipients() {
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let bob_passphrase = "something else Alice doesn't know";

    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_public_keys([alice.public_key().to_base64(), bob.public_key().to_base64()]),
    )
    .await;

    for (kp, passphrase) in [(&alice, PASSWORD), (&bob, bob_passphrase)] {
        let opened = decrypt_value(
            DecryptRequest::new(sealed.clone())
                .with_fields([ORDER_IDS])
                .with_password(passphrase)
                .with_private_key(locked(kp, passphrase)),
        )
        .await
        .unwrap();
        assert_eq!(opened, plain_text());
    }
}

/// A private key that was not a recipient cannot decrypt
#[tokio::test]
async fn test_unrelated_private_key() {
    let alice = KeyPair::generate();
    let eve = KeyPair::generate();
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_public_keys([alice.public_key().to_base64()]),
    )
    .await;

    let err = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password("eve")
            .with_private_key(locked(&eve, "eve")),
    )
    .await
    .unwrap_err();
    assert!(err.is_decryption());
}

/// A wrong passphrase for the private key is a key error
#[tokio::test]
async fn test_wrong_private_key_passphrase() {
    let alice = KeyPair::generate();
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_public_keys([alice.public_key().to_base64()]),
    )
    .await;

    let err = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password("not it")
            .with_private_key(locked(&alice, PASSWORD)),
    )
    .await
    .unwrap_err();
    assert!(err.is_key());
}

/// Inclusion touches only matched leaves and keeps sibling types
#[tokio::test]
async fn test_inclusion_preserves_other_leaves() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await;

    let orders = sealed["Account"]["Order"].as_array().unwrap();
    for order in orders {
        assert!(is_token(&order["OrderID"]));
        let product = &order["Product"][0];
        assert!(product["ProductID"].is_u64());
        assert!(product["Price"].is_f64());
        assert!(product["Product Name"].is_string());
        assert!(!is_token(&product["Product Name"]));
    }
    assert_eq!(sealed["Account"]["Account Name"], "Firefly");
}

/// Exclusion encrypts every leaf except the matched ones
#[tokio::test]
async fn test_exclusion_encrypts_the_rest() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_exclude_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await;

    assert_eq!(sealed["Account"]["Order"][0]["OrderID"], "order103");
    assert_eq!(sealed["Account"]["Order"][1]["OrderID"], "order104");
    assert!(is_token(&sealed["Account"]["Account Name"]));
    assert!(is_token(&sealed["Account"]["Order"][1]["Product"][1]["Description"]["Weight"]));

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_exclude_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// Selection rules are pinned by `resolve_targets`
#[test]
fn test_selection_rules() {
    let doc = plain_text();
    let schema = PathSchema::parse([ORDER_IDS]).unwrap();

    let included = resolve_targets(&doc, &schema, SelectionMode::Include);
    assert_eq!(included.len(), 2);

    let excluded = resolve_targets(&doc, &schema, SelectionMode::Exclude);
    let total = resolve_targets(&doc, &PathSchema::parse(["Account"]).unwrap(), SelectionMode::Include);
    assert_eq!(excluded.len() + included.len(), total.len());
}

/// Tag written and checked with the same key
#[tokio::test]
async fn test_integrity_tag_roundtrip() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("tag-key"),
    )
    .await;
    assert!(sealed["Account"]["Order"][0]["OrderID"]
        .as_str()
        .unwrap()
        .contains(";_hmac:"));

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("tag-key"),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// Tag key mismatch is an integrity error
#[tokio::test]
async fn test_integrity_tag_mismatch() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("tag-key"),
    )
    .await;

    let err = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("another-key"),
    )
    .await
    .unwrap_err();
    assert!(err.is_integrity());
}

/// A tag present but not requested is ignored
#[tokio::test]
async fn test_integrity_tag_not_requested() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("tag-key"),
    )
    .await;

    let opened = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await
    .unwrap();
    assert_eq!(opened, plain_text());
}

/// A tag requested but absent is a format error
#[tokio::test]
async fn test_integrity_tag_absent() {
    let sealed = encrypt_value(
        EncryptRequest::new(plain_text())
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD),
    )
    .await;

    let err = decrypt_value(
        DecryptRequest::new(sealed)
            .with_fields([ORDER_IDS])
            .with_password(PASSWORD)
            .with_hmac_key("tag-key"),
    )
    .await
    .unwrap_err();
    assert!(err.is_format());
}

/// Text in gives text out, value in gives value out
#[tokio::test]
async fn test_representation_is_preserved() {
    let cryptor = cryptor();

    let from_text = cryptor
        .encrypt(
            EncryptRequest::new(plain_text().to_string())
                .with_fields([ORDER_IDS])
                .with_password(PASSWORD),
        )
        .await
        .unwrap();
    assert!(matches!(from_text, Document::Text(_)));

    let from_value = cryptor
        .encrypt(
            EncryptRequest::new(plain_text())
                .with_fields([ORDER_IDS])
                .with_password(PASSWORD),
        )
        .await
        .unwrap();
    assert!(matches!(from_value, Document::Value(_)));

    let opened = cryptor
        .decrypt(
            DecryptRequest::new(from_text)
                .with_fields([ORDER_IDS])
                .with_password(PASSWORD),
        )
        .await
        .unwrap();
    assert!(matches!(&opened, Document::Text(_)));
    assert_eq!(opened.into_value().unwrap(), plain_text());
}

/// Request errors surface before any key is parsed
#[rstest]
#[case::both_lists(&["a"], &["b"], Some("pw"), None)]
#[case::no_list(&[], &[], Some("pw"), None)]
#[case::no_password(&["a"], &[], None, None)]
#[case::empty_recipients(&["a"], &[], Some("pw"), Some(Vec::new()))]
#[tokio::test]
async fn test_configuration_errors(
    #[case] fields: &[&str],
    #[case] exclude: &[&str],
    #[case] password: Option<&str>,
    #[case] public_keys: Option<Vec<String>>,
) {
    let mut request = EncryptRequest::new(plain_text())
        .with_fields(fields.iter().copied())
        .with_exclude_fields(exclude.iter().copied());
    if let Some(password) = password {
        request = request.with_password(password);
    }
    if let Some(keys) = public_keys {
        request = request.with_public_keys(keys);
    }
    let err = cryptor().encrypt(request).await.unwrap_err();
    assert!(err.is_configuration(), "unexpected error: {err}");
}

/// Mutual exclusivity is checked even when the keys are garbage
#[tokio::test]
async fn test_exclusivity_checked_before_keys() {
    let err = cryptor()
        .decrypt(
            DecryptRequest::new(plain_text())
                .with_fields(["a"])
                .with_exclude_fields(["b"])
                .with_password("pw")
                .with_private_key("definitely not a key"),
        )
        .await
        .unwrap_err();
    assert!(err.is_configuration());
}

/// The default configuration works through the free functions
#[tokio::test]
async fn test_free_functions_with_defaults() {
    let sealed = fieldcrypt_core::encrypt(
        EncryptRequest::new(json!({"secret": 42, "public": 1}))
            .with_fields(["secret"])
            .with_password(PASSWORD),
    )
    .await
    .unwrap();

    let opened = fieldcrypt_core::decrypt(
        DecryptRequest::new(sealed)
            .with_fields(["secret"])
            .with_password(PASSWORD),
    )
    .await
    .unwrap()
    .into_value()
    .unwrap();
    assert_eq!(opened, json!({"secret": 42, "public": 1}));
}
