use std::fs;
use std::path::PathBuf;

use awses_manifest::generator::{
    DISCOVERY_FILTER_ERROR, EDK_SUBSTITUTE_PROVIDER_INFO, MRK_KEY_MISMATCH_ERROR,
};
use awses_manifest::scenario::SIGNED_TO_UNSIGNED_ONLY_ERROR;
use awses_manifest::{
    DecryptGenerateManifest, EncryptManifest, GenerateConfig, ManifestError, ManifestType,
    build_decrypt_generate_manifest, build_encrypt_manifest, render,
};
use serde_json::{Value, json};
use tempfile::TempDir;

const AES_ONLY_KEYS: &str = r#"{
    "manifest": {"type": "keys", "version": 3},
    "keys": {
        "k1": {"type": "symmetric", "algorithm": "aes", "bits": 256, "encoding": "base64",
               "encrypt": true, "decrypt": true, "material": "AAAA", "key-id": "k1"}
    }
}"#;

const FULL_KEYS: &str = r#"{
    "manifest": {"type": "keys", "version": 3},
    "keys": {
        "aes-256": {"type": "symmetric", "algorithm": "aes", "encrypt": true, "decrypt": true},
        "rsa-4096-private": {"type": "private", "algorithm": "rsa", "encrypt": true, "decrypt": true,
                             "key-id": "rsa-4096"},
        "rsa-4096-public": {"type": "public", "algorithm": "rsa", "encrypt": true, "decrypt": false,
                            "key-id": "rsa-4096"},
        "us-west-2-decryptable": {"type": "aws-kms", "encrypt": true, "decrypt": true,
                                  "key-id": "arn:aws:kms:us-west-2:658956600833:key/b3537ef1"},
        "us-west-2-encrypt-only": {"type": "aws-kms", "encrypt": true, "decrypt": false,
                                   "key-id": "arn:aws:kms:us-west-2:658956600833:key/590fd781"},
        "us-west-2-mrk": {"type": "aws-kms", "encrypt": true, "decrypt": true,
                          "key-id": "arn:aws:kms:us-west-2:658956600833:key/mrk-80bd8ecdcd4342aebd84b7dc9da498a7"},
        "us-east-1-mrk": {"type": "aws-kms", "encrypt": true, "decrypt": true,
                          "key-id": "arn:aws:kms:us-east-1:658956600833:key/mrk-80bd8ecdcd4342aebd84b7dc9da498a7"}
    }
}"#;

fn write_keys(dir: &TempDir, contents: &str) -> PathBuf {
    awses_logging::init_testing();
    let path = dir.path().join("keys.json");
    fs::write(&path, contents).expect("Failed to write keys manifest");
    path
}

fn to_value(manifest: &DecryptGenerateManifest) -> Value {
    serde_json::to_value(manifest).expect("Failed to serialize manifest")
}

fn tests_of(value: &Value) -> Vec<&Value> {
    value["tests"]
        .as_object()
        .expect("tests should be an object")
        .values()
        .collect()
}

#[test]
fn test_aes_only_manifest_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, AES_ONLY_KEYS);

    let manifest = build_decrypt_generate_manifest(&path).expect("Failed to build manifest");
    let value = to_value(&manifest);

    assert_eq!(value["manifest"], json!({"type": "awses-decrypt-generate", "version": 2}));
    assert_eq!(value["plaintexts"], json!({"zero": 0, "tiny": 10, "small": 10240}));

    // 2 plaintexts × 11 suites × 5 frame sizes × 4 contexts × 1 provider set,
    // 6 edge cases, 22 × 8 bad ciphertexts, 3 bad configurations, 5 good
    assert_eq!(manifest.tests.len(), 2 * 220 + 6 + 176 + 3 + 5);

    let expected_keys = json!([{
        "type": "raw",
        "key": "k1",
        "provider-id": "aws-raw-vectors-persistent-aes",
        "encryption-algorithm": "aes"
    }]);
    let bulk: Vec<_> = manifest.tests.values().take(440).collect();
    for case in &bulk {
        let scenario = serde_json::to_value(&case.encryption_scenario).unwrap();
        assert_eq!(scenario["master-keys"], expected_keys);
        assert!(case.tampering.is_none());
        assert!(case.result.is_none());
    }
}

#[cfg(unix)]
#[test]
fn test_keys_uri_points_at_keys_file() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, AES_ONLY_KEYS);

    let manifest = build_decrypt_generate_manifest(&path).unwrap();
    assert_eq!(manifest.keys, format!("file://{}", path.display()));
    assert!(manifest.keys.ends_with("/keys.json"));
}

#[test]
fn test_unsigned_only_rejection_is_present() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, AES_ONLY_KEYS);
    let value = to_value(&build_decrypt_generate_manifest(&path).unwrap());

    let rejected: Vec<_> = tests_of(&value)
        .into_iter()
        .filter(|t| t["decryption-method"] == "streaming-unsigned-only")
        .collect();
    assert_eq!(rejected.len(), 2);

    let signed = rejected
        .iter()
        .find(|t| t["encryption-scenario"]["algorithm"] == "0378")
        .expect("signed suite case should exist");
    assert_eq!(
        signed["result"]["error"]["error-description"],
        SIGNED_TO_UNSIGNED_ONLY_ERROR
    );
}

#[test]
fn test_edk_substitution_case() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, FULL_KEYS);
    let value = to_value(&build_decrypt_generate_manifest(&path).unwrap());

    let substituted: Vec<_> = tests_of(&value)
        .into_iter()
        .filter(|t| {
            t["tampering"]["change-edk-provider-info"] == json!([EDK_SUBSTITUTE_PROVIDER_INFO])
        })
        .collect();
    assert_eq!(substituted.len(), 1);
    assert_eq!(
        substituted[0]["decryption-master-keys"],
        json!([{"type": "aws-kms", "key": "us-west-2-encrypt-only"}])
    );
}

#[test]
fn test_mrk_expected_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, FULL_KEYS);
    let value = to_value(&build_decrypt_generate_manifest(&path).unwrap());

    let errors: Vec<_> = tests_of(&value)
        .into_iter()
        .filter_map(|t| t["result"]["error"]["error-description"].as_str())
        .collect();
    assert_eq!(errors.iter().filter(|e| **e == MRK_KEY_MISMATCH_ERROR).count(), 1);
    assert_eq!(errors.iter().filter(|e| **e == DISCOVERY_FILTER_ERROR).count(), 2);
}

#[test]
fn test_full_keys_provider_sets() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, FULL_KEYS);
    let manifest = build_decrypt_generate_manifest(&path).unwrap();

    // kms: 3 decryptable × (alone + encrypt-only), aes: 1, rsa: 5 × (alone + public)
    let sets = 3 * 2 + 1 + 5 * 2;
    assert_eq!(manifest.tests.len(), 2 * 220 * sets + 6 + 176 + 3 + 5);

    let bulk_keys: Vec<_> = manifest
        .tests
        .values()
        .take(220 * sets)
        .map(|case| case.encryption_scenario.master_keys.len())
        .collect();
    assert!(bulk_keys.iter().all(|n| *n == 1 || *n == 2));
}

#[test]
fn test_human_and_compact_render_same_manifest_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, AES_ONLY_KEYS);

    let mut config = GenerateConfig::new(&path);
    let compact = render(&config).unwrap();
    config.human = true;
    let human = render(&config).unwrap();

    assert!(!compact.contains('\n'));
    assert!(human.starts_with("{\n    \"manifest\": {\n        \"type\""));

    let compact: DecryptGenerateManifest = serde_json::from_str(&compact).unwrap();
    let human: DecryptGenerateManifest = serde_json::from_str(&human).unwrap();
    assert_eq!(compact.manifest, human.manifest);
    assert_eq!(compact.keys, human.keys);
    assert_eq!(compact.tests.len(), human.tests.len());
    // identifiers are fresh on every run
    assert!(compact.tests.ids().zip(human.tests.ids()).all(|(a, b)| a != b));
}

#[test]
fn test_rendered_manifest_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, FULL_KEYS);

    let manifest = build_decrypt_generate_manifest(&path).unwrap();
    let json = manifest.to_json(true).unwrap();
    let parsed: DecryptGenerateManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, manifest);
}

#[test]
fn test_encrypt_manifest() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, FULL_KEYS);

    let mut config = GenerateConfig::new(&path);
    config.manifest_type = ManifestType::Encrypt;
    let manifest: EncryptManifest = serde_json::from_str(&render(&config).unwrap()).unwrap();

    assert_eq!(manifest.manifest.manifest_type, "awses-encrypt");
    assert_eq!(manifest.manifest.version, 1);

    // bulk provider sets plus the rsa-4096 public/private pair
    let sets = 3 * 2 + 1 + 5 * 2 + 1;
    assert_eq!(manifest.tests.len(), 220 * sets);

    let direct = build_encrypt_manifest(&path).unwrap();
    assert_eq!(direct.tests.len(), manifest.tests.len());
}

#[test]
fn test_unknown_key_types_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(
        &dir,
        r#"{"keys": {
            "k1": {"type": "symmetric", "algorithm": "aes", "encrypt": true, "decrypt": true},
            "ecdh": {"type": "raw-ecdh", "algorithm": "ecdh", "encrypt": true, "decrypt": true}
        }}"#,
    );

    let manifest = build_decrypt_generate_manifest(&path).expect("unknown key kinds are skipped");
    assert_eq!(manifest.tests.len(), 2 * 220 + 6 + 176 + 3 + 5);
    assert!(build_encrypt_manifest(&path).is_ok());
}

#[test]
fn test_unpaired_public_key_fails_encrypt_manifest() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(
        &dir,
        r#"{"keys": {
            "k1": {"type": "symmetric", "algorithm": "aes", "encrypt": true, "decrypt": true},
            "rsa-public": {"type": "public", "algorithm": "rsa", "encrypt": true, "decrypt": false}
        }}"#,
    );

    let err = build_encrypt_manifest(&path).unwrap_err();
    assert!(matches!(err, ManifestError::MissingKeyId(name) if name == "rsa-public"));
    // the decrypt-generation manifest never pairs keys
    assert!(build_decrypt_generate_manifest(&path).is_ok());
}

#[test]
fn test_missing_keys_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let err = build_decrypt_generate_manifest(&path).unwrap_err();
    assert!(matches!(err, ManifestError::ReadKeys { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_invalid_keys_file() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(&dir, "{\"keys\": [");

    let err = build_decrypt_generate_manifest(&path).unwrap_err();
    assert!(matches!(err, ManifestError::ParseKeys { .. }));
}

#[test]
fn test_keys_without_aes_key() {
    let dir = TempDir::new().unwrap();
    let path = write_keys(
        &dir,
        r#"{"keys": {"kms": {"type": "aws-kms", "encrypt": true, "decrypt": true}}}"#,
    );

    let err = build_decrypt_generate_manifest(&path).unwrap_err();
    assert!(matches!(err, ManifestError::NoSymmetricKey));

    // the encrypt manifest has no edge cases and still builds
    assert!(build_encrypt_manifest(&path).is_ok());
}
