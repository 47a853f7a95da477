//! Parameter and master-key provider catalog
//!
//! The fixed parameter space (algorithm suites, frame sizes, encryption
//! contexts, RSA paddings) and the functions that turn a keys manifest into
//! every provider set worth testing. Everything here is a pure function of
//! its input and yields in a stable order.

use std::collections::BTreeMap;

use crate::error::{ManifestError, ManifestResult};
use crate::keys::{KeyDescriptor, KeyType, KeysManifest, split_on_decryptable};
use crate::master_key::{MasterKeySpec, PaddingHash, ProviderSet, RawMasterKey, RsaPadding};

/// AWS Encryption SDK algorithm suite ids, as four-digit hex strings
pub const ALGORITHM_SUITES: [&str; 11] = [
    "0014", "0046", "0078", "0114", "0146", "0178", "0214", "0346", "0378", "0478", "0578",
];

/// Frame sizes in bytes; zero means an unframed message
pub const FRAME_SIZES: [u32; 5] = [
    0,     // unframed
    512,   // more than ten frames
    4096,  // smaller than the plaintext
    10240, // equal to the plaintext
    20480, // larger than the plaintext
];

/// Paddings exercised with every decryptable raw RSA key
pub const RAW_RSA_PADDING_ALGORITHMS: [RsaPadding; 5] = [
    RsaPadding::pkcs1(),
    RsaPadding::oaep(PaddingHash::Sha1),
    RsaPadding::oaep(PaddingHash::Sha256),
    RsaPadding::oaep(PaddingHash::Sha384),
    RsaPadding::oaep(PaddingHash::Sha512),
];

/// Padding forced onto raw RSA keys that cannot decrypt
pub const RAW_RSA_BLACKHOLE_PADDING: RsaPadding = RsaPadding::oaep(PaddingHash::Sha256);

pub type EncryptionContext = BTreeMap<String, String>;

fn context(pairs: &[(&str, &str)]) -> EncryptionContext {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn empty_encryption_context() -> EncryptionContext {
    EncryptionContext::new()
}

pub fn non_unicode_encryption_context() -> EncryptionContext {
    context(&[("key1", "val1"), ("key2", "val2")])
}

pub fn unicode_encryption_context() -> EncryptionContext {
    context(&[
        ("key1", "val1"),
        ("unicode_key_ловие", "unicode_value_Предисл"),
    ])
}

/// Control characters in the key, printable ASCII with a quote in the value
pub fn unprintable_unicode_encryption_context() -> EncryptionContext {
    context(&[("key1", "val1"), ("\u{1}\u{2}\u{3}", " \"D")])
}

/// Every encryption context used in the bulk matrix
pub fn encryption_contexts() -> [EncryptionContext; 4] {
    [
        empty_encryption_context(),
        non_unicode_encryption_context(),
        unicode_encryption_context(),
        unprintable_unicode_encryption_context(),
    ]
}

/// Single raw AES key per `aes` key in the manifest
pub fn raw_aes_providers(keys: &KeysManifest) -> Vec<ProviderSet> {
    keys.with_algorithm("aes")
        .map(|(name, _)| vec![MasterKeySpec::raw_aes(name)])
        .collect()
}

/// Raw RSA keys across every padding, alone and alongside each blackhole
pub fn raw_rsa_providers(keys: &KeysManifest) -> Vec<ProviderSet> {
    let split = split_on_decryptable(keys.with_algorithm("rsa"), |name, _| {
        RawMasterKey::rsa(name, "rsa")
    });

    let mut sets = Vec::new();
    for key in &split.cyclable {
        for padding in RAW_RSA_PADDING_ALGORITHMS {
            let key = key.with_padding(padding);
            sets.push(vec![MasterKeySpec::Raw(key.clone())]);

            for blackhole in &split.encrypt_only {
                let blackhole = blackhole.with_padding(RAW_RSA_BLACKHOLE_PADDING);
                sets.push(vec![MasterKeySpec::Raw(key.clone()), MasterKeySpec::Raw(blackhole)]);
            }
        }
    }
    sets
}

/// AWS KMS keys alone and alongside each encrypt-only KMS key
pub fn aws_kms_providers(keys: &KeysManifest) -> Vec<ProviderSet> {
    let split = split_on_decryptable(keys.with_type(KeyType::AwsKms), |name, _| {
        MasterKeySpec::aws_kms(name)
    });

    let mut sets = Vec::new();
    for key in &split.cyclable {
        sets.push(vec![key.clone()]);
        for blackhole in &split.encrypt_only {
            sets.push(vec![key.clone(), blackhole.clone()]);
        }
    }
    sets
}

/// Public/private halves of the same asymmetric key, matched on `key-id`
///
/// Every public and private key must carry a `key-id`.
pub fn raw_asymmetric_pair_providers(keys: &KeysManifest) -> ManifestResult<Vec<ProviderSet>> {
    let build = |name: &str, algorithm: Option<&str>| {
        MasterKeySpec::Raw(RawMasterKey::rsa(name, algorithm.unwrap_or("rsa")))
    };
    let key_id = |name: &str, key: &KeyDescriptor| {
        key.key_id.clone().ok_or_else(|| ManifestError::MissingKeyId(name.to_string()))
    };

    let mut sets = Vec::new();
    for (public_name, public) in keys.with_type(KeyType::Public) {
        let public_id = key_id(public_name, public)?;
        for (private_name, private) in keys.with_type(KeyType::Private) {
            if key_id(private_name, private)? == public_id {
                sets.push(vec![
                    build(public_name, public.algorithm.as_deref()),
                    build(private_name, private.algorithm.as_deref()),
                ]);
            }
        }
    }
    Ok(sets)
}

/// KMS followed by raw AES
pub fn symmetric_providers(keys: &KeysManifest) -> Vec<ProviderSet> {
    let mut sets = aws_kms_providers(keys);
    sets.extend(raw_aes_providers(keys));
    sets
}

/// KMS, raw AES, then raw RSA: the provider sets of the bulk matrix
pub fn providers(keys: &KeysManifest) -> Vec<ProviderSet> {
    let mut sets = symmetric_providers(keys);
    sets.extend(raw_rsa_providers(keys));
    sets
}

/// [`providers`] followed by the public/private asymmetric pairs
pub fn providers_with_asymmetric_pairs(keys: &KeysManifest) -> ManifestResult<Vec<ProviderSet>> {
    let mut sets = providers(keys);
    sets.extend(raw_asymmetric_pair_providers(keys)?);
    Ok(sets)
}
