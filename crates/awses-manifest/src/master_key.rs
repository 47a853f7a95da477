//! Master-key provider configurations as they appear in a manifest
//!
//! A configuration names a key from the keys manifest (or, for discovery
//! mode, a region and filter) together with the provider-specific options the
//! test runner needs to instantiate the master key.

use serde::{Deserialize, Serialize};

/// Provider id of raw AES master keys in the test-vector framework
pub const RAW_AES_PROVIDER_ID: &str = "aws-raw-vectors-persistent-aes";

/// Provider id of raw RSA master keys in the test-vector framework
pub const RAW_RSA_PROVIDER_ID: &str = "aws-raw-vectors-persistent-rsa";

/// One master key supplied to an encrypt or decrypt operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MasterKeySpec {
    /// Raw AES or RSA key held locally by the runner
    Raw(RawMasterKey),
    /// AWS KMS key addressed by keys manifest name
    AwsKms(KmsMasterKey),
    /// Multi-region aware AWS KMS key
    AwsKmsMrkAware(KmsMasterKey),
    /// Multi-region aware discovery: no pinned key, only a region and filter
    AwsKmsMrkAwareDiscovery(MrkDiscovery),
}

/// Ordered, non-empty list of master keys for one operation
pub type ProviderSet = Vec<MasterKeySpec>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawMasterKey {
    pub key: String,
    pub provider_id: String,
    pub encryption_algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_algorithm: Option<PaddingAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_hash: Option<PaddingHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmsMasterKey {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MrkDiscovery {
    pub default_mrk_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_kms_discovery_filter: Option<DiscoveryFilter>,
}

/// Restricts discovery to keys in one partition and a set of accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryFilter {
    pub partition: String,
    pub account_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingAlgorithm {
    Pkcs1,
    OaepMgf1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingHash {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// RSA padding scheme, applied on top of a raw RSA master key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RsaPadding {
    pub algorithm: PaddingAlgorithm,
    pub hash: Option<PaddingHash>,
}

impl RsaPadding {
    pub const fn pkcs1() -> Self {
        Self {
            algorithm: PaddingAlgorithm::Pkcs1,
            hash: None,
        }
    }

    pub const fn oaep(hash: PaddingHash) -> Self {
        Self {
            algorithm: PaddingAlgorithm::OaepMgf1,
            hash: Some(hash),
        }
    }
}

impl RawMasterKey {
    /// Raw AES key with the persistent AES provider id
    pub fn aes(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            provider_id: RAW_AES_PROVIDER_ID.to_string(),
            encryption_algorithm: "aes".to_string(),
            padding_algorithm: None,
            padding_hash: None,
        }
    }

    /// Raw asymmetric key with the persistent RSA provider id
    pub fn rsa(key: impl Into<String>, encryption_algorithm: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            provider_id: RAW_RSA_PROVIDER_ID.to_string(),
            encryption_algorithm: encryption_algorithm.into(),
            padding_algorithm: None,
            padding_hash: None,
        }
    }

    /// Copy of this key with `padding` applied, replacing any previous padding
    pub fn with_padding(&self, padding: RsaPadding) -> Self {
        Self {
            padding_algorithm: Some(padding.algorithm),
            padding_hash: padding.hash,
            ..self.clone()
        }
    }
}

impl MasterKeySpec {
    pub fn raw_aes(key: impl Into<String>) -> Self {
        Self::Raw(RawMasterKey::aes(key))
    }

    pub fn aws_kms(key: impl Into<String>) -> Self {
        Self::AwsKms(KmsMasterKey { key: key.into() })
    }

    pub fn aws_kms_mrk_aware(key: impl Into<String>) -> Self {
        Self::AwsKmsMrkAware(KmsMasterKey { key: key.into() })
    }

    pub fn mrk_discovery(region: impl Into<String>, filter: Option<DiscoveryFilter>) -> Self {
        Self::AwsKmsMrkAwareDiscovery(MrkDiscovery {
            default_mrk_region: region.into(),
            aws_kms_discovery_filter: filter,
        })
    }

    /// Keys manifest name referenced by this configuration, if any
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Self::Raw(raw) => Some(&raw.key),
            Self::AwsKms(kms) | Self::AwsKmsMrkAware(kms) => Some(&kms.key),
            Self::AwsKmsMrkAwareDiscovery(_) => None,
        }
    }
}

impl DiscoveryFilter {
    pub fn new<I, S>(partition: impl Into<String>, account_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            partition: partition.into(),
            account_ids: account_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_aes_wire_shape() {
        let value = serde_json::to_value(MasterKeySpec::raw_aes("k1")).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "raw",
                "key": "k1",
                "provider-id": "aws-raw-vectors-persistent-aes",
                "encryption-algorithm": "aes"
            })
        );
    }

    #[test]
    fn raw_rsa_padding_wire_shape() {
        let key = RawMasterKey::rsa("rsa-4096-private", "rsa").with_padding(RsaPadding::oaep(PaddingHash::Sha384));
        let value = serde_json::to_value(MasterKeySpec::Raw(key)).unwrap();
        assert_eq!(value["padding-algorithm"], "oaep-mgf1");
        assert_eq!(value["padding-hash"], "sha384");
        assert_eq!(value["provider-id"], "aws-raw-vectors-persistent-rsa");
    }

    #[test]
    fn pkcs1_has_no_hash() {
        let key = RawMasterKey::rsa("rsa", "rsa")
            .with_padding(RsaPadding::oaep(PaddingHash::Sha1))
            .with_padding(RsaPadding::pkcs1());
        let value = serde_json::to_value(MasterKeySpec::Raw(key)).unwrap();
        assert_eq!(value["padding-algorithm"], "pkcs1");
        assert!(value.get("padding-hash").is_none());
    }

    #[test]
    fn kms_variants_wire_shape() {
        assert_eq!(
            serde_json::to_value(MasterKeySpec::aws_kms("us-west-2-decryptable")).unwrap(),
            json!({"type": "aws-kms", "key": "us-west-2-decryptable"})
        );
        assert_eq!(
            serde_json::to_value(MasterKeySpec::aws_kms_mrk_aware("us-east-1-mrk")).unwrap(),
            json!({"type": "aws-kms-mrk-aware", "key": "us-east-1-mrk"})
        );
    }

    #[test]
    fn discovery_wire_shape() {
        let filtered = MasterKeySpec::mrk_discovery(
            "us-east-1",
            Some(DiscoveryFilter::new("aws", ["658956600833"])),
        );
        assert_eq!(
            serde_json::to_value(&filtered).unwrap(),
            json!({
                "type": "aws-kms-mrk-aware-discovery",
                "default-mrk-region": "us-east-1",
                "aws-kms-discovery-filter": {
                    "partition": "aws",
                    "account-ids": ["658956600833"]
                }
            })
        );

        let open = MasterKeySpec::mrk_discovery("us-west-2", None);
        let value = serde_json::to_value(&open).unwrap();
        assert!(value.get("aws-kms-discovery-filter").is_none());
        assert_eq!(open.key_name(), None);
    }

    #[test]
    fn parses_back_from_json() {
        let spec: MasterKeySpec = serde_json::from_value(json!({
            "type": "raw",
            "key": "rsa-4096-public",
            "provider-id": "aws-raw-vectors-persistent-rsa",
            "encryption-algorithm": "rsa",
            "padding-algorithm": "oaep-mgf1",
            "padding-hash": "sha256"
        }))
        .unwrap();
        let MasterKeySpec::Raw(raw) = spec else {
            panic!("expected raw master key");
        };
        assert_eq!(raw.padding_algorithm, Some(PaddingAlgorithm::OaepMgf1));
        assert_eq!(raw.padding_hash, Some(PaddingHash::Sha256));
    }
}
