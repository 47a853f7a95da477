//! Test scenario model
//!
//! A scenario tells the external runner how to produce a ciphertext and what
//! decrypting it must yield. Expected failures are plain data here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::EncryptionContext;
use crate::master_key::ProviderSet;

/// Rejection reason for a signed message given to the unsigned-only decryptor
pub const SIGNED_TO_UNSIGNED_ONLY_ERROR: &str =
    "Signed message input to streaming unsigned-only decryption method";

/// Plaintext size classes known to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plaintext {
    Zero,
    Tiny,
    Small,
}

impl Plaintext {
    pub const ALL: [Plaintext; 3] = [Plaintext::Zero, Plaintext::Tiny, Plaintext::Small];

    /// Size of the generated plaintext in bytes
    pub const fn size(self) -> u64 {
        match self {
            Plaintext::Zero => 0,
            Plaintext::Tiny => 10,
            Plaintext::Small => 10 * 1024,
        }
    }

    /// The `plaintexts` catalog of a manifest
    pub fn catalog() -> BTreeMap<Plaintext, u64> {
        Self::ALL.into_iter().map(|p| (p, p.size())).collect()
    }
}

/// How to produce the ciphertext under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EncryptionScenario {
    pub plaintext: Plaintext,
    pub algorithm: String,
    pub frame_size: u32,
    pub encryption_context: EncryptionContext,
    pub master_keys: ProviderSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecryptionMethod {
    /// Streaming decryption that only accepts unsigned algorithm suites
    StreamingUnsignedOnly,
}

/// Post-encryption corruption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TamperingKind {
    /// Drop trailing bytes
    Truncate,
    /// Flip bytes
    Mutate,
    /// Corrupt only the trailing signature
    HalfSign,
}

impl TamperingKind {
    pub const ALL: [TamperingKind; 3] = [
        TamperingKind::Truncate,
        TamperingKind::Mutate,
        TamperingKind::HalfSign,
    ];
}

/// Replace the provider info of every encrypted data key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangeEdkProviderInfo {
    pub change_edk_provider_info: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tampering {
    Kind(TamperingKind),
    ChangeEdkProviderInfo(ChangeEdkProviderInfo),
}

impl Tampering {
    pub fn change_edk_provider_info<I, S>(provider_infos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ChangeEdkProviderInfo(ChangeEdkProviderInfo {
            change_edk_provider_info: provider_infos.into_iter().map(Into::into).collect(),
        })
    }
}

impl From<TamperingKind> for Tampering {
    fn from(kind: TamperingKind) -> Self {
        Self::Kind(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorDescription {
    pub error_description: String,
}

/// Expected outcome; an absent result means decryption succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResult {
    pub error: ErrorDescription,
}

impl ExpectedResult {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            error: ErrorDescription {
                error_description: description.into(),
            },
        }
    }
}

/// One entry of the `tests` mapping of a decrypt-generation manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCase {
    pub encryption_scenario: EncryptionScenario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decryption_method: Option<DecryptionMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tampering: Option<Tampering>,
    /// Keys for decryption when they differ from the encryption keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decryption_master_keys: Option<ProviderSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExpectedResult>,
}

impl TestCase {
    pub fn new(encryption_scenario: EncryptionScenario) -> Self {
        Self {
            encryption_scenario,
            decryption_method: None,
            tampering: None,
            decryption_master_keys: None,
            result: None,
        }
    }

    pub fn with_decryption_method(mut self, method: DecryptionMethod) -> Self {
        self.decryption_method = Some(method);
        self
    }

    pub fn with_tampering(mut self, tampering: impl Into<Tampering>) -> Self {
        self.tampering = Some(tampering.into());
        self
    }

    pub fn with_decryption_master_keys(mut self, keys: ProviderSet) -> Self {
        self.decryption_master_keys = Some(keys);
        self
    }

    pub fn expecting_error(mut self, description: impl Into<String>) -> Self {
        self.result = Some(ExpectedResult::error(description));
        self
    }

    /// Whether the runner must see decryption fail
    ///
    /// Tampering always implies failure, with or without an explicit result.
    pub fn expects_failure(&self) -> bool {
        self.result.is_some() || self.tampering.is_some()
    }
}
