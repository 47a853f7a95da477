//! # AWS Encryption SDK test manifests
//!
//! Generates the manifests that drive cross-implementation compatibility
//! testing of the AWS Encryption SDK message format. Nothing here encrypts or
//! decrypts; the generator only describes what an external runner must do and
//! what it must observe.
//!
//! ## Flow
//!
//! keys manifest → provider catalog → scenarios → manifest document
//!
//! - [`keys`]: the keys manifest read from disk
//! - [`master_key`]: master-key provider configurations
//! - [`catalog`]: fixed parameter space and provider sets per key kind
//! - [`arn`]: ARN handling and multi-region key near-misses
//! - [`scenario`]: the test case model
//! - [`generator`]: the bulk matrix, edge cases and MRK groups
//! - [`manifest`]: document assembly and serialization
//! - [`config`]: command-line and generation settings
//!
//! ## Example
//!
//! ```rust,ignore
//! use awses_manifest::{GenerateConfig, render};
//!
//! let mut config = GenerateConfig::new("keys.json");
//! config.human = true;
//! println!("{}", render(&config)?);
//! ```

pub mod arn;
pub mod catalog;
pub mod config;
pub mod error;
pub mod generator;
pub mod keys;
pub mod manifest;
pub mod master_key;
pub mod scenario;

pub use arn::{Arn, mrk_arn_mismatches};
pub use config::{GenerateConfig, ManifestType};
pub use error::{ManifestError, ManifestResult};
pub use generator::ScenarioGenerator;
pub use keys::{KeyDescriptor, KeyType, KeysManifest};
pub use manifest::{
    DecryptGenerateManifest, EncryptManifest, Manifest, TestMap, build_decrypt_generate_manifest,
    build_encrypt_manifest,
};
pub use master_key::{MasterKeySpec, ProviderSet};
pub use scenario::{EncryptionScenario, Plaintext, Tampering, TamperingKind, TestCase};

/// Build the configured manifest and serialize it
pub fn render(config: &GenerateConfig) -> ManifestResult<String> {
    match config.manifest_type {
        ManifestType::DecryptGenerate => {
            build_decrypt_generate_manifest(&config.keys)?.to_json(config.human)
        }
        ManifestType::Encrypt => build_encrypt_manifest(&config.keys)?.to_json(config.human),
    }
}
