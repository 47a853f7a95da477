//! Error types for manifest generation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a manifest
///
/// Expected-failure scenarios written into a manifest are data and never
/// surface here. These are failures of the generator itself.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The keys manifest could not be read
    #[error("Cannot read keys manifest {path}: {source}")]
    ReadKeys {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The keys manifest is not valid JSON or lacks required fields
    #[error("Invalid keys manifest {path}: {source}")]
    ParseKeys {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The fixed edge cases need at least one raw AES key
    #[error("Keys manifest has no key with algorithm \"aes\"")]
    NoSymmetricKey,

    /// An asymmetric key cannot be paired without its `key-id`
    #[error("Keys manifest entry {0} has no key-id")]
    MissingKeyId(String),

    /// An ARN does not have the `arn:partition:service:region:account:type/id` shape
    #[error("Malformed ARN: {0}")]
    MalformedArn(String),

    /// The manifest document could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Serialized output was not UTF-8
    #[error("Serialized manifest is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
