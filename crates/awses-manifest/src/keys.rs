//! Keys manifest model
//!
//! The keys manifest is produced and owned by the test-vector framework. The
//! generator only reads the key names and the capability flags needed to
//! decide which master-key configurations to emit.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};

/// Kind of key material behind a keys manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "symmetric")]
    Symmetric,
    #[serde(rename = "public", alias = "rsa-public")]
    Public,
    #[serde(rename = "private", alias = "rsa-private")]
    Private,
    #[serde(rename = "aws-kms", alias = "kms")]
    AwsKms,
    /// Any kind the generator has no provider for; such keys are skipped
    #[serde(rename = "other", other)]
    Other,
}

/// One entry of the keys manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyDescriptor {
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    pub encrypt: bool,
    pub decrypt: bool,
    /// Shared by the public and private halves of an asymmetric key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl KeyDescriptor {
    /// Can both encrypt and decrypt
    pub fn is_cyclable(&self) -> bool {
        self.encrypt && self.decrypt
    }

    /// Can encrypt but never decrypt
    pub fn is_blackhole(&self) -> bool {
        self.encrypt && !self.decrypt
    }

    fn has_algorithm(&self, algorithm: &str) -> bool {
        self.algorithm.as_deref() == Some(algorithm)
    }
}

/// Parsed keys manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysManifest {
    /// Header of the keys manifest; carried but not interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<serde_json::Value>,
    pub keys: BTreeMap<String, KeyDescriptor>,
}

impl KeysManifest {
    /// Read and parse a keys manifest from disk
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ManifestError::ReadKeys {
            path: path.to_path_buf(),
            source,
        })?;
        let keys: Self = serde_json::from_str(&data).map_err(|source| ManifestError::ParseKeys {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), keys = keys.keys.len(), "loaded keys manifest");
        Ok(keys)
    }

    /// Build a manifest from `(name, descriptor)` pairs
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = (S, KeyDescriptor)>,
        S: Into<String>,
    {
        Self {
            manifest: None,
            keys: keys.into_iter().map(|(name, key)| (name.into(), key)).collect(),
        }
    }

    /// Keys whose `algorithm` equals `algorithm`
    pub fn with_algorithm<'a>(
        &'a self,
        algorithm: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a KeyDescriptor)> + 'a {
        self.iter().filter(move |(_, key)| key.has_algorithm(algorithm))
    }

    /// Keys of the given type
    pub fn with_type(
        &self,
        key_type: KeyType,
    ) -> impl Iterator<Item = (&str, &KeyDescriptor)> + '_ {
        self.iter().filter(move |(_, key)| key.key_type == key_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyDescriptor)> + '_ {
        self.keys.iter().map(|(name, key)| (name.as_str(), key))
    }
}

/// Keys split into those that can be cycled and those that only encrypt
///
/// Keys that cannot encrypt at all are in neither list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptableSplit<T> {
    pub cyclable: Vec<T>,
    pub encrypt_only: Vec<T>,
}

/// Split `keys` on their decrypt capability, building each entry with `build`
pub fn split_on_decryptable<'a, I, T, F>(keys: I, mut build: F) -> DecryptableSplit<T>
where
    I: IntoIterator<Item = (&'a str, &'a KeyDescriptor)>,
    F: FnMut(&'a str, &'a KeyDescriptor) -> T,
{
    let mut split = DecryptableSplit {
        cyclable: Vec::new(),
        encrypt_only: Vec::new(),
    };
    for (name, key) in keys {
        if key.is_cyclable() {
            split.cyclable.push(build(name, key));
        } else if key.is_blackhole() {
            split.encrypt_only.push(build(name, key));
        }
    }
    split
}

#[cfg(test)]
pub(crate) fn descriptor(
    key_type: KeyType,
    algorithm: Option<&str>,
    encrypt: bool,
    decrypt: bool,
) -> KeyDescriptor {
    KeyDescriptor {
        key_type,
        algorithm: algorithm.map(str::to_string),
        encrypt,
        decrypt,
        key_id: None,
    }
}
