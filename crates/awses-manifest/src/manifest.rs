//! Manifest documents
//!
//! A manifest is built once per invocation, serialized, and dropped. Test
//! identifiers are random UUIDs assigned as cases are folded into the
//! `tests` mapping, which keeps generation order when written out.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{MAIN_SEPARATOR, Path};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::info;
use uuid::Uuid;

use crate::error::ManifestResult;
use crate::generator::ScenarioGenerator;
use crate::keys::KeysManifest;
use crate::scenario::{EncryptionScenario, Plaintext, TestCase};

pub const DECRYPT_GENERATE_MANIFEST_TYPE: &str = "awses-decrypt-generate";
pub const DECRYPT_GENERATE_MANIFEST_VERSION: u32 = 2;

pub const ENCRYPT_MANIFEST_TYPE: &str = "awses-encrypt";
pub const ENCRYPT_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    #[serde(rename = "type")]
    pub manifest_type: String,
    pub version: u32,
}

/// Test cases keyed by identifier, serialized as a JSON object in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMap<T> {
    entries: Vec<(Uuid, T)>,
}

impl<T> TestMap<T> {
    /// Give every case a fresh random identifier
    pub fn from_cases(cases: impl IntoIterator<Item = T>) -> Self {
        Self {
            entries: cases.into_iter().map(|case| (Uuid::new_v4(), case)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn ids(&self) -> impl Iterator<Item = &Uuid> + '_ {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, case)| case)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &T)> + '_ {
        self.entries.iter().map(|(id, case)| (id, case))
    }

    /// Same identifiers and cases, ignoring order
    pub fn same_entries(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.len() == other.len() && self.iter().all(|(id, case)| other.get(id) == Some(case))
    }
}

impl<T: Serialize> Serialize for TestMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, case) in &self.entries {
            map.serialize_entry(id, case)?;
        }
        map.end()
    }
}

struct TestMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for TestMapVisitor<T> {
    type Value = TestMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of test identifiers to test cases")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((id, case)) = access.next_entry::<Uuid, T>()? {
            entries.push((id, case));
        }
        Ok(TestMap { entries })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TestMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TestMapVisitor(PhantomData))
    }
}

/// Root document handed to the test runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Manifest<T> {
    pub manifest: ManifestHeader,
    pub keys: String,
    pub plaintexts: BTreeMap<Plaintext, u64>,
    pub tests: TestMap<T>,
}

pub type DecryptGenerateManifest = Manifest<TestCase>;
pub type EncryptManifest = Manifest<EncryptionScenario>;

impl<T: Serialize> Manifest<T> {
    pub fn new(manifest_type: &str, version: u32, keys_uri: String, tests: TestMap<T>) -> Self {
        Self {
            manifest: ManifestHeader {
                manifest_type: manifest_type.to_string(),
                version,
            },
            keys: keys_uri,
            plaintexts: Plaintext::catalog(),
            tests,
        }
    }

    /// Serialize; `human` indents with four spaces, otherwise compact
    pub fn to_json(&self, human: bool) -> ManifestResult<String> {
        if !human {
            return Ok(serde_json::to_string(self)?);
        }
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(out)?)
    }
}

/// `file://` followed by the path as given, with `/` separators
///
/// Relative paths stay relative, resolved by the runner against its own
/// working directory.
pub fn keys_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace(MAIN_SEPARATOR, "/");
    format!("file://{path}")
}

/// Decrypt-generation manifest for already parsed keys
pub fn decrypt_generate_manifest(
    keys: &KeysManifest,
    keys_uri: String,
) -> ManifestResult<DecryptGenerateManifest> {
    let cases = ScenarioGenerator::new(keys).decrypt_generate_cases()?;
    Ok(Manifest::new(
        DECRYPT_GENERATE_MANIFEST_TYPE,
        DECRYPT_GENERATE_MANIFEST_VERSION,
        keys_uri,
        TestMap::from_cases(cases),
    ))
}

/// Encrypt manifest for already parsed keys
pub fn encrypt_manifest(keys: &KeysManifest, keys_uri: String) -> ManifestResult<EncryptManifest> {
    let cases = ScenarioGenerator::new(keys).encrypt_cases()?;
    Ok(Manifest::new(
        ENCRYPT_MANIFEST_TYPE,
        ENCRYPT_MANIFEST_VERSION,
        keys_uri,
        TestMap::from_cases(cases),
    ))
}

/// Read the keys manifest at `keys_path` and build the decrypt-generation manifest
pub fn build_decrypt_generate_manifest(keys_path: &Path) -> ManifestResult<DecryptGenerateManifest> {
    let keys = KeysManifest::load(keys_path)?;
    let manifest = decrypt_generate_manifest(&keys, keys_uri(keys_path))?;
    info!(tests = manifest.tests.len(), keys = %manifest.keys, "built decrypt-generation manifest");
    Ok(manifest)
}

/// Read the keys manifest at `keys_path` and build the encrypt manifest
pub fn build_encrypt_manifest(keys_path: &Path) -> ManifestResult<EncryptManifest> {
    let keys = KeysManifest::load(keys_path)?;
    let manifest = encrypt_manifest(&keys, keys_uri(keys_path))?;
    info!(tests = manifest.tests.len(), keys = %manifest.keys, "built encrypt manifest");
    Ok(manifest)
}
