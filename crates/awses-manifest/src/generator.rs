//! Scenario generation
//!
//! Produces, in order:
//!
//! 1. the bulk matrix (algorithm suite × frame size × encryption context ×
//!    provider set) for the `small` plaintext, then again for `zero`;
//! 2. the fixed edge cases (unsigned-only decryption, tampering, EDK
//!    provider-info substitution);
//! 3. the multi-region key groups: bad ciphertext, bad configuration, all good.
//!
//! Identifiers are assigned later, when the cases are folded into a manifest.

use tracing::{debug, info, warn};

use crate::arn::{AWS_KMS_MRK_EAST_ARN, AWS_KMS_MRK_WEST_ARN, Arn};
use crate::catalog::{
    ALGORITHM_SUITES, FRAME_SIZES, encryption_contexts, providers,
    providers_with_asymmetric_pairs, raw_aes_providers, unprintable_unicode_encryption_context,
};
use crate::error::{ManifestError, ManifestResult};
use crate::keys::KeysManifest;
use crate::master_key::{DiscoveryFilter, MasterKeySpec, ProviderSet};
use crate::scenario::{
    DecryptionMethod, EncryptionScenario, Plaintext, SIGNED_TO_UNSIGNED_ONLY_ERROR, Tampering,
    TamperingKind, TestCase,
};

/// Provider info written over the EDKs in the substitution case
pub const EDK_SUBSTITUTE_PROVIDER_INFO: &str =
    "arn:aws:kms:us-west-2:658956600833:alias/EncryptOnly";

/// KMS key that can encrypt but not decrypt
pub const ENCRYPT_ONLY_KMS_KEY: &str = "us-west-2-encrypt-only";

/// Keys manifest names of the two replicas of the test MRK
pub const MRK_WEST_KEY: &str = "us-west-2-mrk";
pub const MRK_EAST_KEY: &str = "us-east-1-mrk";

/// Ordinary single-region KMS key, never a match for the MRK
pub const NON_MRK_KMS_KEY: &str = "us-west-2-decryptable";

/// Account that does not own the MRK
pub const FOREIGN_ACCOUNT: &str = "111122223333";

pub const MRK_KEY_MISMATCH_ERROR: &str =
    "Configured key does not match the encrypted data key provider info";
pub const DISCOVERY_FILTER_ERROR: &str = "Encrypted data key is not allowed by the discovery filter";

const EDGE_CASE_FRAME_SIZE: u32 = 512;
const MRK_ALGORITHM: &str = "0578";

/// Size of the bulk matrix for one plaintext class
pub fn bulk_matrix_size(provider_sets: usize) -> usize {
    ALGORITHM_SUITES.len() * FRAME_SIZES.len() * encryption_contexts().len() * provider_sets
}

/// Every algorithm suite × frame size × encryption context × provider set
pub fn matrix(provider_sets: &[ProviderSet], plaintext: Plaintext) -> Vec<EncryptionScenario> {
    let contexts = encryption_contexts();
    let mut out = Vec::with_capacity(bulk_matrix_size(provider_sets.len()));
    for algorithm in ALGORITHM_SUITES {
        for frame_size in FRAME_SIZES {
            for ec in &contexts {
                for master_keys in provider_sets {
                    out.push(EncryptionScenario {
                        plaintext,
                        algorithm: algorithm.to_string(),
                        frame_size,
                        encryption_context: ec.clone(),
                        master_keys: master_keys.clone(),
                    });
                }
            }
        }
    }
    out
}

// Tiny plaintext, 512-byte frames, unprintable context.
fn edge_scenario(algorithm: &str, master_keys: ProviderSet) -> EncryptionScenario {
    EncryptionScenario {
        plaintext: Plaintext::Tiny,
        algorithm: algorithm.to_string(),
        frame_size: EDGE_CASE_FRAME_SIZE,
        encryption_context: unprintable_unicode_encryption_context(),
        master_keys,
    }
}

/// Multi-region key decryption configurations, derived from the two replica ARNs
#[derive(Debug, Clone)]
pub struct MrkConfigurations {
    west: Arn,
    east: Arn,
}

impl MrkConfigurations {
    pub fn new() -> ManifestResult<Self> {
        Self::from_arns(AWS_KMS_MRK_WEST_ARN, AWS_KMS_MRK_EAST_ARN)
    }

    /// Both ARNs must name multi-region keys
    pub fn from_arns(west: &str, east: &str) -> ManifestResult<Self> {
        let parse = |arn: &str| -> ManifestResult<Arn> {
            let parsed = Arn::parse(arn)?;
            if !parsed.is_multi_region() {
                return Err(ManifestError::MalformedArn(arn.to_string()));
            }
            Ok(parsed)
        };
        Ok(Self {
            west: parse(west)?,
            east: parse(east)?,
        })
    }

    /// Keys the MRK ciphertexts are encrypted with
    pub fn encryption_keys(&self) -> ProviderSet {
        vec![MasterKeySpec::aws_kms_mrk_aware(MRK_WEST_KEY)]
    }

    /// Configurations that must decrypt an untampered MRK ciphertext
    pub fn good(&self) -> Vec<ProviderSet> {
        let owner = DiscoveryFilter::new(self.east.partition(), [self.east.account()]);
        vec![
            vec![MasterKeySpec::aws_kms_mrk_aware(MRK_WEST_KEY)],
            vec![MasterKeySpec::aws_kms_mrk_aware(MRK_EAST_KEY)],
            vec![MasterKeySpec::mrk_discovery(self.west.region(), None)],
            vec![MasterKeySpec::mrk_discovery(self.east.region(), None)],
            vec![MasterKeySpec::mrk_discovery(self.east.region(), Some(owner))],
        ]
    }

    /// Configurations that must refuse an untampered MRK ciphertext,
    /// with the error the runner should report
    pub fn bad(&self) -> Vec<(ProviderSet, &'static str)> {
        let foreign_account = DiscoveryFilter::new(self.west.partition(), [FOREIGN_ACCOUNT]);
        let foreign_partition = DiscoveryFilter::new(
            format!("{}-not", self.west.partition()),
            [self.west.account()],
        );
        vec![
            (
                vec![MasterKeySpec::aws_kms_mrk_aware(NON_MRK_KMS_KEY)],
                MRK_KEY_MISMATCH_ERROR,
            ),
            (
                vec![MasterKeySpec::mrk_discovery(self.west.region(), Some(foreign_account))],
                DISCOVERY_FILTER_ERROR,
            ),
            (
                vec![MasterKeySpec::mrk_discovery(self.west.region(), Some(foreign_partition))],
                DISCOVERY_FILTER_ERROR,
            ),
        ]
    }

    /// Near-misses of the ARN the ciphertexts are encrypted under
    pub fn mismatched_provider_infos(&self) -> Vec<String> {
        self.west.mismatches()
    }
}

/// Builds every scenario for one keys manifest
pub struct ScenarioGenerator<'a> {
    keys: &'a KeysManifest,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(keys: &'a KeysManifest) -> Self {
        Self { keys }
    }

    /// The bulk matrix of the decrypt-generation manifest for `plaintext`
    pub fn bulk_matrix(&self, plaintext: Plaintext) -> Vec<TestCase> {
        let sets = providers(self.keys);
        let cases: Vec<TestCase> = matrix(&sets, plaintext).into_iter().map(TestCase::new).collect();
        debug!(?plaintext, provider_sets = sets.len(), cases = cases.len(), "built bulk matrix");
        cases
    }

    /// Unsigned-only decryption, tampering and EDK provider-info substitution
    pub fn edge_cases(&self) -> ManifestResult<Vec<TestCase>> {
        let aes = raw_aes_providers(self.keys)
            .into_iter()
            .next()
            .ok_or(ManifestError::NoSymmetricKey)?;

        let mut cases = vec![
            TestCase::new(edge_scenario("0178", aes.clone()))
                .with_decryption_method(DecryptionMethod::StreamingUnsignedOnly),
            TestCase::new(edge_scenario("0378", aes.clone()))
                .with_decryption_method(DecryptionMethod::StreamingUnsignedOnly)
                .expecting_error(SIGNED_TO_UNSIGNED_ONLY_ERROR),
        ];

        for tampering in TamperingKind::ALL {
            // half-sign needs a signed suite whose body stays intact
            let algorithm = match tampering {
                TamperingKind::HalfSign => "0478",
                TamperingKind::Truncate | TamperingKind::Mutate => "0578",
            };
            cases.push(TestCase::new(edge_scenario(algorithm, aes.clone())).with_tampering(tampering));
        }

        if !self.keys.contains(ENCRYPT_ONLY_KMS_KEY) {
            warn!(key = ENCRYPT_ONLY_KMS_KEY, "keys manifest lacks the EDK substitution key");
        }
        cases.push(
            TestCase::new(edge_scenario("0578", aes))
                .with_tampering(Tampering::change_edk_provider_info([EDK_SUBSTITUTE_PROVIDER_INFO]))
                .with_decryption_master_keys(vec![MasterKeySpec::aws_kms(ENCRYPT_ONLY_KMS_KEY)]),
        );

        debug!(cases = cases.len(), "built edge cases");
        Ok(cases)
    }

    /// MRK ciphertexts whose EDK provider info is a near-miss of the real ARN,
    /// offered to every good and then every bad configuration.
    /// All of them must fail.
    pub fn mrk_bad_ciphertexts(&self, mrk: &MrkConfigurations) -> Vec<TestCase> {
        let configurations: Vec<ProviderSet> = mrk
            .good()
            .into_iter()
            .chain(mrk.bad().into_iter().map(|(keys, _)| keys))
            .collect();

        let mut cases = Vec::new();
        for provider_info in mrk.mismatched_provider_infos() {
            for decryption_keys in configurations.iter().cloned() {
                cases.push(
                    TestCase::new(edge_scenario(MRK_ALGORITHM, mrk.encryption_keys()))
                        .with_tampering(Tampering::change_edk_provider_info([provider_info.clone()]))
                        .with_decryption_master_keys(decryption_keys),
                );
            }
        }
        cases
    }

    /// Untampered MRK ciphertexts offered to configurations that must refuse them
    pub fn mrk_bad_configurations(&self, mrk: &MrkConfigurations) -> Vec<TestCase> {
        mrk.bad()
            .into_iter()
            .map(|(decryption_keys, error)| {
                TestCase::new(edge_scenario(MRK_ALGORITHM, mrk.encryption_keys()))
                    .with_decryption_master_keys(decryption_keys)
                    .expecting_error(error)
            })
            .collect()
    }

    /// Untampered MRK ciphertexts with every matching configuration
    pub fn mrk_all_good(&self, mrk: &MrkConfigurations) -> Vec<TestCase> {
        mrk.good()
            .into_iter()
            .map(|decryption_keys| {
                TestCase::new(edge_scenario(MRK_ALGORITHM, mrk.encryption_keys()))
                    .with_decryption_master_keys(decryption_keys)
            })
            .collect()
    }

    /// All three MRK groups, in order
    pub fn mrk_cases(&self) -> ManifestResult<Vec<TestCase>> {
        for key in [MRK_WEST_KEY, MRK_EAST_KEY, NON_MRK_KMS_KEY] {
            if !self.keys.contains(key) {
                warn!(key, "keys manifest lacks a key used by the MRK scenarios");
            }
        }

        let mrk = MrkConfigurations::new()?;
        let mut cases = self.mrk_bad_ciphertexts(&mrk);
        cases.extend(self.mrk_bad_configurations(&mrk));
        cases.extend(self.mrk_all_good(&mrk));
        debug!(cases = cases.len(), "built MRK cases");
        Ok(cases)
    }

    /// Every decrypt-generation case, in traversal order
    pub fn decrypt_generate_cases(&self) -> ManifestResult<Vec<TestCase>> {
        let mut cases = self.bulk_matrix(Plaintext::Small);
        cases.extend(self.bulk_matrix(Plaintext::Zero));
        cases.extend(self.edge_cases()?);
        cases.extend(self.mrk_cases()?);
        info!(cases = cases.len(), "generated decrypt-generation cases");
        Ok(cases)
    }

    /// Every encrypt case: the `small` matrix over all providers and asymmetric pairs
    pub fn encrypt_cases(&self) -> ManifestResult<Vec<EncryptionScenario>> {
        let sets = providers_with_asymmetric_pairs(self.keys)?;
        let cases = matrix(&sets, Plaintext::Small);
        info!(provider_sets = sets.len(), cases = cases.len(), "generated encrypt cases");
        Ok(cases)
    }
}
