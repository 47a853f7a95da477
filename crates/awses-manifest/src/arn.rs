//! Amazon Resource Names and multi-region key mismatches
//!
//! A KMS key ARN looks like
//! `arn:aws:kms:us-west-2:658956600833:key/mrk-80bd8ecdcd4342aebd84b7dc9da498a7`.
//! Splitting on both `:` and `/` gives seven fields, the literal `arn` being
//! field zero.
//!
//! [`mrk_arn_mismatches`] produces every near-miss of a well-formed MRK ARN
//! that a multi-region aware decryptor must refuse to treat as the same key.

use std::fmt;
use std::str::FromStr;

use crate::error::{ManifestError, ManifestResult};

pub const AWS_KMS_MRK_WEST_ARN: &str =
    "arn:aws:kms:us-west-2:658956600833:key/mrk-80bd8ecdcd4342aebd84b7dc9da498a7";
pub const AWS_KMS_MRK_EAST_ARN: &str =
    "arn:aws:kms:us-east-1:658956600833:key/mrk-80bd8ecdcd4342aebd84b7dc9da498a7";

/// Number of fields in a well-formed key ARN
pub const ARN_FIELDS: usize = 7;

/// Index of the region field. Related multi-region keys differ only here.
pub const REGION_INDEX: usize = 3;

const RESOURCE_TYPE_INDEX: usize = 5;

/// Suffix that turns a field into a wrong-but-similar value.
/// Appended so values such as `mrk-…` keep their prefix.
const MISMATCH_SUFFIX: &str = "-not";

/// Split an ARN on every `:` and `/`
pub fn split_arn(arn: &str) -> Vec<&str> {
    arn.split([':', '/']).collect()
}

/// Join fields back into an ARN
///
/// The first six fields are joined with `:`; anything after them is appended
/// after a `/`, itself `/`-joined. With fewer than seven fields there is no
/// `/` at all.
pub fn build_arn<S: AsRef<str>>(fields: &[S]) -> String {
    let fields: Vec<&str> = fields.iter().map(|f| f.as_ref()).collect();
    if fields.len() <= 6 {
        return fields.join(":");
    }
    format!("{}/{}", fields[..6].join(":"), fields[6..].join("/"))
}

/// A parsed `arn:partition:service:region:account:resource-type/resource-id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    fields: [String; ARN_FIELDS],
}

impl Arn {
    pub fn parse(arn: &str) -> ManifestResult<Self> {
        let fields = split_arn(arn);
        if fields.len() != ARN_FIELDS || fields[0] != "arn" {
            return Err(ManifestError::MalformedArn(arn.to_string()));
        }
        Ok(Self {
            fields: std::array::from_fn(|i| fields[i].to_string()),
        })
    }

    pub fn fields(&self) -> &[String; ARN_FIELDS] {
        &self.fields
    }

    pub fn partition(&self) -> &str {
        &self.fields[1]
    }

    pub fn service(&self) -> &str {
        &self.fields[2]
    }

    pub fn region(&self) -> &str {
        &self.fields[REGION_INDEX]
    }

    pub fn account(&self) -> &str {
        &self.fields[4]
    }

    pub fn resource_type(&self) -> &str {
        &self.fields[RESOURCE_TYPE_INDEX]
    }

    pub fn resource_id(&self) -> &str {
        &self.fields[6]
    }

    /// Whether the resource id names a multi-region key
    pub fn is_multi_region(&self) -> bool {
        self.resource_type() == "key" && self.resource_id().starts_with("mrk-")
    }

    /// Every near-miss of this ARN, in a fixed order
    ///
    /// For each field: the field removed, the field blanked, and the field
    /// with `-not` appended (skipped for the region). Then the resource type
    /// swapped for `alias`, then the bare resource id.
    pub fn mismatches(&self) -> Vec<String> {
        let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        let mut out = Vec::with_capacity(3 * ARN_FIELDS + 1);

        for (index, field) in fields.iter().enumerate() {
            let mut removed = fields.clone();
            removed.remove(index);
            out.push(build_arn(&removed));

            out.push(build_arn(&replaced(&fields, index, "")));

            if index != REGION_INDEX {
                let wrong = format!("{field}{MISMATCH_SUFFIX}");
                out.push(build_arn(&replaced(&fields, index, &wrong)));
            }
        }

        out.push(build_arn(&replaced(&fields, RESOURCE_TYPE_INDEX, "alias")));
        out.push(self.resource_id().to_string());
        out
    }
}

fn replaced<'a>(fields: &[&'a str], index: usize, value: &'a str) -> Vec<&'a str> {
    let mut out = fields.to_vec();
    out[index] = value;
    out
}

impl FromStr for Arn {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", build_arn(&self.fields))
    }
}

/// Near-misses of a multi-region key ARN; see [`Arn::mismatches`]
pub fn mrk_arn_mismatches(arn: &str) -> ManifestResult<Vec<String>> {
    Ok(Arn::parse(arn)?.mismatches())
}
