//! Per-file digests recorded on a revision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaError;

/// Digest value that marks a checksum as "not yet verified".
///
/// The verify workflow seeds missing checksums with this value; any computed
/// digest then replaces it and the manifest is reported as changed.
pub const PLACEHOLDER_DIGEST: &str = "--dummy--";

/// Digest algorithm of a [`Checksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChecksumKind {
    /// SHA-256, hex encoded.
    #[default]
    Sha256,
    /// CRC-32 (IEEE), hex encoded big-endian.
    Crc32,
}

impl ChecksumKind {
    /// Name used in the `file:sum:algo` argument syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Crc32 => "crc",
        }
    }
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" | "SHA256" | "SHA-256" => Ok(Self::Sha256),
            "crc" | "CRC" => Ok(Self::Crc32),
            _ => Err(SchemaError::InvalidChecksum(format!(
                "unsupported algorithm: {s}"
            ))),
        }
    }
}

/// One digest for one file of a release.
///
/// A record carries exactly one algorithm's value. On the wire it is
/// `{"file": .., "sha256": ..}` or `{"file": .., "crc": ..}`. A record naming
/// both is rejected when decoding; one naming neither decodes with an empty
/// value and counts as "no checksum" (see [`Checksum::is_empty`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChecksum", into = "RawChecksum")]
pub struct Checksum {
    /// File name produced by the download or by extraction.
    pub file: String,
    /// Algorithm of `value`.
    pub kind: ChecksumKind,
    /// Hex-encoded digest.
    pub value: String,
}

#[derive(Serialize, Deserialize)]
struct RawChecksum {
    file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crc: Option<String>,
}

impl TryFrom<RawChecksum> for Checksum {
    type Error = String;

    fn try_from(raw: RawChecksum) -> Result<Self, Self::Error> {
        let sha256 = raw.sha256.filter(|s| !s.is_empty());
        let crc = raw.crc.filter(|s| !s.is_empty());
        let (kind, value) = match (sha256, crc) {
            (Some(value), None) => (ChecksumKind::Sha256, value),
            (None, Some(value)) => (ChecksumKind::Crc32, value),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "checksum for {:?} carries both sha256 and crc",
                    raw.file
                ));
            }
            (None, None) => {
                warn!(file = %raw.file, "checksum record has no digest");
                (ChecksumKind::Sha256, String::new())
            }
        };
        Ok(Self {
            file: raw.file,
            kind,
            value,
        })
    }
}

impl From<Checksum> for RawChecksum {
    fn from(sum: Checksum) -> Self {
        let value = Some(sum.value).filter(|v| !v.is_empty());
        let (sha256, crc) = match sum.kind {
            ChecksumKind::Sha256 => (value, None),
            ChecksumKind::Crc32 => (None, value),
        };
        Self {
            file: sum.file,
            sha256,
            crc,
        }
    }
}

impl Checksum {
    /// Creates a checksum record.
    pub fn new(file: impl Into<String>, kind: ChecksumKind, value: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            value: value.into(),
        }
    }

    /// A SHA-256 record holding [`PLACEHOLDER_DIGEST`].
    pub fn placeholder(file: impl Into<String>) -> Self {
        Self::new(file, ChecksumKind::Sha256, PLACEHOLDER_DIGEST)
    }

    /// Whether the recorded value is the unverified placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.value == PLACEHOLDER_DIGEST
    }

    /// Whether the record carries no digest at all.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replaces the digest, keeping the algorithm.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Compares a computed hex digest against the recorded one, ignoring case.
    pub fn matches(&self, digest: &str) -> bool {
        self.value.eq_ignore_ascii_case(digest)
    }

    /// Parses the command-line form `file:sum[:algo],file:sum[:algo],...`.
    ///
    /// The algorithm defaults to SHA-256. An empty argument yields no records.
    pub fn parse_list(arg: &str) -> Result<Vec<Self>, SchemaError> {
        arg.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let parts: Vec<&str> = entry.split(':').collect();
                match parts.as_slice() {
                    [file, sum] if !file.is_empty() && !sum.is_empty() => {
                        Ok(Self::new(*file, ChecksumKind::Sha256, *sum))
                    }
                    [file, sum, algo] if !file.is_empty() && !sum.is_empty() => {
                        Ok(Self::new(*file, algo.parse()?, *sum))
                    }
                    _ => Err(SchemaError::InvalidChecksum(entry.to_string())),
                }
            })
            .collect()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.value, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_defaults_to_sha256() {
        let sums = Checksum::parse_list("foo.zip:abc,bar:01ff:crc").unwrap();
        assert_eq!(sums.len(), 2);
        assert_eq!(sums[0], Checksum::new("foo.zip", ChecksumKind::Sha256, "abc"));
        assert_eq!(sums[1].kind, ChecksumKind::Crc32);
        assert_eq!(sums[1].value, "01ff");
    }

    #[test]
    fn test_parse_list_accepts_algorithm_spellings() {
        for algo in ["sha256", "SHA256", "SHA-256"] {
            let sums = Checksum::parse_list(&format!("f:00:{algo}")).unwrap();
            assert_eq!(sums[0].kind, ChecksumKind::Sha256);
        }
        assert!(Checksum::parse_list("f:00:md5").is_err());
        assert!(Checksum::parse_list("nodigest").is_err());
        assert!(Checksum::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let sum = Checksum::new("a.tar.gz", ChecksumKind::Crc32, "deadbeef");
        let json = serde_json::to_string(&sum).unwrap();
        assert_eq!(json, r#"{"file":"a.tar.gz","crc":"deadbeef"}"#);
    }

    #[test]
    fn test_both_algorithms_rejected() {
        let res: Result<Checksum, _> =
            serde_json::from_str(r#"{"file":"a","sha256":"00","crc":"11"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_record_without_digest_decodes_empty() {
        let sum: Checksum = serde_json::from_str(r#"{"file":"a","sha256":""}"#).unwrap();
        assert!(sum.is_empty());
        let sum: Checksum = serde_json::from_str(r#"{"file":"a"}"#).unwrap();
        assert!(sum.is_empty());
        assert_eq!(serde_json::to_string(&sum).unwrap(), r#"{"file":"a"}"#);
    }

    #[test]
    fn test_matches_ignores_case() {
        let sum = Checksum::new("a", ChecksumKind::Sha256, "ABCDEF");
        assert!(sum.matches("abcdef"));
        assert!(!sum.matches("abcde0"));
        assert!(Checksum::placeholder("a").is_placeholder());
    }
}
