//! The item manifest: meta block, latest pointer and revision list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::error::SchemaError;
use crate::index::INDEX_FILE_NAME;
use crate::revision::{Revision, null_as_default};
use crate::template::FormatParam;

/// Item-wide fallback values for every revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Meta {
    /// Shared URL template.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub url_format: String,

    /// Shared value-keyed placeholder rewrites.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub replacements: BTreeMap<String, String>,

    /// Shared OS to extension map.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub extension: BTreeMap<String, String>,

    /// Shared filename template to literal rename map.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub rename_files: BTreeMap<String, String>,
}

/// The currently recommended version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latest {
    /// Version string, empty when nothing is recommended.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

/// Manifest for one downloadable artifact.
///
/// # Example
///
/// ```
/// use binq_schema::{FormatParam, Item};
///
/// let item = Item::from_json(r#"{
///     "meta": {"url-format": "https://dl/{{.Version}}/tool-{{.OS}}-{{.Arch}}"},
///     "latest": {"version": "1.0.0"}
/// }"#).unwrap();
/// let url = item.latest_url(&FormatParam::new("linux", "amd64")).unwrap();
/// assert_eq!(url.as_deref(), Some("https://dl/1.0.0/tool-linux-amd64"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Fallback values for every revision.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,

    /// Latest pointer. Always encoded, even when empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest: Latest,

    /// Revisions, newest first when versions parse.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub versions: Vec<Revision>,
}

impl Item {
    /// Decodes a manifest from JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        serde_json::from_slice(bytes).map_err(|e| SchemaError::decode("item", bytes, e))
    }

    /// Decodes a manifest from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, SchemaError> {
        Self::decode(s.as_bytes())
    }

    /// Encodes the manifest; `pretty` indents with two spaces.
    pub fn to_json(&self, pretty: bool) -> Result<String, SchemaError> {
        let res = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        res.map_err(|source| SchemaError::Encode {
            kind: "item",
            source,
        })
    }

    /// A skeleton manifest whose meta block holds `rev`'s templates and
    /// whose latest pointer and only revision name `rev`'s version.
    ///
    /// An empty version yields no revision and no latest pointer.
    pub fn from_revision(rev: &Revision) -> Self {
        let meta = Meta {
            url_format: rev.url_format.clone(),
            replacements: rev.replacements.clone(),
            extension: rev.extension.clone(),
            rename_files: rev.rename_files.clone(),
        };
        if rev.version.is_empty() {
            return Self {
                meta,
                ..Self::default()
            };
        }
        Self {
            meta,
            latest: Latest {
                version: rev.version.clone(),
            },
            versions: vec![Revision {
                checksums: rev.checksums.clone(),
                ..Revision::new(rev.version.as_str())
            }],
        }
    }

    /// The revision for `version` with meta fallbacks applied.
    pub fn revision(&self, version: &str) -> Option<Revision> {
        self.versions
            .iter()
            .find(|rev| rev.version == version)
            .map(|rev| rev.clone().inherit(&self.meta))
    }

    /// The latest revision, synthesized from meta when it has no entry.
    pub fn latest(&self) -> Option<Revision> {
        let version = self.latest.version.as_str();
        if version.is_empty() {
            return None;
        }
        Some(
            self.revision(version)
                .unwrap_or_else(|| Revision::new(version).inherit(&self.meta)),
        )
    }

    /// `version`, or the latest revision when `None`.
    pub fn require_revision(&self, version: Option<&str>) -> Result<Revision, SchemaError> {
        match version {
            Some(v) => self
                .revision(v)
                .ok_or_else(|| SchemaError::NotFound(format!("version {v}"))),
            None => self
                .latest()
                .ok_or_else(|| SchemaError::NotFound("latest version".to_string())),
        }
    }

    /// URL of the latest revision, `None` when no latest is declared.
    pub fn latest_url(&self, param: &FormatParam) -> Result<Option<String>, SchemaError> {
        self.latest().map(|rev| rev.url(param)).transpose()
    }

    /// Records `sum` on the stored revision `version`.
    ///
    /// Returns `false` when the version has no entry.
    pub fn update_revision_checksum(&mut self, version: &str, sum: Checksum) -> bool {
        match self.versions.iter_mut().find(|rev| rev.version == version) {
            Some(rev) => {
                rev.add_or_swap_checksum(sum);
                true
            }
            None => false,
        }
    }

    /// Where this item should live below an index root.
    ///
    /// `https://github.com/owner/repo/releases/...` maps to
    /// `github.com/owner/repo/index.json`; shorter URL paths keep all of their
    /// segments. Falls back to `item_file` when the URL format has no host.
    pub fn default_index_path(&self, item_file: &str) -> String {
        let Some((_, rest)) = self.meta.url_format.split_once("://") else {
            return item_file.to_string();
        };
        let mut parts = rest.split('/');
        let host = parts.next().unwrap_or_default();
        if host.is_empty() {
            return item_file.to_string();
        }
        let segments: Vec<&str> = parts.filter(|seg| !seg.is_empty()).collect();
        let keep = if segments.len() >= 3 { 2 } else { segments.len() };

        let mut path = vec![host];
        path.extend_from_slice(&segments[..keep]);
        path.push(INDEX_FILE_NAME);
        path.join("/")
    }
}
