//! One published version of an artifact.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::checksum::Checksum;
use crate::error::SchemaError;
use crate::item::Meta;
use crate::template::{self, FormatParam, TemplateError};

/// A published version and its per-version overrides.
///
/// Empty fields mean "inherit from the item's meta block"; see
/// [`Item::revision`](crate::Item::revision).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Revision {
    /// Free-form version string, unique within an item.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// Digests of the files this version publishes.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub checksums: Vec<Checksum>,

    /// URL template override.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub url_format: String,

    /// Value-keyed placeholder rewrites, e.g. `"amd64": "x86_64"`.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub replacements: BTreeMap<String, String>,

    /// OS to file extension, with a `"default"` fallback key.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub extension: BTreeMap<String, String>,

    /// Filename template to literal rename.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub rename_files: BTreeMap<String, String>,
}

/// Treats an explicit JSON `null` like an omitted field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Revision {
    /// A revision with only a version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Fills every empty field from `meta`.
    pub fn inherit(mut self, meta: &Meta) -> Self {
        if self.url_format.is_empty() {
            self.url_format.clone_from(&meta.url_format);
        }
        if self.replacements.is_empty() {
            self.replacements.clone_from(&meta.replacements);
        }
        if self.extension.is_empty() {
            self.extension.clone_from(&meta.extension);
        }
        if self.rename_files.is_empty() {
            self.rename_files.clone_from(&meta.rename_files);
        }
        self
    }

    /// The checksum recorded for `file`; records without a digest don't count.
    pub fn checksum(&self, file: &str) -> Option<&Checksum> {
        self.checksums
            .iter()
            .find(|sum| sum.file == file && !sum.is_empty())
    }

    /// Replaces the checksum for the same file, or appends it.
    pub fn add_or_swap_checksum(&mut self, sum: Checksum) {
        match self.checksums.iter_mut().find(|s| s.file == sum.file) {
            Some(slot) => *slot = sum,
            None => self.checksums.push(sum),
        }
    }

    /// Resolves the download URL for `param`'s platform.
    ///
    /// The revision's own version always wins over `param.version`.
    pub fn url(&self, param: &FormatParam) -> Result<String, SchemaError> {
        if self.url_format.is_empty() {
            return Err(SchemaError::UndefinedFormat(self.version.clone()));
        }
        Ok(self.apply_format(&self.url_format, param)?)
    }

    /// Renders an arbitrary template with this revision's placeholders.
    pub fn apply_format(&self, format: &str, param: &FormatParam) -> Result<String, TemplateError> {
        let param = param.clone().with_version(self.version.as_str());
        let vars = template::substitutions(&param, &self.extension, &self.replacements);
        template::render(format, &vars)
    }

    /// Looks up the literal rename for a file called `src`.
    ///
    /// Each rename-files key is rendered for `param`; the value of the first
    /// key that renders to `src` is returned. Keys that fail to render are
    /// logged and skipped.
    pub fn convert_file_name(&self, src: &str, param: &FormatParam) -> Option<&str> {
        self.rename_files.iter().find_map(|(pattern, literal)| {
            match self.apply_format(pattern, param) {
                Ok(rendered) if rendered == src => Some(literal.as_str()),
                Ok(_) => None,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "skipping rename rule");
                    None
                }
            }
        })
    }
}
