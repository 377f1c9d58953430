//! Error type shared by the manifest and index codecs.

use thiserror::Error;

use crate::template::TemplateError;

/// Errors raised while decoding, querying or editing manifests and indexes.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The input is not valid JSON or does not have the expected shape.
    #[error("failed to decode {kind}: {source} (near: {snippet:?})")]
    Decode {
        /// What was being decoded ("item" or "index").
        kind: &'static str,
        /// The source line the decoder stopped on.
        snippet: String,
        /// The underlying decoder error.
        source: serde_json::Error,
    },

    /// The value could not be serialized.
    #[error("failed to encode {kind}: {source}")]
    Encode {
        /// What was being encoded.
        kind: &'static str,
        /// The underlying encoder error.
        source: serde_json::Error,
    },

    /// A requested version or name is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Neither the revision nor the meta block declares a URL format.
    #[error("url-format is not defined for version {0:?}")]
    UndefinedFormat(String),

    /// A checksum argument does not follow `file:sum[:algo]`.
    #[error("invalid checksum argument: {0}")]
    InvalidChecksum(String),

    /// An index argument does not name an index file or directory.
    #[error("invalid index location: {0}")]
    InvalidIndexPath(String),

    /// Template rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl SchemaError {
    /// Wraps a JSON decode failure with the offending line of `input`.
    pub(crate) fn decode(kind: &'static str, input: &[u8], source: serde_json::Error) -> Self {
        let text = String::from_utf8_lossy(input);
        let snippet = text
            .lines()
            .nth(source.line().saturating_sub(1))
            .map(|line| line.trim().chars().take(120).collect())
            .unwrap_or_default();
        Self::Decode {
            kind,
            snippet,
            source,
        }
    }
}
