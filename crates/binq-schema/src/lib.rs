//! Manifest, index and template types for binq.
//!
//! An [`Item`] manifest describes one downloadable artifact: a shared
//! [`Meta`] block, a [`Latest`] pointer and a list of [`Revision`]s. Each
//! revision resolves to a concrete URL for a target platform through the
//! template engine in [`template`], and the revision list is edited through
//! the rules in [`revise`].
//!
//! An [`Index`] maps artifact names to manifest locations.

pub mod checksum;
pub mod error;
pub mod index;
pub mod item;
pub mod revise;
pub mod revision;
pub mod template;
pub mod version;

// Re-exports
pub use checksum::{Checksum, ChecksumKind, PLACEHOLDER_DIGEST};
pub use error::SchemaError;
pub use index::{INDEX_FILE_NAME, Index, IndiceItem, resolve_index_file};
pub use item::{Item, Latest, Meta};
pub use revise::ReviseMode;
pub use revision::Revision;
pub use template::{FormatParam, TemplateError};
