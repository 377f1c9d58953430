//! Verified downloads, index-server client and the install runner for binq.
//!
//! The pieces here consume the manifest types of [`binq_schema`]:
//!
//! - [`verify`] hashes a byte stream while it is written to disk and compares
//!   the digest against a recorded [`Checksum`](binq_schema::Checksum).
//! - [`io::download`] streams an HTTP response through that pipeline.
//! - [`client`] looks up item manifests on an index server.
//! - [`install`] ties source resolution, download, extraction and placement
//!   together.
//!
//! Progress and notices go through an explicitly passed [`Reporter`].

pub mod client;
pub mod config;
pub mod install;
pub mod io;
pub mod reporter;
pub mod source;
pub mod verify;

pub use client::{ClientError, IndexClient};
pub use config::ClientConfig;
pub use install::{InstallError, InstallOptions, Installed, Installer};
pub use reporter::{NullReporter, Reporter};
pub use source::SourceSpec;
pub use verify::{Verification, verify_download};

/// User Agent string sent with every request.
pub const USER_AGENT: &str = concat!("binq/", env!("CARGO_PKG_VERSION"));
