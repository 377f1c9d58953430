//! binq - download, verify and install single-binary tools
#![allow(missing_docs)]
#![allow(clippy::doc_markdown)]
//!
//! The `binq` binary installs executables described by item manifests and
//! maintains those manifests and the indexes that list them.
//!
//! # Commands
//!
//! - `install` fetches a URL or an indexed item, checks its checksum and
//!   places the executables.
//! - `new`, `revise` and `verify` author item manifests.
//! - `register`, `modify`, `deregister` and `index` maintain a local index
//!   directory that can be served as an index server.
//! - `hash` prints checksums in manifest syntax.

pub mod cmd;
pub mod ui;

use std::path::PathBuf;

use binq_schema::FormatParam;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "binq")]
#[command(author, version, about = "binq - download, verify and install single-binary tools")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Print the resulting JSON instead of writing files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show informational log messages
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Show debug log messages
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a binary or archive from a URL or an index server
    Install(InstallArgs),
    /// List items on an index server or in a local index
    Index(IndexArgs),
    /// Generate a skeleton item manifest
    New(NewArgs),
    /// Add, edit or delete a version in an item manifest
    Revise(ReviseArgs),
    /// Download a version and check or record its checksum
    Verify(VerifyArgs),
    /// Register an item manifest in a local index
    Register(RegisterArgs),
    /// Rename an item or move its manifest within a local index
    Modify(ModifyArgs),
    /// Remove an item from a local index
    Deregister(DeregisterArgs),
    /// Print checksums of files in manifest syntax
    Hash(HashArgs),
}

/// Target platform overrides shared by `install` and `verify`.
#[derive(Debug, Clone, Default, Args)]
pub struct PlatformArgs {
    /// Target OS (linux, darwin, windows, ...)
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (amd64, arm64, 386, ...)
    #[arg(long)]
    pub arch: Option<String>,
}

impl PlatformArgs {
    /// The running platform with any overrides applied.
    pub fn format_param(&self) -> FormatParam {
        let mut param = FormatParam::current();
        if let Some(os) = &self.os {
            param.os.clone_from(os);
        }
        if let Some(arch) = &self.arch {
            param.arch.clone_from(arch);
        }
        param
    }
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// URL or item name, optionally with a version: tool or tool@1.2.0
    pub source: String,

    /// Output directory
    #[arg(short, long, env = "BINQ_BIN_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Output file name for a non-archive download
    #[arg(short, long)]
    pub file: Option<String>,

    /// Index server URL [default: https://binqry.github.io/index/]
    #[arg(short, long, env = binq_core::config::SERVER_ENV)]
    pub server: Option<String>,

    /// Don't extract archives
    #[arg(short = 'z', long)]
    pub no_extract: bool,

    /// Don't mark the downloaded file executable
    #[arg(short = 'X', long)]
    pub no_exec: bool,

    /// Only install when the resolved version is newer than this
    #[arg(long, value_name = "VERSION")]
    pub newer_than: Option<String>,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

/// How `binq index` prints the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned name/path table
    #[default]
    Text,
    /// The index document as pretty JSON
    Json,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Local index directory or index.json; omit to query the server
    pub index: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Index server URL [default: https://binqry.github.io/index/]
    #[arg(short, long, env = binq_core::config::SERVER_ENV)]
    pub server: Option<String>,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// URL template, e.g. https://example.com/v{{.Version}}/tool-{{.OS}}-{{.Arch}}{{.Ext}}
    pub url_format: String,

    /// Initial version
    pub version: Option<String>,

    /// Replacements: amd64:x86_64,darwin:apple-darwin
    #[arg(short, long = "replace", value_name = "REPLACEMENTS")]
    pub replacements: Option<String>,

    /// Extensions: default:.tar.gz,windows:.zip
    #[arg(short, long = "ext", value_name = "EXTENSIONS")]
    pub extension: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReviseArgs {
    /// Item manifest file
    pub item: PathBuf,

    /// Version to add, update or delete
    pub version: String,

    /// Checksums: FILE:SUM[:ALGO],...
    #[arg(short = 's', long = "sum", value_name = "CHECKSUMS")]
    pub sums: Option<String>,

    /// URL template for this version
    #[arg(short, long = "url", value_name = "URL_FORMAT")]
    pub url_format: Option<String>,

    /// Replacements for this version: amd64:x86_64,...
    #[arg(short, long = "replace", value_name = "REPLACEMENTS")]
    pub replacements: Option<String>,

    /// Extensions for this version: default:.tar.gz,...
    #[arg(short, long = "ext", value_name = "EXTENSIONS")]
    pub extension: Option<String>,

    /// Make this version the latest
    #[arg(long, conflicts_with = "no_latest")]
    pub latest: bool,

    /// Don't make this version the latest
    #[arg(long)]
    pub no_latest: bool,

    /// Delete the version
    #[arg(long, conflicts_with_all = ["latest", "no_latest", "sums", "url_format"])]
    pub delete: bool,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Item manifest file
    pub item: PathBuf,

    /// Version to verify (default: latest)
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub revision: Option<String>,

    /// Keep the downloaded file
    #[arg(long)]
    pub keep: bool,

    #[command(flatten)]
    pub platform: PlatformArgs,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Local index directory or index.json
    pub index: PathBuf,

    /// Item manifest file to register
    pub item: PathBuf,

    /// Item name (default: manifest file stem)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Manifest path relative to the index directory
    #[arg(short, long)]
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct ModifyArgs {
    /// Local index directory or index.json
    pub index: PathBuf,

    /// Item name
    pub name: String,

    /// New item name
    #[arg(short = 'n', long = "name", value_name = "NEW_NAME")]
    pub new_name: Option<String>,

    /// New manifest path relative to the index directory
    #[arg(short, long)]
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeregisterArgs {
    /// Local index directory or index.json
    pub index: PathBuf,

    /// Item name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct HashArgs {
    /// Files to hash
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Use CRC-32 instead of SHA-256
    #[arg(long)]
    pub crc: bool,
}
