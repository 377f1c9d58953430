//! The install runner: resolve a source, download it with verification,
//! extract it and place the executables.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use binq_schema::{FormatParam, Revision, SchemaError, version};
use thiserror::Error;
use tracing::{debug, info};

use crate::Reporter;
use crate::client::{ClientError, IndexClient};
use crate::config::ClientConfig;
use crate::io::download::{DownloadError, download, filename_from_url};
use crate::io::extract::{ArchiveFormat, ExtractError, extract};
use crate::io::place::{move_file, place_executables, set_executable};
use crate::source::SourceSpec;
use crate::verify::Verification;

/// Errors that stop an installation.
#[derive(Error, Debug)]
pub enum InstallError {
    /// Item lookup failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The requested version is not in the item.
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    /// The resolved version is not newer than `--newer-than`.
    #[error("Item version {version} is not newer than {threshold}")]
    NotNewer {
        /// Resolved version.
        version: String,
        /// Requested threshold.
        threshold: String,
    },

    /// URL resolution failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The URL has no file name to save under.
    #[error("can't derive a file name from {0}")]
    NoFileName(String),

    /// Download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Placing files failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// URL or `name[@version]`.
    pub source: String,
    /// Install directory.
    pub dest_dir: PathBuf,
    /// Name for a non-archive download.
    pub file_name: Option<String>,
    /// Unpack recognized archives.
    pub extract: bool,
    /// Mark a non-archive download executable.
    pub executable: bool,
    /// Target platform.
    pub param: FormatParam,
    /// Only install when the resolved version is newer than this.
    pub newer_than: Option<String>,
}

impl InstallOptions {
    /// Defaults for `source`: extract, mark executable, current platform.
    pub fn new(source: impl Into<String>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest_dir: dest_dir.into(),
            file_name: None,
            extract: true,
            executable: true,
            param: FormatParam::current(),
            newer_than: None,
        }
    }
}

/// A source resolved to a download URL.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Download URL.
    pub url: String,
    /// The item revision, for named sources.
    pub revision: Option<Revision>,
}

/// Outcome of a finished installation.
#[derive(Debug, Clone)]
pub struct Installed {
    /// Where the artifact came from.
    pub url: String,
    /// Installed version, for named sources.
    pub version: Option<String>,
    /// Checksum outcome.
    pub verification: Verification,
    /// Installed files.
    pub files: Vec<PathBuf>,
}

/// Runs installations with one configuration and reporter.
#[derive(Debug)]
pub struct Installer<'a, R: Reporter + ?Sized> {
    config: &'a ClientConfig,
    reporter: &'a R,
}

impl<'a, R: Reporter + ?Sized> Installer<'a, R> {
    /// Creates an installer.
    pub fn new(config: &'a ClientConfig, reporter: &'a R) -> Self {
        Self { config, reporter }
    }

    /// Turns the source into a URL, consulting the index server for names.
    pub async fn resolve(&self, opts: &InstallOptions) -> Result<Resolved, InstallError> {
        let (name, version) = match SourceSpec::parse(&opts.source) {
            SourceSpec::Url(url) => {
                return Ok(Resolved {
                    url,
                    revision: None,
                });
            }
            SourceSpec::Named { name, version } => (name, version),
        };

        let item = IndexClient::new(self.config)?.item(&name).await?;
        let rev = item
            .require_revision(version.as_deref())
            .map_err(|_| InstallError::VersionNotFound(opts.source.clone()))?;
        self.check_newer(&rev.version, opts.newer_than.as_deref())?;

        let url = rev.url(&opts.param)?;
        debug!(name, version = %rev.version, url, "resolved source");
        Ok(Resolved {
            url,
            revision: Some(rev),
        })
    }

    fn check_newer(&self, version: &str, threshold: Option<&str>) -> Result<(), InstallError> {
        let Some(threshold) = threshold else {
            return Ok(());
        };
        let Some(v) = version::parse(version) else {
            self.reporter.warning(&format!(
                "Can't parse item's version {version} as semantic. Continue installation..."
            ));
            return Ok(());
        };
        let Some(t) = version::parse(threshold) else {
            self.reporter.warning(&format!(
                "Can't parse given version {threshold} as semantic. Continue installation..."
            ));
            return Ok(());
        };
        if version::compare(&v, &t) != Ordering::Greater {
            return Err(InstallError::NotNewer {
                version: version.to_string(),
                threshold: threshold.to_string(),
            });
        }
        Ok(())
    }

    /// Resolves, downloads, verifies, extracts and places `opts.source`.
    pub async fn run(&self, opts: &InstallOptions) -> Result<Installed, InstallError> {
        let Resolved { url, revision } = self.resolve(opts).await?;

        let file_name = filename_from_url(&url);
        if file_name.is_empty() {
            return Err(InstallError::NoFileName(url));
        }
        let tmp = tempfile::Builder::new().prefix("binq.").tempdir()?;
        let download_path = tmp.path().join(&file_name);

        let mut checksum = revision
            .as_ref()
            .and_then(|rev| rev.checksum(&file_name))
            .cloned();

        self.reporter.section("Downloading");
        let client = self.config.download_client().map_err(DownloadError::from)?;
        let verification = download(
            &client,
            &url,
            &download_path,
            checksum.as_mut(),
            self.reporter,
        )
        .await?;

        fs::create_dir_all(&opts.dest_dir)?;
        let files = self.place(&download_path, tmp.path(), opts, revision.as_ref())?;
        for file in &files {
            self.reporter.success(&format!("Installed {}", file.display()));
        }

        Ok(Installed {
            url,
            version: revision.map(|rev| rev.version),
            verification,
            files,
        })
    }

    fn place(
        &self,
        download_path: &Path,
        work_dir: &Path,
        opts: &InstallOptions,
        revision: Option<&Revision>,
    ) -> Result<Vec<PathBuf>, InstallError> {
        let rename = |name: &str| {
            revision
                .and_then(|rev| rev.convert_file_name(name, &opts.param))
                .map(str::to_string)
        };
        let format = if opts.extract {
            ArchiveFormat::detect(download_path)
        } else {
            None
        };

        if let Some(format) = format {
            info!(archive = %download_path.display(), "extracting");
            let extract_dir = work_dir.join("ext");
            let extracted = extract(download_path, &extract_dir, format)?;
            debug!(count = extracted.len(), "extracted files");
            let files = place_executables(&extracted, &opts.dest_dir, rename)?;
            if files.is_empty() {
                self.reporter.warning("Archive has no executables");
            }
            return Ok(files);
        }

        if opts.extract {
            debug!(file = %download_path.display(), "not an archive, installing as is");
        }
        let original = download_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = opts
            .file_name
            .clone()
            .or_else(|| rename(&original))
            .unwrap_or(original);
        let dest = opts.dest_dir.join(name);
        move_file(download_path, &dest)?;
        if opts.executable {
            set_executable(&dest)?;
        }
        Ok(vec![dest])
    }
}
