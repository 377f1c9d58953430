//! Archive extraction module
//!
//! Handles tar.gz, tar.zst, plain tar and zip, picked by file extension.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zstd::stream::Decoder as ZstdDecoder;

/// Errors raised while unpacking an archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Reading the archive or writing an entry failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The archive is malformed or holds an entry outside the destination.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Archive formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// `.tar.zst` / `.tzst`
    TarZst,
    /// `.tar`
    Tar,
    /// `.zip`
    Zip,
}

impl ArchiveFormat {
    /// Detect archive format from file extension; `None` for anything else.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// A regular file written by [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    /// Path relative to extraction root
    pub relative_path: PathBuf,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Whether the archive marks the entry executable
    pub is_executable: bool,
}

/// Extract `archive_path` into `dest_dir` using `format`.
pub fn extract(
    archive_path: &Path,
    dest_dir: &Path,
    format: ArchiveFormat,
) -> Result<Vec<ExtractedFile>, ExtractError> {
    debug!(archive = %archive_path.display(), ?format, "extracting");
    let file = File::open(archive_path)?;
    match format {
        ArchiveFormat::TarZst => extract_tar(ZstdDecoder::new(BufReader::new(file))?, dest_dir),
        ArchiveFormat::TarGz => extract_tar(
            flate2::read::GzDecoder::new(BufReader::new(file)),
            dest_dir,
        ),
        ArchiveFormat::Tar => extract_tar(BufReader::new(file), dest_dir),
        ArchiveFormat::Zip => extract_zip(file, dest_dir),
    }
}

/// Extract the regular files of a tar archive from a reader.
///
/// Links and special entries are skipped, so no later entry can be written
/// through a link into a path outside `dest_dir`.
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<Vec<ExtractedFile>, ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    let mut extracted_files = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_type = entry.header().entry_type();
        if !entry_type.is_file() {
            if entry_type.is_symlink() || entry_type.is_hard_link() {
                debug!(path = %entry.path()?.display(), "skipping link entry");
            }
            continue;
        }

        let relative_path: PathBuf = entry.path()?.components().collect();

        // Reject entries escaping the destination (zip slip)
        let escapes = relative_path.is_absolute()
            || relative_path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes || !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                relative_path.display()
            )));
        }
        let absolute_path = dest_dir.join(&relative_path);

        let is_executable = entry
            .header()
            .mode()
            .map(|m| m & 0o111 != 0)
            .unwrap_or(false);

        extracted_files.push(ExtractedFile {
            relative_path,
            absolute_path,
            is_executable,
        });
    }

    Ok(extracted_files)
}

/// Extract a zip archive
fn extract_zip(file: File, dest_dir: &Path) -> Result<Vec<ExtractedFile>, ExtractError> {
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    fs::create_dir_all(dest_dir)?;
    let mut extracted_files = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let Some(relative_path) = file.enclosed_name() else {
            continue;
        };

        if file.is_dir() {
            fs::create_dir_all(dest_dir.join(&relative_path))?;
            continue;
        }
        if file.is_symlink() {
            debug!(path = %relative_path.display(), "skipping link entry");
            continue;
        }

        let absolute_path = dest_dir.join(&relative_path);
        if let Some(p) = absolute_path.parent() {
            fs::create_dir_all(p)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        let is_executable = if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode & 0o777))?;
            mode & 0o111 != 0
        } else {
            false
        };
        #[cfg(not(unix))]
        let is_executable = false;

        extracted_files.push(ExtractedFile {
            relative_path,
            absolute_path,
            is_executable,
        });
    }

    Ok(extracted_files)
}
