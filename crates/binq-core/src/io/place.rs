//! Moves downloaded or extracted executables into their install directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::io::extract::ExtractedFile;

/// Renames `from` to `to`, copying when they live on different filesystems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        debug!(from = %from.display(), to = %to.display(), error = %e, "rename failed, copying");
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

/// Adds the execute bits to `path`. No-op off unix.
pub fn set_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Whether `path` looks runnable: any execute bit on unix, `.exe` elsewhere.
pub fn is_executable(path: &Path, meta: &fs::Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = path;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
    }
}

/// Moves the executable entries of `files` into `dest_dir`.
///
/// An entry counts when the archive marked it executable or the file on
/// disk looks runnable. `rename` maps a file name to its installed name;
/// `None` keeps it. Returns the installed paths.
pub fn place_executables<F>(
    files: &[ExtractedFile],
    dest_dir: &Path,
    rename: F,
) -> io::Result<Vec<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut installed = Vec::new();
    for file in files {
        let path = &file.absolute_path;
        let meta = fs::metadata(path)?;
        if !(file.is_executable || is_executable(path, &meta)) {
            debug!(path = %path.display(), "skipping non-executable");
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let target = dest_dir.join(rename(&name).unwrap_or(name));
        move_file(path, &target)?;
        set_executable(&target)?;
        installed.push(target);
    }
    Ok(installed)
}
