//! Command implementations plus the file helpers they share.

pub mod deregister;
pub mod hash;
pub mod index;
pub mod install;
pub mod modify;
pub mod new;
pub mod register;
pub mod revise;
pub mod verify;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use binq_schema::{Index, Item, resolve_index_file};
use tracing::warn;

/// A decoded document together with the text it came from.
#[derive(Debug)]
pub(crate) struct Loaded<T> {
    pub(crate) value: T,
    pub(crate) raw: String,
}

pub(crate) fn read_item(path: &Path) -> Result<Loaded<Item>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read Item JSON: {}", path.display()))?;
    let value = Item::from_json(&raw)
        .with_context(|| format!("Failed to decode Item JSON: {}", path.display()))?;
    Ok(Loaded { value, raw })
}

/// Reads an index file; `None` when it doesn't exist.
pub(crate) fn read_index(path: &Path) -> Result<Option<Loaded<Index>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read index: {}", path.display()));
        }
    };
    let value = Index::decode(raw.as_bytes())
        .with_context(|| format!("Failed to decode index: {}", path.display()))?;
    Ok(Some(Loaded { value, raw }))
}

/// Resolves an index argument and reads the index, which must exist.
pub(crate) fn require_index(arg: &Path) -> Result<(PathBuf, Loaded<Index>)> {
    let file = resolve_index_file(arg)?;
    let loaded =
        read_index(&file)?.ok_or_else(|| anyhow!("Index not found: {}", file.display()))?;
    Ok((file, loaded))
}

/// Directory that item paths in the index at `index_file` are relative to.
pub(crate) fn index_root(index_file: &Path) -> &Path {
    index_file.parent().unwrap_or_else(|| Path::new(""))
}

/// Joins an index entry path onto `root`.
///
/// Entry paths must stay inside the index directory: absolute paths and
/// `..` components are rejected.
pub(crate) fn item_path(root: &Path, rel: &str) -> Result<PathBuf> {
    let path = Path::new(rel);
    let inside = !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        bail!("Item path must be relative to the index directory: {rel}");
    }
    Ok(root.join(path))
}

/// Removes an item file; a missing file only warns.
pub(crate) fn remove_item_file(path: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        eprintln!("Would delete {}", path.display());
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => {
            eprintln!("Deleted Item JSON: {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "can't remove file; not found");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Can't remove file: {}", path.display())),
    }
}

/// Writes `json` to `path` unless it equals `prev`.
///
/// With `dry_run` the JSON goes to stdout instead. Returns whether the file
/// was written.
pub(crate) fn write_if_changed(
    path: &Path,
    prev: &str,
    json: &str,
    kind: &str,
    dry_run: bool,
) -> Result<bool> {
    if prev.trim_end_matches(['\r', '\n']) == json {
        eprintln!("{kind} has no change");
        return Ok(false);
    }
    if dry_run {
        println!("{json}");
        return Ok(false);
    }
    write_json(path, json)?;
    eprintln!("Updated {}", path.display());
    Ok(true)
}

/// Writes `json` plus a trailing newline, creating parent directories.
pub(crate) fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Can't make directory: {}", dir.display()))?;
    }
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Can't write file: {}", path.display()))
}

/// Parses `key:value,key:value`; malformed pairs are skipped with a warning.
pub(crate) fn parse_map(arg: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for kv in arg.split(',').filter(|kv| !kv.is_empty()) {
        match kv.split(':').collect::<Vec<_>>().as_slice() {
            [key, value] => {
                map.insert((*key).to_string(), (*value).to_string());
            }
            _ => warn!(pair = kv, "wrong argument for key:value map; skipped"),
        }
    }
    map
}
