//! Register command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use binq_schema::{Index, IndiceItem, resolve_index_file};
use tracing::{debug, info};

use super::{index_root, item_path, read_index, read_item, remove_item_file, write_if_changed};
use crate::{GlobalArgs, RegisterArgs};

/// Add or update an item in a local index and copy its manifest under the
/// index directory.
pub fn register(args: &RegisterArgs, global: &GlobalArgs) -> Result<()> {
    let index_file = resolve_index_file(&args.index)?;
    let (mut index, prev) = match read_index(&index_file)? {
        Some(loaded) => (loaded.value, loaded.raw),
        None => {
            info!(index = %index_file.display(), "index file doesn't exist; will be created");
            eprintln!("Index file doesn't exist; will be created");
            (Index::new(), String::new())
        }
    };

    let item = read_item(&args.item)?.value;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .item
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let item_file = args.item.to_string_lossy();

    let mut old_path = None;
    let path = match (index.find_path(&name).map(str::to_string), &args.path) {
        (None, path) => {
            let path = path
                .clone()
                .unwrap_or_else(|| item.default_index_path(&item_file));
            index.add(IndiceItem::new(name.as_str(), path.as_str()));
            path
        }
        (Some(current), Some(path)) if *path != current => {
            index.swap(&name, IndiceItem::new(name.as_str(), path.as_str()));
            old_path = Some(current);
            path.clone()
        }
        (Some(current), _) => current,
    };
    debug!(%name, %path, "index entry");

    let root = index_root(&index_file);
    let dest = item_path(root, &path)?;
    let old_file = old_path.map(|old| item_path(root, &old)).transpose()?;

    let json = index.to_json(true)?;
    write_if_changed(&index_file, &prev, &json, "Index", global.dry_run)?;

    if is_same_file(&args.item, &dest) {
        debug!(path = %dest.display(), "item file is already in place");
    } else if global.dry_run {
        eprintln!("Would copy {} => {}", args.item.display(), dest.display());
    } else {
        if let Some(dir) = dest.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Can't make directory: {}", dir.display()))?;
        }
        fs::copy(&args.item, &dest).with_context(|| {
            format!(
                "Failed to copy {} => {}",
                args.item.display(),
                dest.display()
            )
        })?;
        eprintln!("Copied Item JSON: {} => {}", args.item.display(), dest.display());
    }

    if let Some(old) = old_file {
        remove_item_file(&old, global.dry_run)?;
    }
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
