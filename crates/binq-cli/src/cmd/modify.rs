//! Modify command

use anyhow::{Context, Result, bail};
use binq_core::io::place::move_file;
use binq_schema::IndiceItem;

use super::{index_root, item_path, require_index, write_if_changed};
use crate::{GlobalArgs, ModifyArgs};

/// Rename an index entry or point it at a new manifest path.
///
/// A new path moves the manifest file; a new name re-sorts the index.
pub fn modify(args: &ModifyArgs, global: &GlobalArgs) -> Result<()> {
    let (index_file, loaded) = require_index(&args.index)?;
    let mut index = loaded.value;

    let Some(entry) = index.find(&args.name).cloned() else {
        bail!(
            "Item not found in index. Name: {}, Index: {}",
            args.name,
            index_file.display()
        );
    };
    let new_name = args.new_name.as_deref().filter(|n| *n != entry.name);
    let new_path = args.path.as_deref().filter(|p| *p != entry.path);
    if new_name.is_none() && new_path.is_none() {
        eprintln!("No change");
        return Ok(());
    }
    if let Some(name) = new_name {
        if index.find(name).is_some() {
            bail!("Item already exists in index: {name}");
        }
    }

    let root = index_root(&index_file);
    let moves = match new_path {
        Some(path) => Some((item_path(root, &entry.path)?, item_path(root, path)?)),
        None => None,
    };

    let updated = IndiceItem::new(
        new_name.unwrap_or(&entry.name),
        new_path.unwrap_or(&entry.path),
    );
    index.swap(&args.name, updated);
    if new_name.is_some() {
        index.sort_by_name();
    }

    let json = index.to_json(true)?;
    write_if_changed(&index_file, &loaded.raw, &json, "Index", global.dry_run)?;

    let Some((from, to)) = moves else {
        return Ok(());
    };
    if global.dry_run {
        eprintln!("Would move {} => {}", from.display(), to.display());
        return Ok(());
    }
    if let Some(dir) = to.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Can't make directory: {}", dir.display()))?;
    }
    move_file(&from, &to)
        .with_context(|| format!("Failed to move file: {} => {}", from.display(), to.display()))?;
    eprintln!("Moved Item JSON: {} => {}", from.display(), to.display());
    Ok(())
}
