//! Deregister command

use anyhow::{Result, bail};
use binq_core::Reporter;
use tracing::info;

use super::{index_root, item_path, remove_item_file, require_index, write_if_changed};
use crate::ui::ConsoleReporter;
use crate::{DeregisterArgs, GlobalArgs};

/// Remove an index entry and, unless still referenced, its manifest file.
pub fn deregister(args: &DeregisterArgs, global: &GlobalArgs) -> Result<()> {
    let (index_file, loaded) = require_index(&args.index)?;
    let mut index = loaded.value;

    let Some(entry) = index.find(&args.name).cloned() else {
        bail!(
            "Item not found in index. Name: {}, Index: {}",
            args.name,
            index_file.display()
        );
    };
    index.remove(&entry.name);
    let file = item_path(index_root(&index_file), &entry.path);

    let json = index.to_json(true)?;
    write_if_changed(&index_file, &loaded.raw, &json, "Index", global.dry_run)?;

    if let Some(other) = index.items.iter().find(|i| i.path == entry.path) {
        info!(name = %other.name, path = %other.path, "path still referenced; keeping file");
        eprintln!("Item \"{}\" still refers to \"{}\"", other.name, other.path);
        return Ok(());
    }
    match file {
        Ok(file) => remove_item_file(&file, global.dry_run),
        Err(e) => {
            ConsoleReporter::new(global.quiet).warning(&format!("{e}; file is kept"));
            Ok(())
        }
    }
}
