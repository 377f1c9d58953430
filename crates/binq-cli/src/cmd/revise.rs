//! Revise command

use anyhow::{Result, bail};
use binq_schema::{Checksum, ReviseMode, Revision};
use tracing::debug;

use super::{parse_map, read_item, write_if_changed};
use crate::{GlobalArgs, ReviseArgs};

/// Add, replace or delete one version of an item manifest.
pub fn revise(args: &ReviseArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = read_item(&args.item)?;
    let mut item = loaded.value;

    if args.delete {
        if !item.delete_revision(&args.version) {
            bail!("Version does not exist: {}", args.version);
        }
        debug!(version = %args.version, "version deleted");
    } else {
        let mode = if args.latest {
            ReviseMode::Latest
        } else if args.no_latest {
            ReviseMode::Old
        } else {
            ReviseMode::Natural
        };
        let rev = Revision {
            checksums: match &args.sums {
                Some(sums) => Checksum::parse_list(sums)?,
                None => Vec::new(),
            },
            url_format: args.url_format.clone().unwrap_or_default(),
            replacements: args.replacements.as_deref().map(parse_map).unwrap_or_default(),
            extension: args.extension.as_deref().map(parse_map).unwrap_or_default(),
            ..Revision::new(args.version.as_str())
        };
        item.add_or_update_revision(rev, mode);
        debug!(version = %args.version, ?mode, "version revised");
    }

    let json = item.to_json(true)?;
    write_if_changed(&args.item, &loaded.raw, &json, "Item", global.dry_run)?;
    Ok(())
}
