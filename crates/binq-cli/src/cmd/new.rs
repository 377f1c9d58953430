//! New command

use anyhow::Result;
use binq_schema::{Item, Revision};

use super::{parse_map, write_json};
use crate::{GlobalArgs, NewArgs};

/// Print or write a skeleton item manifest.
pub fn new(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let rev = Revision {
        url_format: args.url_format.clone(),
        replacements: args.replacements.as_deref().map(parse_map).unwrap_or_default(),
        extension: args.extension.as_deref().map(parse_map).unwrap_or_default(),
        ..Revision::new(args.version.clone().unwrap_or_default())
    };
    let json = Item::from_revision(&rev).to_json(true)?;

    match &args.file {
        Some(file) if !global.dry_run => {
            write_json(file, &json)?;
            eprintln!("Written {}", file.display());
        }
        _ => println!("{json}"),
    }
    Ok(())
}
