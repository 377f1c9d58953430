//! Hash command

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use binq_core::verify::digest_reader;
use binq_schema::{Checksum, ChecksumKind};

use crate::HashArgs;

/// Print each file's digest as a `FILE:SUM[:ALGO]` checksum argument.
pub fn hash(args: &HashArgs) -> Result<()> {
    let kind = if args.crc {
        ChecksumKind::Crc32
    } else {
        ChecksumKind::Sha256
    };
    let mut sums = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let digest = digest_reader(kind, BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sums.push(Checksum::new(name, kind, digest));
    }
    for sum in &sums {
        println!("{sum}");
    }
    Ok(())
}
