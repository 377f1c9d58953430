//! Verify command

use anyhow::{Context, Result, bail};
use binq_core::io::download::{download, filename_from_url};
use binq_core::{ClientConfig, Reporter};
use binq_schema::{Checksum, ReviseMode, Revision};

use super::{read_item, write_if_changed};
use crate::ui::ConsoleReporter;
use crate::{GlobalArgs, VerifyArgs};

/// Download one version of an item and check, or record, its checksum.
///
/// A file without a recorded checksum gets the computed digest written back
/// to the manifest. A mismatch against a real checksum is only reported.
pub async fn verify(args: &VerifyArgs, global: &GlobalArgs) -> Result<()> {
    let reporter = ConsoleReporter::new(global.quiet);
    let loaded = read_item(&args.item)?;
    let mut item = loaded.value;

    let rev = match args.revision.as_deref() {
        Some(v) => item
            .require_revision(Some(v))
            .with_context(|| format!("Version not found: {v}"))?,
        None => item
            .require_revision(None)
            .context("Can't get latest item revision")?,
    };
    let url = rev.url(&args.platform.format_param())?;
    let file = filename_from_url(&url);
    if file.is_empty() {
        bail!("Can't get file name from URL: {url}");
    }

    let mut checksum = if let Some(sum) = rev.checksum(&file) {
        sum.clone()
    } else {
        reporter.notice(&format!("Checksum is not provided for {file}"));
        Checksum::placeholder(&file)
    };

    let tmp = tempfile::Builder::new().prefix("binq-verify.").tempdir()?;
    let dest = tmp.path().join(&file);
    eprintln!("GET {url}");
    let client = ClientConfig::default().download_client()?;
    let verification = download(&client, &url, &dest, Some(&mut checksum), &reporter).await?;

    if args.keep {
        let dir = tmp.keep();
        eprintln!("Downloaded item remains at {}", dir.join(&file).display());
    }
    if !verification.changed() {
        return Ok(());
    }

    if !item.update_revision_checksum(&rev.version, checksum.clone()) {
        // Latest resolved from meta only; give it an entry of its own.
        let mut entry = Revision::new(rev.version.as_str());
        entry.add_or_swap_checksum(checksum);
        item.add_or_update_revision(entry, ReviseMode::Natural);
    }
    let json = item.to_json(true)?;
    write_if_changed(&args.item, &loaded.raw, &json, "Item", global.dry_run)?;
    Ok(())
}
