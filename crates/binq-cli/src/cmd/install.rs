//! Install command

use anyhow::Result;
use binq_core::{ClientConfig, InstallOptions, Installer, Verification};

use crate::ui::ConsoleReporter;
use crate::{GlobalArgs, InstallArgs};

/// Install one source into the output directory.
pub async fn install(args: &InstallArgs, global: &GlobalArgs) -> Result<()> {
    let reporter = ConsoleReporter::new(global.quiet);
    let config = ClientConfig::new(args.server.clone());

    let mut opts = InstallOptions::new(args.source.as_str(), args.dir.as_path());
    opts.file_name.clone_from(&args.file);
    opts.extract = !args.no_extract;
    opts.executable = !args.no_exec;
    opts.param = args.platform.format_param();
    opts.newer_than.clone_from(&args.newer_than);

    let installer = Installer::new(&config, &reporter);
    if global.dry_run {
        let resolved = installer.resolve(&opts).await?;
        println!("{}", resolved.url);
        return Ok(());
    }

    let installed = installer.run(&opts).await?;
    if let Verification::Mismatch { .. } = installed.verification {
        tracing::warn!(url = %installed.url, "installed despite checksum mismatch");
    }
    Ok(())
}
