//! Index command

use anyhow::{Context, Result};
use binq_core::{ClientConfig, IndexClient};

use super::require_index;
use crate::{IndexArgs, OutputFormat};

/// List the items of a local index, or of the index server.
pub async fn index(args: &IndexArgs) -> Result<()> {
    let index = match &args.index {
        Some(arg) => require_index(arg)?.1.value,
        None => {
            let client = IndexClient::new(&ClientConfig::new(args.server.clone()))?;
            client
                .index()
                .await
                .with_context(|| format!("Failed to get index from {}", client.server()))?
        }
    };
    match args.output {
        OutputFormat::Text => print!("{}", index.to_text()),
        OutputFormat::Json => println!("{}", index.to_json(true)?),
    }
    Ok(())
}
