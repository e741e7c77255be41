use anyhow::Result;
use tracing::info;

use morra_uci::UciEngine;

fn main() -> Result<()> {
    // stdout belongs to the UCI protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    info!("morra starting");
    UciEngine::new().run()?;
    Ok(())
}
