//! The `photolog serve` command.

use clap::Args;
use photolog_core::{Config, Journal};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Open the journal and serve it until Ctrl-C.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let journal = Journal::open(config)?;
    crate::server::serve(journal, &bind).await
}
