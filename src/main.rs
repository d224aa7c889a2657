use clap::Parser;

use gateway_transfer::cli::{self, Cli};
use gateway_transfer::config::Ctx;
use gateway_transfer::setup_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ctx = Ctx::load_files(&cli.env.config, &cli.env.secrets)?;
    setup_tracing(ctx.log_level);

    cli::run(ctx, cli.command).await?;
    Ok(())
}
