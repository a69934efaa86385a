use clap::Parser;
use idprobe_cli::{init_tracing, run, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_tracing();
    tracing::debug!("Starting idprobe v{}", env!("CARGO_PKG_VERSION"));

    run(args).await
}
