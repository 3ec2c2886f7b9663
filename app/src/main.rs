use clap::Parser;
use folio::cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    folio::init_logging(cli.verbose);
    log::debug!("[Startup] folio v{}", env!("CARGO_PKG_VERSION"));
    run(cli).await
}
