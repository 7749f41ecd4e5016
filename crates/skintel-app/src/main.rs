use anyhow::Result;
use clap::Parser;

use skintel_app::app::init_logging;
use skintel_app::{run_command, run_repl_mode, setup_from_cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = setup_from_cli(&cli);

    match &cli.command {
        Some(command) => run_command(command, &config).await,
        None => run_repl_mode(&config).await,
    }
}
