use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use worker::config::{Cli, Commands, WorkerConfig};
use worker::console::run_console;
use worker::Worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = WorkerConfig::from(&cli);
    let worker = Worker::start(&config).await?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            worker.run_until_done().await?;
        }
        Commands::Console => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            run_console(&worker, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}
