//! Integrations E2E - browser end-to-end checks for the integrations pages
//!
//! Provisions a team through the server API, then drives a real browser
//! over WebDriver through the integrations settings scenarios.

use clap::Parser;
use commands::Commands;
use integrations_e2e::{cli, commands, common::logging};

#[derive(Parser)]
#[command(name = "integrations-e2e", about = "Integrations page end-to-end tests")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_guard = logging::init_cli(cli.command.verbose());

    let result = cli::dispatch(cli.command).await;

    // Flush the run log; `exit` skips destructors
    drop(log_guard);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
