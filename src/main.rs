use std::process::ExitCode;

use clap::Parser;
use entra_port_sync::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Sync(args) => cli::sync::run(args).await,
    }
}
