use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use ecocycle_classifier::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // The start command initializes tracing itself, once the configured level is known
    if !matches!(args.get_command(), cli::Commands::Start) {
        init_tracing("warn", "text");
    }

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
        cli::Commands::Version => {
            println!("EcoCycle classifier v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
