use clap::Parser;

mod cli;
mod commands;
mod output;
mod templates;

use cli::{Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args, cli.format).await,
        Some(Commands::FlagCheck(args)) => commands::flag::run(&args, cli.format),
        None => commands::serve::run(&ServeArgs::from_env()).await,
    }
}
