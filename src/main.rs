use clap::Parser;

use roundcast::cli::output::{self, OutputConfig};
use roundcast::cli::{check, replay, run, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    output::configure(OutputConfig {
        json: cli.json,
        quiet: cli.quiet,
    });

    let result = match &cli.command {
        Commands::Run => run::execute(&cli).await,
        Commands::Check(CheckCommand::Config) => check::execute_config(&cli),
        Commands::Check(CheckCommand::Feed) => check::execute_feed(&cli).await,
        Commands::Replay(args) => replay::execute(&cli, args).await,
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
