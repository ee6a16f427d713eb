use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "belltimer", version, about = "Interval timer with escalating warning bells")]
struct Cli {
    /// Config file to use instead of ~/.config/belltimer/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer interactively, reading commands from stdin
    Run(commands::run::RunArgs),
    /// Replay a command script on a virtual clock and print the events
    Simulate(commands::simulate::SimulateArgs),
    /// Build or normalize a preset query string
    Preset(commands::preset::PresetArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BELLTIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, config),
        Commands::Simulate(args) => commands::simulate::run(args, config),
        Commands::Preset(args) => commands::preset::run(args),
        Commands::Config { action } => commands::config::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
