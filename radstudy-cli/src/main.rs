use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "radstudy", about = "Imaging appropriateness survey server")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assignment an identifier receives
    Assign(commands::assign::AssignArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Issue a participant identifier from an email address
    Genuid(commands::genuid::GenuidArgs),
    /// Run the survey server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Assign(args) => commands::assign::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Genuid(args) => commands::genuid::run(args),
        Commands::Serve(args) => commands::serve::run(args).await,
    }
}
