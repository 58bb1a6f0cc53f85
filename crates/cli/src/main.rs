mod auth;
mod commands;
mod config;
mod progress;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pocketsync",
    version,
    about = "Save pages to Pocket, sync tags, cache save status"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        commands::Command::Init(args) => commands::init::run(args).await,
        commands::Command::Connect(args) => commands::connect::run(args).await,
        commands::Command::Save(args) => commands::save::run(args).await,
        commands::Command::Status(args) => commands::status::run(args).await,
        commands::Command::Sync(args) => commands::sync::run(args).await,
        commands::Command::Tags(args) => commands::tags::run(args).await,
        commands::Command::Settings(args) => commands::settings::run(args).await,
        commands::Command::Daemon(args) => commands::daemon::run(args).await,
    }
}
