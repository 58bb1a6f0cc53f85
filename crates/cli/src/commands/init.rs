use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct InitArgs {
    /// Pocket consumer key for this application
    #[arg(long)]
    consumer_key: String,

    /// Overwrite an existing config
    #[arg(long)]
    force: bool,
}

pub async fn run(args: InitArgs) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() && !args.force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::starter(args.consumer_key);
    config.save()?;
    // Create the state directory up front so later commands never race on it.
    config.open_state()?;

    println!("Config written to {}", path.display());
    println!("Next: `pocketsync connect` to authorize your Pocket account.");
    Ok(())
}
