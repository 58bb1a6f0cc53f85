use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct TagsArgs {
    /// Autocomplete prefix; lists the whole vocabulary when omitted
    prefix: Option<String>,

    /// Maximum number of suggestions for a prefix
    #[arg(long, default_value_t = 5)]
    limit: usize,
}

pub async fn run(args: TagsArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let state = config.open_state()?;
    let vocab = state.vocabulary().await?;

    match args.prefix {
        Some(prefix) => {
            for tag in vocab.suggest(&prefix, args.limit) {
                println!("{tag}");
            }
        }
        None => {
            for tag in &vocab.tags {
                println!("{tag}");
            }
            match vocab.last_fetched_at {
                Some(at) => eprintln!("{} tags (last synced {})", vocab.len(), at.to_rfc3339()),
                None => eprintln!("{} tags (never fully synced)", vocab.len()),
            }
        }
    }
    Ok(())
}
