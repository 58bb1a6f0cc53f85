use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::AppConfig;

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsAction,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Change one setting
    Set {
        /// One of: tag-suggestions, tab-cache, popup-close-secs, dev-mode,
        /// shortcut
        key: String,
        value: String,
    },
}

pub async fn run(args: SettingsArgs) -> Result<()> {
    let config = AppConfig::load()?;
    let state = config.open_state()?;

    match args.action {
        SettingsAction::Show => {
            let settings = state.settings().await?;
            println!("tag-suggestions   {}", settings.tag_suggestions_enabled);
            println!("tab-cache         {}", settings.tab_cache_enabled);
            println!("popup-close-secs  {}", settings.popup_close_secs);
            println!("dev-mode          {}", settings.dev_mode_enabled);
            println!("shortcut          {}", settings.keyboard_shortcut);
        }
        SettingsAction::Set { key, value } => {
            let mut settings = state.settings().await?;
            match key.as_str() {
                "tag-suggestions" => settings.tag_suggestions_enabled = parse_bool(&value)?,
                "tab-cache" => settings.tab_cache_enabled = parse_bool(&value)?,
                "popup-close-secs" => {
                    settings.popup_close_secs =
                        value.parse().context("expected a number of seconds")?;
                }
                "dev-mode" => settings.dev_mode_enabled = parse_bool(&value)?,
                "shortcut" => settings.keyboard_shortcut = value,
                other => anyhow::bail!("unknown setting: {other}"),
            }
            state.store_settings(&settings).await?;
            println!("Updated.");
        }
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}
