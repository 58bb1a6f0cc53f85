use async_trait::async_trait;
use console::style;
use dialoguer::Confirm;

use pocketsync_core::error::AuthFlowError;
use pocketsync_core::router::AuthFlow;

/// Consent step driven from a terminal: print the authorization URL and
/// wait for the user to confirm they approved it in a browser.
pub struct TerminalAuthFlow;

#[async_trait]
impl AuthFlow for TerminalAuthFlow {
    async fn authorize(&self, authorize_url: &str) -> Result<String, AuthFlowError> {
        println!("\nOpen this URL in your browser to authorize access:\n");
        println!("  {}\n", style(authorize_url).cyan().underlined());

        let confirmed = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("Done authorizing in the browser?")
                .default(true)
                .interact()
        })
        .await
        .map_err(|err| AuthFlowError::Failed(err.to_string()))?
        .map_err(|err| AuthFlowError::Failed(err.to_string()))?;

        if confirmed {
            // A terminal flow has no capturable redirect.
            Ok(String::new())
        } else {
            Err(AuthFlowError::Cancelled)
        }
    }
}

/// For non-interactive surfaces (the daemon, scripted saves):
/// authorization has to happen in a terminal session instead.
pub struct UnavailableAuthFlow;

#[async_trait]
impl AuthFlow for UnavailableAuthFlow {
    async fn authorize(&self, _authorize_url: &str) -> Result<String, AuthFlowError> {
        Err(AuthFlowError::Failed(
            "interactive authorization is not available here; run `pocketsync connect`"
                .to_string(),
        ))
    }
}
