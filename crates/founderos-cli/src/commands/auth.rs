//! Authentication commands and the shared sign-in used by every API command.

use founderos_google::auth::TokenAction;
use founderos_google::{ApiClient, GoogleSession, Service};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Run the sign-in flow for `service`.
///
/// With a fresh token on disk this only reports it, unless `force` is set.
/// An expired token is refreshed; otherwise the browser consent flow runs.
pub async fn login(config: &ClientConfig, service: Service, force: bool) -> ClientResult<()> {
    let mut session = GoogleSession::new(config.auth_config(service)?)?;

    if !force && session.pending_action() == TokenAction::Use {
        println!("Already authenticated with {service}.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    if force || session.pending_action() == TokenAction::Authorize {
        println!("Starting {service} authentication...");
        println!();
        println!("A browser window will open for you to authorize access.");
        println!("If the browser doesn't open, copy the URL printed below.");
        println!();
    }

    if force {
        session.authorize().await?;
    } else {
        session.access_token().await?;
    }

    info!(%service, "authentication successful");
    println!("{service} authentication successful!");
    println!(
        "Token saved to {}",
        session.config().token_path.display()
    );
    Ok(())
}

/// An API client for `service`, signing in first if needed.
pub async fn connect(config: &ClientConfig, service: Service) -> ClientResult<ApiClient> {
    let auth = config.auth_config(service)?;
    Ok(founderos_google::connect(auth).await?)
}
