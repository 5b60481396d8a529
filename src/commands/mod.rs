//! Command implementations for the CLI.

mod auth;
mod history;
mod log;
mod nest;
mod weather;

pub use auth::cmd_auth;
pub use history::cmd_history;
pub use log::cmd_log;
pub use nest::{cmd_nest, cmd_structures};
pub use weather::cmd_weather;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use homelog_auth::{bootstrap, BootstrapOptions, CredentialStore, NestOAuth, NestSession};
use homelog_core::Config;
use homelog_nest::NestClient;

/// Run the consent flow, persist the new record and exchange its code.
async fn authorize(oauth: NestOAuth, store: CredentialStore, open_browser: bool) -> Result<NestSession> {
    let credentials = {
        let mut input = io::stdin().lock();
        let mut output = io::stdout().lock();
        let options = BootstrapOptions {
            consent_base_url: oauth.consent_base_url(),
            open_browser,
        };
        bootstrap(&mut input, &mut output, &options)?
    };

    store
        .save(&credentials)
        .with_context(|| format!("Failed to save credentials to {}", store.path().display()))?;

    let session = NestSession::new(oauth, store, credentials);
    session
        .exchange_code()
        .await
        .context("Failed to exchange the authorization code")?;
    Ok(session)
}

/// Open the stored session, running the consent flow on first use.
async fn open_session(config: &Config) -> Result<Arc<NestSession>> {
    let oauth = NestOAuth::new(&config.nest, &config.http)?;
    let store = CredentialStore::new(&config.nest.credential_file);

    match NestSession::open(oauth.clone(), store.clone()).await {
        Ok(session) => Ok(Arc::new(session)),
        Err(e) if e.is_config_missing() => {
            tracing::info!("No credentials at {}, starting authorization", store.path().display());
            Ok(Arc::new(authorize(oauth, store, true).await?))
        }
        Err(e) => Err(e).context("Failed to open the Nest session"),
    }
}

async fn nest_client(config: &Config) -> Result<NestClient> {
    let session = open_session(config).await?;
    Ok(NestClient::new(session, &config.nest, &config.http)?)
}
