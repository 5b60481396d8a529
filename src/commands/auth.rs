use anyhow::Result;
use homelog_auth::{CredentialStore, NestOAuth};
use homelog_core::Config;

pub async fn cmd_auth(config: &Config, no_browser: bool) -> Result<()> {
    let oauth = NestOAuth::new(&config.nest, &config.http)?;
    let store = CredentialStore::new(&config.nest.credential_file);
    if store.exists() {
        tracing::warn!("Replacing existing credentials at {}", store.path().display());
    }

    let session = super::authorize(oauth, store, !no_browser).await?;
    let credentials = session.credentials().await;

    println!("\nAuthorized Device Access project {}", credentials.project_id);
    if let Some(expires) = credentials.access_token_expiration {
        println!("Access token valid until {}", expires.with_timezone(&chrono::Local));
    }
    Ok(())
}
