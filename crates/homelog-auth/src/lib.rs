//! OAuth2 credential lifecycle for the Smart Device Management API.
//!
//! `Unconfigured -> Configured -> Authorized <-> Expired`: the bootstrap
//! creates a configured record, the session exchanges its authorization code
//! once and refreshes the access token from then on, persisting after every
//! change.

pub mod bootstrap;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod session;

pub use bootstrap::{bootstrap, consent_url, extract_authorization_code, BootstrapOptions};
pub use credentials::{CredentialState, CredentialStore, Credentials};
pub use error::AuthError;
pub use oauth::{NestOAuth, TokenResponse, SDM_SCOPE};
pub use session::NestSession;
