use crate::{
    api::{self, handlers::auth},
    cli::telemetry,
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_password: Option<SecretString>,
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub public_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = dsn_with_password(&args.dsn, args.db_password.as_ref())?;

    let signer = auth::SessionSigner::new(&args.session_secret)
        .context("Invalid --session-secret")?;

    let auth_config = auth::AuthConfig::new(args.public_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    debug!("Auth config: {:?}", auth_config);

    let result = api::new(args.port, dsn, auth_config, signer).await;

    telemetry::shutdown_tracer();

    result
}

/// Set the password on the DSN when one was supplied separately.
fn dsn_with_password(dsn: &str, password: Option<&SecretString>) -> Result<SecretString> {
    let mut dsn = Url::parse(dsn).context("Invalid --dsn")?;

    if let Some(password) = password {
        dsn.set_password(Some(password.expose_secret()))
            .map_err(|()| anyhow!("Error setting password"))?;
    }

    Ok(SecretString::from(dsn.to_string()))
}
