use std::path::Path;

use crate::{
    provider::{OAuthToken, SpotifyCatalog},
    state::{credentials, Config, CredentialSource},
    sync::SyncError,
};

fn env_var(name: &str) -> Result<String, SyncError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SyncError::Configuration(format!("{} not set", name)))
}

/// SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET, needed for auth and token refresh.
pub fn client_credentials() -> Result<(String, String), SyncError> {
    Ok((
        env_var("SPOTIFY_CLIENT_ID")?,
        env_var("SPOTIFY_CLIENT_SECRET")?,
    ))
}

/// Build an authenticated catalog handle from the chosen credential source.
pub fn open_catalog(
    source: CredentialSource,
    config: &Config,
    state_dir: &Path,
) -> Result<SpotifyCatalog, SyncError> {
    let catalog = match source {
        CredentialSource::Env => {
            let token = OAuthToken {
                access_token: env_var("SPOTIFY_ACCESS_TOKEN")?,
                refresh_token: None,
                expires_at: None,
                token_type: "Bearer".to_string(),
                scope: None,
            };
            let client_id = std::env::var("SPOTIFY_CLIENT_ID").unwrap_or_default();
            let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default();

            SpotifyCatalog::new(client_id, client_secret).with_token(token, None)
        }
        CredentialSource::Store => {
            let token = credentials::load(state_dir)
                .map_err(|e| SyncError::Configuration(format!("{:#}", e)))?
                .ok_or_else(|| {
                    SyncError::Configuration(
                        "No stored token. Run 'plsync auth' first or use --source env.".to_string(),
                    )
                })?;
            let (client_id, client_secret) = client_credentials()?;

            SpotifyCatalog::new(client_id, client_secret).with_token(token, Some(state_dir))
        }
    };

    Ok(catalog.with_api_base(config.api_base.as_str()))
}
