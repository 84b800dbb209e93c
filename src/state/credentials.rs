use crate::provider::OAuthToken;
use crate::state::vault::Vault;
use anyhow::{Context, Result};
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};

/// Store the token sealed and base64 encoded under `<state_dir>/credentials/`.
pub fn save(state_dir: &Path, token: &OAuthToken) -> Result<()> {
    let path = credentials_path(state_dir);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create credentials dir {:?}", parent))?;
    }

    let json = serde_json::to_vec(token).context("Failed to serialize token")?;
    let sealed = Vault::open(state_dir)?
        .seal(&json)
        .context("Failed to encrypt credentials")?;

    fs::write(&path, base64::engine::general_purpose::STANDARD.encode(sealed))
        .with_context(|| format!("Failed to write credentials to {:?}", path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub fn load(state_dir: &Path) -> Result<Option<OAuthToken>> {
    let path = credentials_path(state_dir);

    if !path.exists() {
        return Ok(None);
    }

    let encoded = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read credentials from {:?}", path))?;

    let sealed = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .context("Failed to decode credentials")?;

    let json = Vault::open(state_dir)?
        .unseal(&sealed)
        .context("Failed to decrypt credentials")?;

    let token = serde_json::from_slice(&json).context("Failed to parse credentials")?;

    Ok(Some(token))
}

pub fn delete(state_dir: &Path) -> Result<bool> {
    let path = credentials_path(state_dir);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).with_context(|| format!("Failed to delete credentials {:?}", path))?;
    Ok(true)
}

pub fn credentials_path(state_dir: &Path) -> PathBuf {
    state_dir.join("credentials").join("spotify.json")
}
