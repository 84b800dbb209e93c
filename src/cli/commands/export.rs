use std::path::Path;

use anyhow::Result;

use crate::{
    state::{manifest, Config, CredentialSource},
    sync::{export::export_playlist, reconcile::current_owner},
};

use super::utils;

pub async fn run(
    playlist: &str,
    output: &Path,
    source: Option<CredentialSource>,
    state_dir: &Path,
) -> Result<()> {
    let config = Config::load_or_default(state_dir)?;
    let catalog = utils::open_catalog(source.unwrap_or(config.default_source), &config, state_dir)?;

    let owner_id = current_owner(&catalog).await?;
    let exported = export_playlist(&catalog, &owner_id, playlist).await?;

    manifest::save(&exported, output)?;

    println!(
        "Exported '{}' ({} tracks) to {:?}",
        exported.name,
        exported.tracks.len(),
        output
    );

    Ok(())
}
