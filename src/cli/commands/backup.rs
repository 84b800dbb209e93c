use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{
    provider::Catalog,
    state::{manifest, Config, CredentialSource},
    sync::{
        export::playlist_manifest,
        reconcile::{current_owner, owned_playlists},
        Phase, SyncError,
    },
};

use super::utils;

pub async fn run(dir: &Path, source: Option<CredentialSource>, state_dir: &Path) -> Result<()> {
    let config = Config::load_or_default(state_dir)?;
    let catalog = utils::open_catalog(source.unwrap_or(config.default_source), &config, state_dir)?;

    let owner_id = current_owner(&catalog).await?;
    println!("Backing up playlists owned by {}...", owner_id);

    let written = backup(&catalog, &owner_id, dir).await?;

    println!("\nBacked up {} playlist(s) to {:?}", written.len(), dir);
    Ok(())
}

/// Export every owned playlist into `dir` as `<slug>.json`.
///
/// Two playlists with the same slug are disambiguated by appending the playlist id
/// to the later one.
async fn backup<C: Catalog + ?Sized>(
    catalog: &C,
    owner_id: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let playlists = owned_playlists(catalog, owner_id)
        .await
        .map_err(SyncError::transport(Phase::Locate))?;

    let mut seen = HashSet::new();
    let mut written = Vec::with_capacity(playlists.len());

    for summary in playlists {
        let stem = unique_stem(&mut seen, &manifest::slug(&summary.name), &summary.id);

        let id = summary.id.clone();
        let exported = playlist_manifest(catalog, summary).await?;
        let path = dir.join(format!("{}.json", stem));
        manifest::save(&exported, &path)?;

        println!("  {} ({} tracks) -> {:?}", exported.name, exported.tracks.len(), path);
        tracing::debug!(playlist_id = %id, path = ?path, "backed up playlist");
        written.push(path);
    }

    Ok(written)
}

/// `slug`, else `slug-id`, else `slug-id-2`, `slug-id-3`... whichever is not yet taken.
fn unique_stem(seen: &mut HashSet<String>, slug: &str, id: &str) -> String {
    let mut candidate = slug.to_string();
    let mut attempt = 1;

    while !seen.insert(candidate.clone()) {
        candidate = match attempt {
            1 => format!("{}-{}", slug, id),
            n => format!("{}-{}-{}", slug, id, n),
        };
        attempt += 1;
    }

    candidate
}
