use crate::provider::{Catalog, PlaylistEntry, PlaylistSummary};
use crate::sync::paginate::{fetch_all, TRACK_PAGE_SIZE};
use crate::sync::reconcile::find_owned_playlist;
use crate::sync::{Phase, PlaylistManifest, Result, SyncError, TrackRequest};

/// Read the owned playlist called `name` back into a manifest that `build` accepts.
pub async fn export_playlist<C: Catalog + ?Sized>(
    catalog: &C,
    owner_id: &str,
    name: &str,
) -> Result<PlaylistManifest> {
    let summary = find_owned_playlist(catalog, owner_id, name)
        .await
        .map_err(SyncError::transport(Phase::Locate))?
        .ok_or_else(|| SyncError::PlaylistNotFound(name.to_string()))?;

    playlist_manifest(catalog, summary).await
}

pub async fn playlist_manifest<C: Catalog + ?Sized>(
    catalog: &C,
    summary: PlaylistSummary,
) -> Result<PlaylistManifest> {
    let entries = fetch_all(TRACK_PAGE_SIZE, |limit, offset| {
        catalog.list_playlist_tracks(&summary.id, limit, offset)
    })
    .await
    .map_err(SyncError::transport(Phase::Export))?;

    tracing::debug!(playlist_id = %summary.id, tracks = entries.len(), "exported playlist");

    let tracks = entries
        .into_iter()
        .filter_map(|entry| {
            let uri = entry.uri.clone();
            let request = track_request(entry);
            if request.is_none() {
                tracing::warn!(playlist_id = %summary.id, %uri, "skipping entry without an artist");
            }
            request
        })
        .collect();

    Ok(PlaylistManifest {
        name: summary.name,
        description: summary.description.unwrap_or_default(),
        tracks,
    })
}

/// `None` for entries with no artist, which `build` could not search for.
fn track_request(entry: PlaylistEntry) -> Option<TrackRequest> {
    let artist = entry
        .artists
        .into_iter()
        .find(|a| !a.trim().is_empty())?;

    Some(TrackRequest {
        artist,
        track: entry.name,
        album: Some(entry.album_name).filter(|a| !a.is_empty()),
    })
}
