use crate::provider::{Catalog, CatalogError, PlaylistSummary};
use crate::sync::batch::{self, Mutation, MAX_BATCH_SIZE};
use crate::sync::paginate::{fetch_all, PLAYLIST_PAGE_SIZE, TRACK_PAGE_SIZE};
use crate::sync::{
    Phase, PlaylistSnapshot, ReconciliationResult, Result, SyncAction, SyncError, TrackRequest,
    TrackResolver,
};

/// Resolved uris in request order, plus the requests that found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredTracks {
    pub uris: Vec<String>,
    pub unresolved: Vec<String>,
}

/// What a run will do to the remote playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    Create,
    Unchanged(PlaylistSnapshot),
    Rewrite(PlaylistSnapshot),
}

/// Outcome of the read-only phases of a run, ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSync {
    pub name: String,
    pub description: String,
    pub desired: DesiredTracks,
    pub plan: SyncPlan,
}

impl PreparedSync {
    pub fn remove_calls(&self) -> usize {
        match &self.plan {
            SyncPlan::Rewrite(current) => batch::batch_count(current.track_uris.len(), MAX_BATCH_SIZE),
            _ => 0,
        }
    }

    pub fn add_calls(&self) -> usize {
        match &self.plan {
            SyncPlan::Unchanged(_) => 0,
            _ => batch::batch_count(self.desired.uris.len(), MAX_BATCH_SIZE),
        }
    }
}

/// Converges a named remote playlist onto a list of track requests.
pub struct Reconciler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    owner_id: String,
    public: bool,
}

impl<'a, C: Catalog + ?Sized> Reconciler<'a, C> {
    pub fn new(catalog: &'a C, owner_id: impl Into<String>) -> Result<Self> {
        let owner_id = owner_id.into();
        if owner_id.trim().is_empty() {
            return Err(SyncError::Configuration(
                "authenticated account id is empty".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            owner_id,
            public: true,
        })
    }

    /// Build a reconciler for whichever account the catalog handle belongs to.
    pub async fn for_current_user(catalog: &'a C) -> Result<Self> {
        Self::new(catalog, current_owner(catalog).await?)
    }

    /// Visibility of newly created playlists. Defaults to public.
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub async fn reconcile(
        &self,
        requests: &[TrackRequest],
        name: &str,
        description: &str,
    ) -> Result<ReconciliationResult> {
        let prepared = self.plan(requests, name, description).await?;
        self.execute(prepared).await
    }

    /// Resolve, locate and compare without touching the remote playlist.
    pub async fn plan(
        &self,
        requests: &[TrackRequest],
        name: &str,
        description: &str,
    ) -> Result<PreparedSync> {
        let desired = self.resolve_all(requests).await?;

        let existing = find_owned_playlist(self.catalog, &self.owner_id, name)
            .await
            .map_err(SyncError::transport(Phase::Locate))?;

        let plan = match existing {
            None => SyncPlan::Create,
            Some(summary) => {
                let current = fetch_snapshot(self.catalog, summary)
                    .await
                    .map_err(SyncError::transport(Phase::Compare))?;

                if current.track_uris == desired.uris {
                    SyncPlan::Unchanged(current)
                } else {
                    SyncPlan::Rewrite(current)
                }
            }
        };

        Ok(PreparedSync {
            name: name.to_string(),
            description: description.to_string(),
            desired,
            plan,
        })
    }

    pub async fn execute(&self, prepared: PreparedSync) -> Result<ReconciliationResult> {
        let PreparedSync {
            name,
            description,
            desired,
            plan,
        } = prepared;

        let (playlist_id, action) = match plan {
            SyncPlan::Unchanged(current) => {
                tracing::info!(playlist_id = %current.id, "playlist already up to date");
                (current.id, SyncAction::Unchanged)
            }
            SyncPlan::Rewrite(current) => {
                tracing::info!(
                    playlist_id = %current.id,
                    current = current.track_uris.len(),
                    desired = desired.uris.len(),
                    "rewriting playlist"
                );
                self.mutate(&current.id, &current.track_uris, Mutation::Remove, Phase::Clear)
                    .await?;
                self.mutate(&current.id, &desired.uris, Mutation::Add, Phase::Add)
                    .await?;
                (current.id, SyncAction::Updated)
            }
            SyncPlan::Create => {
                let id = self
                    .catalog
                    .create_playlist(&self.owner_id, &name, self.public, &description)
                    .await
                    .map_err(SyncError::transport(Phase::Create))?;
                tracing::info!(playlist_id = %id, %name, "created playlist");

                self.mutate(&id, &desired.uris, Mutation::Add, Phase::Add)
                    .await?;
                (id, SyncAction::Created)
            }
        };

        Ok(ReconciliationResult {
            playlist_id,
            action,
            unresolved: desired.unresolved,
        })
    }

    async fn resolve_all(&self, requests: &[TrackRequest]) -> Result<DesiredTracks> {
        let resolver = TrackResolver::new(self.catalog);
        let mut desired = DesiredTracks::default();

        for request in requests {
            let resolved = resolver
                .resolve(request)
                .await
                .map_err(SyncError::transport(Phase::Resolve))?;

            match resolved {
                Some(uri) => desired.uris.push(uri),
                None => {
                    tracing::warn!(artist = %request.artist, track = %request.track, "track not found");
                    desired.unresolved.push(request.label());
                }
            }
        }

        tracing::info!(
            resolved = desired.uris.len(),
            unresolved = desired.unresolved.len(),
            "resolved track requests"
        );
        Ok(desired)
    }

    async fn mutate(
        &self,
        playlist_id: &str,
        uris: &[String],
        mutation: Mutation,
        phase: Phase,
    ) -> Result<()> {
        batch::apply(self.catalog, playlist_id, uris, mutation, MAX_BATCH_SIZE)
            .await
            .map_err(SyncError::batch(phase))?;
        Ok(())
    }
}

/// Id of the account the catalog handle is authenticated as.
pub async fn current_owner<C: Catalog + ?Sized>(catalog: &C) -> Result<String> {
    let user = catalog
        .current_user()
        .await
        .map_err(SyncError::transport(Phase::Identify))?;
    Ok(user.id)
}

/// First playlist, in provider listing order, named exactly `name` and owned by `owner_id`.
pub async fn find_owned_playlist<C: Catalog + ?Sized>(
    catalog: &C,
    owner_id: &str,
    name: &str,
) -> std::result::Result<Option<PlaylistSummary>, CatalogError> {
    let playlists = owned_playlists(catalog, owner_id).await?;
    Ok(playlists.into_iter().find(|p| p.name == name))
}

/// Every listed playlist owned by `owner_id`, in provider listing order.
pub async fn owned_playlists<C: Catalog + ?Sized>(
    catalog: &C,
    owner_id: &str,
) -> std::result::Result<Vec<PlaylistSummary>, CatalogError> {
    let playlists = fetch_all(PLAYLIST_PAGE_SIZE, |limit, offset| {
        catalog.list_owned_playlists(limit, offset)
    })
    .await?;

    Ok(playlists
        .into_iter()
        .filter(|p| p.owner_id == owner_id)
        .collect())
}

pub async fn fetch_snapshot<C: Catalog + ?Sized>(
    catalog: &C,
    summary: PlaylistSummary,
) -> std::result::Result<PlaylistSnapshot, CatalogError> {
    let entries = fetch_all(TRACK_PAGE_SIZE, |limit, offset| {
        catalog.list_playlist_tracks(&summary.id, limit, offset)
    })
    .await?;

    Ok(PlaylistSnapshot {
        track_uris: entries.into_iter().map(|e| e.uri).collect(),
        id: summary.id,
        owner_id: summary.owner_id,
        name: summary.name,
    })
}
