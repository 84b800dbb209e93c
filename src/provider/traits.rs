use async_trait::async_trait;

use crate::provider::{CatalogError, CurrentUser, Page, PlaylistEntry, PlaylistSummary, SearchHit};

/// Authenticated handle onto a remote music catalog.
///
/// Every call is a single round trip. Implementations must not retry.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Account the handle is authenticated as
    async fn current_user(&self) -> Result<CurrentUser, CatalogError>;

    /// Track search, results in provider ranking order
    async fn search_tracks(&self, query: &str, limit: usize)
        -> Result<Vec<SearchHit>, CatalogError>;

    /// Playlists visible to the authenticated account (owned and followed)
    async fn list_owned_playlists(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistSummary>, CatalogError>;

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistEntry>, CatalogError>;

    /// Create a playlist and return its id
    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String, CatalogError>;

    /// Append items. At most 100 uris per call.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError>;

    /// Remove every occurrence of each uri. At most 100 uris per call.
    async fn remove_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError>;
}
