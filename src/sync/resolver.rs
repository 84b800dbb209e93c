use crate::provider::{Catalog, CatalogError, SearchHit};
use crate::sync::TrackRequest;

const ALBUM_SEARCH_LIMIT: usize = 5;
const TRACK_SEARCH_LIMIT: usize = 10;

/// Album-name fragments that mark a release as a compilation.
pub const COMPILATION_MARKERS: [&str; 8] = [
    "greatest hits",
    "best of",
    "collection",
    "singles",
    "anthology",
    "essential",
    "electrospective",
    "retrospective",
];

/// Maps a [`TrackRequest`] onto at most one catalog uri.
///
/// Two tiers: an album-constrained search when the request names an album, then a
/// track+artist search that prefers studio releases over compilations. Ranking is
/// always "first acceptable hit in provider order".
pub struct TrackResolver<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> TrackResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// `Ok(None)` when neither search returns anything.
    pub async fn resolve(&self, request: &TrackRequest) -> Result<Option<String>, CatalogError> {
        if let Some(album) = request.album_hint() {
            let query = album_query(request, album);
            let hits = self.catalog.search_tracks(&query, ALBUM_SEARCH_LIMIT).await?;
            tracing::debug!(%query, hits = hits.len(), "album search");

            if let Some(hit) = pick_album_match(&hits, album) {
                return Ok(Some(hit.uri.clone()));
            }
        }

        let query = track_query(request);
        let hits = self.catalog.search_tracks(&query, TRACK_SEARCH_LIMIT).await?;
        tracing::debug!(%query, hits = hits.len(), "track search");

        Ok(pick_studio_release(&hits).map(|hit| hit.uri.clone()))
    }
}

fn album_query(request: &TrackRequest, album: &str) -> String {
    format!(
        "track:{} artist:{} album:{}",
        request.track, request.artist, album
    )
}

fn track_query(request: &TrackRequest) -> String {
    format!("track:{} artist:{}", request.track, request.artist)
}

/// First hit on the named album, else the first hit.
fn pick_album_match<'h>(hits: &'h [SearchHit], album: &str) -> Option<&'h SearchHit> {
    let album = album.to_lowercase();
    hits.iter()
        .find(|hit| hit.album_name.to_lowercase().contains(&album))
        .or_else(|| hits.first())
}

pub fn is_compilation(album_name: &str) -> bool {
    let album_name = album_name.to_lowercase();
    COMPILATION_MARKERS
        .iter()
        .any(|marker| album_name.contains(marker))
}

/// First hit not on a compilation, else the first hit.
fn pick_studio_release(hits: &[SearchHit]) -> Option<&SearchHit> {
    hits.iter()
        .find(|hit| !is_compilation(&hit.album_name))
        .or_else(|| hits.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{hit, Call, FakeCatalog};

    const TRACK_Q: &str = "track:Song artist:Band";
    const ALBUM_Q: &str = "track:Song artist:Band album:Second Album";

    fn request() -> TrackRequest {
        TrackRequest::new("Band", "Song")
    }

    #[tokio::test]
    async fn test_skips_compilations_without_album_hint() {
        let mut hits = vec![
            hit("spotify:track:c0", "Greatest Hits"),
            hit("spotify:track:c1", "The Best Of Band"),
            hit("spotify:track:c2", "Singles 1980-1990"),
            hit("spotify:track:studio", "First Album"),
        ];
        hits.extend((4..10).map(|i| hit(&format!("spotify:track:x{i}"), "Other")));
        let catalog = FakeCatalog::new("alice").with_search(TRACK_Q, hits);

        let uri = TrackResolver::new(&catalog).resolve(&request()).await.unwrap();

        assert_eq!(uri.as_deref(), Some("spotify:track:studio"));
        assert_eq!(
            catalog.calls(),
            vec![Call::Search {
                query: TRACK_Q.to_string(),
                limit: 10
            }]
        );
    }

    #[tokio::test]
    async fn test_all_compilations_falls_back_to_first() {
        let hits = vec![
            hit("spotify:track:c0", "ESSENTIAL Band"),
            hit("spotify:track:c1", "Anthology"),
        ];
        let catalog = FakeCatalog::new("alice").with_search(TRACK_Q, hits);

        let uri = TrackResolver::new(&catalog).resolve(&request()).await.unwrap();

        assert_eq!(uri.as_deref(), Some("spotify:track:c0"));
    }

    #[tokio::test]
    async fn test_album_hint_picks_matching_album() {
        let hits = vec![
            hit("spotify:track:a0", "Live in Berlin"),
            hit("spotify:track:a1", "Greatest Hits"),
            hit("spotify:track:a2", "SECOND ALBUM (Remastered)"),
            hit("spotify:track:a3", "Second"),
            hit("spotify:track:a4", "Other"),
        ];
        let catalog = FakeCatalog::new("alice").with_search(ALBUM_Q, hits);
        let request = request().with_album("Second Album");

        let uri = TrackResolver::new(&catalog).resolve(&request).await.unwrap();

        assert_eq!(uri.as_deref(), Some("spotify:track:a2"));
        assert_eq!(
            catalog.calls(),
            vec![Call::Search {
                query: ALBUM_Q.to_string(),
                limit: 5
            }]
        );
    }

    #[tokio::test]
    async fn test_album_hint_without_match_uses_first_album_hit() {
        let hits = vec![
            hit("spotify:track:a0", "Greatest Hits"),
            hit("spotify:track:a1", "Live"),
        ];
        let catalog = FakeCatalog::new("alice")
            .with_search(ALBUM_Q, hits)
            .with_search(TRACK_Q, vec![hit("spotify:track:t0", "Second Album")]);
        let request = request().with_album("Second Album");

        let uri = TrackResolver::new(&catalog).resolve(&request).await.unwrap();

        // No fallback search: a non-empty album search is authoritative
        assert_eq!(uri.as_deref(), Some("spotify:track:a0"));
        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_album_search_falls_back_to_track_search() {
        let catalog = FakeCatalog::new("alice")
            .with_search(TRACK_Q, vec![hit("spotify:track:t0", "Debut")]);
        let request = request().with_album("Second Album");

        let uri = TrackResolver::new(&catalog).resolve(&request).await.unwrap();

        assert_eq!(uri.as_deref(), Some("spotify:track:t0"));
        let queries: Vec<_> = catalog
            .calls()
            .into_iter()
            .map(|c| match c {
                Call::Search { query, .. } => query,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(queries, vec![ALBUM_Q.to_string(), TRACK_Q.to_string()]);
    }

    #[tokio::test]
    async fn test_blank_album_is_ignored() {
        let catalog = FakeCatalog::new("alice")
            .with_search(TRACK_Q, vec![hit("spotify:track:t0", "Debut")]);
        let request = request().with_album("  ");

        TrackResolver::new(&catalog).resolve(&request).await.unwrap();

        assert_eq!(catalog.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_no_results_is_unresolved() {
        let catalog = FakeCatalog::new("alice");
        let request = request().with_album("Second Album");

        let uri = TrackResolver::new(&catalog).resolve(&request).await.unwrap();

        assert!(uri.is_none());
        assert_eq!(catalog.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let catalog = FakeCatalog::new("alice").fail_on(0, |c| matches!(c, Call::Search { .. }));

        let err = TrackResolver::new(&catalog).resolve(&request()).await.unwrap_err();

        assert!(matches!(err, CatalogError::Api { status: 502, .. }));
    }

    #[test]
    fn test_is_compilation_is_case_insensitive() {
        assert!(is_compilation("The Collection"));
        assert!(is_compilation("RETROSPECTIVE 1979-1999"));
        assert!(!is_compilation("Power, Corruption & Lies"));
    }
}
