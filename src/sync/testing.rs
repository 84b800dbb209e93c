//! In-memory catalog used by the engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{
    Catalog, CatalogError, CurrentUser, Page, PlaylistEntry, PlaylistSummary, SearchHit,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search { query: String, limit: usize },
    ListPlaylists { limit: usize, offset: usize },
    ListTracks { playlist_id: String, limit: usize, offset: usize },
    Create { name: String, public: bool },
    Add { playlist_id: String, uris: Vec<String> },
    Remove { playlist_id: String, uris: Vec<String> },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Add { .. } | Call::Remove { .. })
    }
}

struct FakePlaylist {
    summary: PlaylistSummary,
    uris: Vec<String>,
}

type Predicate = Box<dyn Fn(&Call) -> bool + Send + Sync>;

struct FailRule {
    matches: Predicate,
    nth: usize,
    seen: usize,
}

struct State {
    playlists: Vec<FakePlaylist>,
    calls: Vec<Call>,
    fail: Option<FailRule>,
    created: usize,
}

pub struct FakeCatalog {
    user_id: String,
    searches: HashMap<String, Vec<SearchHit>>,
    state: Mutex<State>,
}

pub fn hit(uri: &str, album: &str) -> SearchHit {
    SearchHit {
        uri: uri.to_string(),
        name: uri.rsplit(':').next().unwrap_or(uri).to_string(),
        artists: vec!["Artist".to_string()],
        album_name: album.to_string(),
    }
}

pub fn uris(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("spotify:track:{prefix}{i}")).collect()
}

impl FakeCatalog {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            searches: HashMap::new(),
            state: Mutex::new(State {
                playlists: Vec::new(),
                calls: Vec::new(),
                fail: None,
                created: 0,
            }),
        }
    }

    pub fn with_search(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.searches.insert(query.to_string(), hits);
        self
    }

    pub fn with_playlist(self, id: &str, name: &str, owner_id: &str, uris: Vec<String>) -> Self {
        self.state.lock().unwrap().playlists.push(FakePlaylist {
            summary: PlaylistSummary {
                id: id.to_string(),
                name: name.to_string(),
                owner_id: owner_id.to_string(),
                description: None,
            },
            uris,
        });
        self
    }

    /// Fail the `nth` (zero based) call matching `matches` with a 502.
    pub fn fail_on(self, nth: usize, matches: impl Fn(&Call) -> bool + Send + Sync + 'static) -> Self {
        self.state.lock().unwrap().fail = Some(FailRule {
            matches: Box::new(matches),
            nth,
            seen: 0,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn playlist_uris(&self, id: &str) -> Option<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.summary.id == id)
            .map(|p| p.uris.clone())
    }

    fn record(&self, call: Call) -> Result<(), CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());

        if let Some(rule) = state.fail.as_mut() {
            if (rule.matches)(&call) {
                rule.seen += 1;
                if rule.seen == rule.nth + 1 {
                    return Err(CatalogError::Api {
                        status: 502,
                        message: "bad gateway".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn page<T: Clone>(items: &[T], limit: usize, offset: usize) -> Page<T> {
    let end = (offset + limit).min(items.len());
    let start = offset.min(end);
    Page {
        items: items[start..end].to_vec(),
        has_next: end < items.len(),
    }
}

fn too_many(uris: &[String]) -> Result<(), CatalogError> {
    if uris.len() > 100 {
        return Err(CatalogError::Api {
            status: 400,
            message: format!("too many items: {}", uris.len()),
        });
    }
    Ok(())
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn current_user(&self) -> Result<CurrentUser, CatalogError> {
        Ok(CurrentUser {
            id: self.user_id.clone(),
            display_name: None,
        })
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        self.record(Call::Search {
            query: query.to_string(),
            limit,
        })?;
        let hits = self.searches.get(query).cloned().unwrap_or_default();
        Ok(hits.into_iter().take(limit).collect())
    }

    async fn list_owned_playlists(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistSummary>, CatalogError> {
        self.record(Call::ListPlaylists { limit, offset })?;
        let state = self.state.lock().unwrap();
        let summaries: Vec<_> = state.playlists.iter().map(|p| p.summary.clone()).collect();
        Ok(page(&summaries, limit, offset))
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistEntry>, CatalogError> {
        self.record(Call::ListTracks {
            playlist_id: playlist_id.to_string(),
            limit,
            offset,
        })?;
        let state = self.state.lock().unwrap();
        let entries: Vec<_> = state
            .playlists
            .iter()
            .find(|p| p.summary.id == playlist_id)
            .map(|p| {
                p.uris
                    .iter()
                    .map(|uri| PlaylistEntry {
                        uri: uri.clone(),
                        name: format!("Name {uri}"),
                        // Episodes carry no artists
                        artists: if uri.starts_with("spotify:episode:") {
                            Vec::new()
                        } else {
                            vec!["Artist".to_string(), "Guest".to_string()]
                        },
                        album_name: "Album".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(page(&entries, limit, offset))
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String, CatalogError> {
        self.record(Call::Create {
            name: name.to_string(),
            public,
        })?;
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        let id = format!("created{}", state.created);
        state.playlists.push(FakePlaylist {
            summary: PlaylistSummary {
                id: id.clone(),
                name: name.to_string(),
                owner_id: owner_id.to_string(),
                description: Some(description.to_string()).filter(|d| !d.is_empty()),
            },
            uris: Vec::new(),
        });
        Ok(id)
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError> {
        self.record(Call::Add {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        })?;
        too_many(uris)?;
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.playlists.iter_mut().find(|p| p.summary.id == playlist_id) {
            p.uris.extend_from_slice(uris);
        }
        Ok(())
    }

    async fn remove_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError> {
        self.record(Call::Remove {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        })?;
        too_many(uris)?;
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.playlists.iter_mut().find(|p| p.summary.id == playlist_id) {
            p.uris.retain(|uri| !uris.contains(uri));
        }
        Ok(())
    }
}
