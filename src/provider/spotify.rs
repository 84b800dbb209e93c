use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::provider::{
    Catalog, CatalogError, CurrentUser, OAuthToken, Page, PlaylistEntry, PlaylistSummary,
    SearchHit,
};
use crate::state::credentials;

const AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const API_BASE: &str = "https://api.spotify.com/v1";

pub const SCOPES: [&str; 4] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
];

/// Spotify Web API implementation of [`Catalog`].
pub struct SpotifyCatalog {
    client_id: String,
    client_secret: String,
    api_base: String,
    token_url: String,
    token: Mutex<Option<OAuthToken>>,
    state_dir: Option<PathBuf>,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct SpotifyTokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl SpotifyTokenResponse {
    fn into_oauth_token(self) -> OAuthToken {
        OAuthToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Some(unix_now() + self.expires_in),
            token_type: self.token_type,
            scope: self.scope,
        }
    }
}

#[derive(Deserialize)]
struct SpotifyUser {
    id: String,
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Paging<Option<SpotifyTrack>>,
}

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyTrack {
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SpotifyAlbum>,
}

#[derive(Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Deserialize)]
struct SpotifyAlbum {
    name: String,
}

#[derive(Deserialize)]
struct SpotifyPlaylist {
    id: String,
    name: String,
    owner: SpotifyOwner,
    description: Option<String>,
}

#[derive(Deserialize)]
struct SpotifyOwner {
    id: String,
}

#[derive(Deserialize)]
struct SpotifyPlaylistItem {
    track: Option<SpotifyTrack>,
}

#[derive(Deserialize)]
struct CreatedPlaylist {
    id: String,
}

#[derive(Deserialize)]
struct SpotifyError {
    error: SpotifyErrorDetails,
}

#[derive(Deserialize)]
struct SpotifyErrorDetails {
    message: String,
}

impl From<SpotifyTrack> for SearchHit {
    fn from(track: SpotifyTrack) -> Self {
        SearchHit {
            uri: track.uri,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album_name: track.album.map(|a| a.name).unwrap_or_default(),
        }
    }
}

impl From<SpotifyTrack> for PlaylistEntry {
    fn from(track: SpotifyTrack) -> Self {
        PlaylistEntry {
            uri: track.uri,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album_name: track.album.map(|a| a.name).unwrap_or_default(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Parse Spotify API error response into a clean message
fn parse_spotify_error(text: &str) -> String {
    match serde_json::from_str::<SpotifyError>(text) {
        Ok(err) => err.error.message,
        Err(_) => text.trim().to_string(),
    }
}

impl SpotifyCatalog {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            api_base: API_BASE.to_string(),
            token_url: TOKEN_URL.to_string(),
            token: Mutex::new(None),
            state_dir: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach a token. When `state_dir` is given, refreshed tokens are written back there.
    pub fn with_token(mut self, token: OAuthToken, state_dir: Option<&Path>) -> Self {
        self.token = Mutex::new(Some(token));
        self.state_dir = state_dir.map(Path::to_path_buf);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[cfg(test)]
    fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn oauth_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
            urlencoding::encode(state),
        )
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthToken, CatalogError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        self.token_request(&params)
            .await
            .map(SpotifyTokenResponse::into_oauth_token)
    }

    pub async fn refresh_token(&self, token: &OAuthToken) -> Result<OAuthToken, CatalogError> {
        let refresh = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| CatalogError::Token("no refresh token available".to_string()))?;

        let params = [("grant_type", "refresh_token"), ("refresh_token", refresh)];

        let mut new_token = self.token_request(&params).await?.into_oauth_token();

        // Spotify doesn't always return a new refresh_token
        if new_token.refresh_token.is_none() {
            new_token.refresh_token = token.refresh_token.clone();
        }

        Ok(new_token)
    }

    fn basic_auth_header(&self) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        base64::engine::general_purpose::STANDARD.encode(credentials)
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
    ) -> Result<SpotifyTokenResponse, CatalogError> {
        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", self.basic_auth_header()))
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Token(error_text.trim().to_string()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn is_token_expired(token: &OAuthToken) -> bool {
        token
            .expires_at
            .is_some_and(|expires_at| unix_now() >= expires_at.saturating_sub(60))
    }

    /// Current access token, refreshed first when it is about to expire.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let current = self
            .token
            .lock()
            .await
            .clone()
            .ok_or_else(|| CatalogError::Unauthorized("no access token".to_string()))?;

        if !Self::is_token_expired(&current) {
            return Ok(current.access_token);
        }

        tracing::debug!("access token expired, refreshing");
        let fresh = self.refresh_token(&current).await?;

        if let Some(state_dir) = &self.state_dir {
            if let Err(e) = credentials::save(state_dir, &fresh) {
                tracing::warn!(error = %e, "failed to persist refreshed token");
            }
        }

        *self.token.lock().await = Some(fresh.clone());
        Ok(fresh.access_token)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<Response, CatalogError> {
        let token = self.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self.authorized(self.http.get(url)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(CatalogError::RateLimited { retry_after });
    }

    let message = parse_spotify_error(&response.text().await.unwrap_or_default());
    if status == StatusCode::UNAUTHORIZED {
        return Err(CatalogError::Unauthorized(message));
    }

    Err(CatalogError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    async fn current_user(&self) -> Result<CurrentUser, CatalogError> {
        let user: SpotifyUser = self.get_json(&format!("{}/me", self.api_base)).await?;
        Ok(CurrentUser {
            id: user.id,
            display_name: user.display_name,
        })
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.api_base,
            urlencoding::encode(query),
            limit
        );

        let resp: SearchResponse = self.get_json(&url).await?;
        Ok(resp.tracks.items.into_iter().flatten().map(SearchHit::from).collect())
    }

    async fn list_owned_playlists(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistSummary>, CatalogError> {
        let url = format!(
            "{}/me/playlists?limit={}&offset={}",
            self.api_base, limit, offset
        );

        let resp: Paging<SpotifyPlaylist> = self.get_json(&url).await?;
        Ok(Page {
            has_next: resp.next.is_some(),
            items: resp
                .items
                .into_iter()
                .map(|p| PlaylistSummary {
                    id: p.id,
                    name: p.name,
                    owner_id: p.owner.id,
                    description: p.description.filter(|d| !d.is_empty()),
                })
                .collect(),
        })
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Page<PlaylistEntry>, CatalogError> {
        let url = format!(
            "{}/playlists/{}/tracks?limit={}&offset={}",
            self.api_base,
            urlencoding::encode(playlist_id),
            limit,
            offset
        );

        let resp: Paging<SpotifyPlaylistItem> = self.get_json(&url).await?;
        Ok(Page {
            has_next: resp.next.is_some(),
            // Unavailable tracks come back with a null track object
            items: resp
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .map(PlaylistEntry::from)
                .collect(),
        })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<String, CatalogError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base,
            urlencoding::encode(owner_id)
        );
        let body = serde_json::json!({
            "name": name,
            "public": public,
            "description": description,
        });

        let response = self.authorized(self.http.post(&url).json(&body)).await?;
        let created: CreatedPlaylist = serde_json::from_str(&response.text().await?)?;
        Ok(created.id)
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base,
            urlencoding::encode(playlist_id)
        );
        let body = serde_json::json!({ "uris": uris });

        self.authorized(self.http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn remove_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base,
            urlencoding::encode(playlist_id)
        );
        let tracks: Vec<_> = uris
            .iter()
            .map(|uri| serde_json::json!({ "uri": uri }))
            .collect();
        let body = serde_json::json!({ "tracks": tracks });

        self.authorized(self.http.delete(&url).json(&body)).await?;
        Ok(())
    }
}
