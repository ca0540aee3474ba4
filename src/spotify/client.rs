use super::model::{
    album_tracks, playlist_tracks, Album, ApiAlbum, ApiPlaylist, ApiTrack, AuthErrorBody, Paging,
    Playlist, PlaylistItem, SearchResponse, TokenResponse, Track,
};
use crate::log_debug;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const SEARCH_LIMIT: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
// Sessions are treated as expired a minute before Spotify says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
// Upper bound on a server-supplied `expires_in`.
const MAX_SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);
// Guard against a malformed `next` chain.
const MAX_PAGES: usize = 200;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Spotify auth failed: {0}")]
    Rejected(String),
    #[error("Spotify auth failed: {0}")]
    Transport(String),
    #[error("Spotify auth failed: unexpected response ({0})")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Spotify token expired. Re-authenticate.")]
    TokenExpired,
    #[error("Spotify API error: {status} {text}")]
    Api { status: u16, text: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Unexpected Spotify response: {0}")]
    Decode(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Bearer token plus the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    expires_at: Instant,
}

impl Session {
    pub fn new(token: impl Into<String>, expires_in: Duration, now: Instant) -> Self {
        let lifetime = expires_in
            .min(MAX_SESSION_LIFETIME)
            .saturating_sub(EXPIRY_MARGIN);
        Self {
            token: token.into(),
            expires_at: now.checked_add(lifetime).unwrap_or(now),
        }
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Instant::now())
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

/// Metadata source the flow controller talks to.
pub trait MusicCatalog {
    fn authenticate(&mut self) -> Result<(), AuthError>;
    fn track(&mut self, id: &str) -> Result<Track, FetchError>;
    fn playlist(&mut self, id: &str) -> Result<Playlist, FetchError>;
    fn album(&mut self, id: &str) -> Result<Album, FetchError>;
    fn search_tracks(&mut self, query: &str, limit: usize) -> Result<Vec<Track>, FetchError>;
}

/// Spotify Web API client using the client-credentials grant.
pub struct SpotifyClient {
    agent: ureq::Agent,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
    session: Option<Session>,
}

impl SpotifyClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_endpoints(client_id, client_secret, SPOTIFY_TOKEN_URL, SPOTIFY_API_BASE)
    }

    pub fn with_endpoints(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn basic_credentials(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }

    fn ensure_session(&mut self) -> Result<String, FetchError> {
        if let Some(session) = self.session.as_ref().filter(|session| session.is_valid()) {
            return Ok(session.token().to_string());
        }
        log_debug("spotify session missing or expired; authenticating");
        self.authenticate()?;
        self.session
            .as_ref()
            .map(|session| session.token().to_string())
            .ok_or(FetchError::TokenExpired)
    }

    fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let token = self.ensure_session()?;
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {token}"));
        for (key, value) in query {
            request = request.query(key, value);
        }
        match request.call() {
            Ok(response) => response
                .into_json::<T>()
                .map_err(|err| FetchError::Decode(err.to_string())),
            Err(ureq::Error::Status(401, _)) => {
                self.session = None;
                Err(FetchError::TokenExpired)
            }
            Err(ureq::Error::Status(status, response)) => Err(FetchError::Api {
                status,
                text: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(FetchError::Transport(transport.to_string()))
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Follow `next` links until the collection is exhausted.
    fn collect_pages<T: DeserializeOwned>(
        &mut self,
        mut next: Option<String>,
        mut on_page: impl FnMut(Vec<T>),
    ) -> Result<(), FetchError> {
        let mut pages = 0;
        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                log_debug("spotify pagination stopped at page limit");
                break;
            }
            let page: Paging<T> = self.get_json(&url, &[])?;
            on_page(page.items);
            next = page.next;
        }
        Ok(())
    }
}

impl MusicCatalog for SpotifyClient {
    fn authenticate(&mut self) -> Result<(), AuthError> {
        let credentials = self.basic_credentials();
        let response = self
            .agent
            .post(&self.token_url)
            .set("Authorization", &credentials)
            .send_form(&[("grant_type", "client_credentials")]);
        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => {
                let status_text = response.status_text().to_string();
                let body: AuthErrorBody = response.into_json().unwrap_or_default();
                let reason = body
                    .error_description
                    .filter(|text| !text.is_empty())
                    .unwrap_or(status_text);
                return Err(AuthError::Rejected(reason));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(AuthError::Transport(transport.to_string()));
            }
        };
        let token: TokenResponse = response
            .into_json()
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;
        self.session = Some(Session::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
            Instant::now(),
        ));
        log_debug("spotify authentication succeeded");
        Ok(())
    }

    fn track(&mut self, id: &str) -> Result<Track, FetchError> {
        let url = self.endpoint(&format!("/tracks/{id}"));
        let api: ApiTrack = self.get_json(&url, &[])?;
        Ok(api.into_track())
    }

    fn playlist(&mut self, id: &str) -> Result<Playlist, FetchError> {
        let url = self.endpoint(&format!("/playlists/{id}"));
        let api: ApiPlaylist = self.get_json(&url, &[])?;
        let (mut playlist, next) = api.into_playlist();
        self.collect_pages::<PlaylistItem>(next, |items| {
            playlist.tracks.extend(playlist_tracks(items));
        })?;
        log_debug(&format!(
            "fetched playlist with {} tracks",
            playlist.tracks.len()
        ));
        Ok(playlist)
    }

    fn album(&mut self, id: &str) -> Result<Album, FetchError> {
        let url = self.endpoint(&format!("/albums/{id}"));
        let api: ApiAlbum = self.get_json(&url, &[])?;
        let (mut album, next) = api.into_album();
        let mut more = Vec::new();
        self.collect_pages::<ApiTrack>(next, |items| more.extend(items))?;
        let extra = album_tracks(more, &album);
        album.tracks.extend(extra);
        Ok(album)
    }

    fn search_tracks(&mut self, query: &str, limit: usize) -> Result<Vec<Track>, FetchError> {
        let url = self.endpoint("/search");
        let limit = limit.to_string();
        let response: SearchResponse = self.get_json(
            &url,
            &[("q", query), ("type", "track"), ("limit", limit.as_str())],
        )?;
        Ok(response
            .tracks
            .items
            .into_iter()
            .map(ApiTrack::into_track)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_expiry_is_capped_to_a_day() {
        let now = Instant::now();
        let session = Session::new("tok", Duration::MAX, now);
        assert!(session.is_valid_at(now + Duration::from_secs(3600)));
        assert!(!session.is_valid_at(now + Duration::from_secs(2 * 24 * 60 * 60)));

        let huge = Session::new("tok", Duration::from_secs(u64::MAX), now);
        assert!(huge.expires_at() > now);
    }

    #[test]
    fn session_expires_a_minute_early() {
        let now = Instant::now();
        let session = Session::new("tok", Duration::from_secs(3600), now);
        assert!(session.is_valid_at(now + Duration::from_secs(3539)));
        assert!(!session.is_valid_at(now + Duration::from_secs(3540)));
        assert_eq!(session.token(), "tok");
    }

    #[test]
    fn short_lived_session_is_immediately_stale() {
        let now = Instant::now();
        let session = Session::new("tok", Duration::from_secs(30), now);
        assert!(!session.is_valid_at(now));
    }

    #[test]
    fn basic_credentials_are_base64() {
        let client = SpotifyClient::new("id", "secret");
        assert_eq!(client.basic_credentials(), "Basic aWQ6c2VjcmV0");
        assert!(client.session().is_none());
    }

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = SpotifyClient::with_endpoints("a", "b", "http://token", "http://api/v1/");
        assert_eq!(client.endpoint("/tracks/x"), "http://api/v1/tracks/x");
    }

    #[test]
    fn error_messages_match_operator_text() {
        assert_eq!(
            FetchError::TokenExpired.to_string(),
            "Spotify token expired. Re-authenticate."
        );
        assert_eq!(
            FetchError::Api {
                status: 404,
                text: "Not Found".into()
            }
            .to_string(),
            "Spotify API error: 404 Not Found"
        );
        assert_eq!(
            AuthError::Rejected("Invalid client".into()).to_string(),
            "Spotify auth failed: Invalid client"
        );
    }

    #[test]
    fn unreachable_token_endpoint_is_transport_error() {
        let mut client =
            SpotifyClient::with_endpoints("a", "b", "http://127.0.0.1:9/token", "http://127.0.0.1:9");
        assert!(matches!(client.authenticate(), Err(AuthError::Transport(_))));
        assert!(matches!(
            client.track("x"),
            Err(FetchError::Auth(AuthError::Transport(_)))
        ));
    }
}
