//! Spotify Web API: link parsing, client-credentials session and normalized metadata.

mod client;
mod model;
mod url;

pub use client::{
    AuthError, FetchError, MusicCatalog, Session, SpotifyClient, SEARCH_LIMIT, SPOTIFY_API_BASE,
    SPOTIFY_TOKEN_URL,
};
pub use model::{total_duration_ms, Album, Playlist, Track};
pub use url::{parse_spotify_url, ResourceKind, SpotifyRef};
