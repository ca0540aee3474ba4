use serde::Deserialize;

/// A track as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Track {
    pub id: String,
    pub title: String,
    /// Every credited artist, joined with ", ".
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
    pub release_date: Option<String>,
    pub track_number: Option<u32>,
    pub url: Option<String>,
}

impl Track {
    /// Four-digit year from the release date (`"1997-05-21"` -> `"1997"`).
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub artwork_url: Option<String>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub release_date: Option<String>,
    pub artwork_url: Option<String>,
    pub tracks: Vec<Track>,
}

impl Album {
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
    }
}

/// Sum of track durations.
pub fn total_duration_ms(tracks: &[Track]) -> u64 {
    tracks.iter().map(|track| track.duration_ms).sum()
}

// Wire shapes. Only the fields we read are declared.

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AuthErrorBody {
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiImage {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiAlbumRef {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ApiImage>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiTrack {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    /// Absent on album track listings.
    #[serde(default)]
    pub album: Option<ApiAlbumRef>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
pub(super) struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlaylistItem {
    #[serde(default)]
    pub track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiOwner {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: ApiOwner,
    #[serde(default)]
    pub images: Vec<ApiImage>,
    pub tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiAlbum {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    #[serde(default)]
    pub images: Vec<ApiImage>,
    #[serde(default)]
    pub release_date: Option<String>,
    pub tracks: Paging<ApiTrack>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    pub tracks: Paging<ApiTrack>,
}

pub(super) fn join_artists(artists: &[ApiArtist]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_image(images: &[ApiImage]) -> Option<String> {
    images.first().map(|image| image.url.clone())
}

impl ApiTrack {
    /// Normalize a full track object (track, playlist item, search hit).
    pub(super) fn into_track(self) -> Track {
        let (album, artwork_url, release_date) = match self.album {
            Some(album) => (album.name, first_image(&album.images), album.release_date),
            None => (String::new(), None, None),
        };
        Track {
            id: self.id.unwrap_or_default(),
            title: self.name,
            artist: join_artists(&self.artists),
            album,
            duration_ms: self.duration_ms,
            artwork_url,
            release_date,
            track_number: self.track_number,
            url: self.external_urls.spotify,
        }
    }

    /// Normalize a simplified track from an album listing, borrowing album fields.
    pub(super) fn into_album_track(self, album: &Album) -> Track {
        Track {
            id: self.id.unwrap_or_default(),
            title: self.name,
            artist: join_artists(&self.artists),
            album: album.name.clone(),
            duration_ms: self.duration_ms,
            artwork_url: album.artwork_url.clone(),
            release_date: album.release_date.clone(),
            track_number: self.track_number,
            url: self.external_urls.spotify,
        }
    }
}

impl ApiPlaylist {
    /// Header fields plus the first page of tracks; the client appends later pages.
    pub(super) fn into_playlist(self) -> (Playlist, Option<String>) {
        let next = self.tracks.next;
        let tracks = playlist_tracks(self.tracks.items);
        let owner = self
            .owner
            .display_name
            .or(self.owner.id)
            .unwrap_or_default();
        let playlist = Playlist {
            name: self.name,
            description: self.description.unwrap_or_default(),
            owner,
            artwork_url: first_image(&self.images),
            tracks,
        };
        (playlist, next)
    }
}

impl ApiAlbum {
    pub(super) fn into_album(self) -> (Album, Option<String>) {
        let mut album = Album {
            name: self.name,
            artist: join_artists(&self.artists),
            release_date: self.release_date,
            artwork_url: first_image(&self.images),
            tracks: Vec::new(),
        };
        let next = self.tracks.next;
        album.tracks = album_tracks(self.tracks.items, &album);
        (album, next)
    }
}

/// Playlist entries can be null (removed or local-only tracks); those are skipped.
pub(super) fn playlist_tracks(items: Vec<PlaylistItem>) -> Vec<Track> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(ApiTrack::into_track)
        .collect()
}

pub(super) fn album_tracks(items: Vec<ApiTrack>, album: &Album) -> Vec<Track> {
    items
        .into_iter()
        .map(|item| item.into_album_track(album))
        .collect()
}
