//! Best-effort ID3 tagging of finished downloads.

use crate::log_debug;
use crate::spotify::Track;
use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const ARTWORK_TIMEOUT: Duration = Duration::from_secs(15);
const ARTWORK_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("tagging is only supported for mp3 files: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to write ID3 tags: {0}")]
    Id3(#[from] id3::Error),
}

/// `write(path, track)`. Callers treat every failure as non-fatal.
pub trait TagWriter {
    fn write(&mut self, path: &Path, track: &Track) -> Result<(), TagError>;
}

/// Text frames plus optional cover art, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: Option<i32>,
    pub track_number: Option<u32>,
    pub artwork: Option<Vec<u8>>,
}

impl TrackTags {
    pub fn from_track(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track.year().and_then(|year| year.parse().ok()),
            track_number: track.track_number.filter(|number| *number > 0),
            artwork: None,
        }
    }

    pub fn apply(&self, tag: &mut Tag) {
        tag.set_title(self.title.as_str());
        tag.set_artist(self.artist.as_str());
        tag.set_album(self.album.as_str());
        if let Some(year) = self.year {
            tag.set_year(year);
        }
        if let Some(number) = self.track_number {
            tag.set_track(number);
        }
        if let Some(artwork) = &self.artwork {
            tag.add_frame(Picture {
                mime_type: "image/jpeg".to_string(),
                picture_type: PictureType::CoverFront,
                description: "Album Artwork".to_string(),
                data: artwork.clone(),
            });
        }
    }
}

/// Merge `tags` into whatever tag the file already carries and save as ID3v2.3.
pub fn write_tags(path: &Path, tags: &TrackTags) -> Result<(), TagError> {
    let is_mp3 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
    if !is_mp3 {
        return Err(TagError::UnsupportedFormat(path.display().to_string()));
    }
    let mut tag = Tag::read_from_path(path).unwrap_or_default();
    tags.apply(&mut tag);
    tag.write_to_path(path, Version::Id3v23)?;
    Ok(())
}

/// Writes ID3 frames and downloads cover art over HTTP.
pub struct Id3TagWriter {
    agent: ureq::Agent,
}

impl Id3TagWriter {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(ARTWORK_TIMEOUT).build(),
        }
    }

    /// Missing or unreachable artwork just means no picture frame.
    fn fetch_artwork(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(err) => {
                log_debug(&format!("artwork fetch failed: {err}"));
                return None;
            }
        };
        let mut data = Vec::new();
        response
            .into_reader()
            .take(ARTWORK_MAX_BYTES)
            .read_to_end(&mut data)
            .ok()?;
        (!data.is_empty()).then_some(data)
    }
}

impl Default for Id3TagWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TagWriter for Id3TagWriter {
    fn write(&mut self, path: &Path, track: &Track) -> Result<(), TagError> {
        let mut tags = TrackTags::from_track(track);
        tags.artwork = track
            .artwork_url
            .as_deref()
            .and_then(|url| self.fetch_artwork(url));
        write_tags(path, &tags)
    }
}
