use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Track,
    Album,
    Playlist,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Track => "track",
            ResourceKind::Album => "album",
            ResourceKind::Playlist => "playlist",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "track" => Some(ResourceKind::Track),
            "album" => Some(ResourceKind::Album),
            "playlist" => Some(ResourceKind::Playlist),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed Spotify link: what it points at and its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyRef {
    pub kind: ResourceKind,
    pub id: String,
}

fn web_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"open\.spotify\.com/(?:intl-[A-Za-z-]+/)?(track|album|playlist)/([a-zA-Z0-9]+)")
            .expect("spotify web pattern should compile")
    })
}

fn uri_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"spotify:(track|album|playlist):([a-zA-Z0-9]+)")
            .expect("spotify uri pattern should compile")
    })
}

/// Accepts `https://open.spotify.com/{track|album|playlist}/ID` (query string and
/// `intl-xx/` prefix allowed) and `spotify:{kind}:ID`.
pub fn parse_spotify_url(input: &str) -> Option<SpotifyRef> {
    let input = input.trim();
    let captures = web_pattern()
        .captures(input)
        .or_else(|| uri_pattern().captures(input))?;
    let kind = ResourceKind::from_segment(captures.get(1)?.as_str())?;
    Some(SpotifyRef {
        kind,
        id: captures.get(2)?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_web_urls() {
        let parsed =
            parse_spotify_url("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc")
                .unwrap();
        assert_eq!(parsed.kind, ResourceKind::Playlist);
        assert_eq!(parsed.id, "37i9dQZF1DXcBWIGoYBM5M");
    }

    #[test]
    fn parses_localized_web_urls() {
        let parsed = parse_spotify_url("https://open.spotify.com/intl-de/track/4uLU6hMCjMI75M1A2tKUQC")
            .unwrap();
        assert_eq!(parsed.kind, ResourceKind::Track);
        assert_eq!(parsed.id, "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn parses_uris() {
        let parsed = parse_spotify_url("spotify:album:1DFixLWuPkv3KT3TnV35m3").unwrap();
        assert_eq!(parsed.kind, ResourceKind::Album);
        assert_eq!(parsed.kind.to_string(), "album");
    }

    #[test]
    fn rejects_other_links() {
        assert_eq!(parse_spotify_url(""), None);
        assert_eq!(parse_spotify_url("https://open.spotify.com/artist/abc"), None);
        assert_eq!(parse_spotify_url("https://youtube.com/watch?v=abc"), None);
        assert_eq!(parse_spotify_url("spotify:show:abc"), None);
    }
}
