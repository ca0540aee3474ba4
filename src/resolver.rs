//! Finds a video-platform source for a track by scraping the public search page.

use crate::log_debug;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

pub const YOUTUBE_SEARCH_URL: &str = "https://www.youtube.com/results";
/// A candidate within this many seconds of the track length counts as verified.
pub const DURATION_TOLERANCE_SECS: f64 = 10.0;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const CANDIDATES_POINTER: &str =
    "/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents";

/// How much the chosen source can be trusted to be the right recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchConfidence {
    /// Duration within tolerance of the track.
    Verified,
    /// First search hit; duration unknown or outside tolerance.
    BestEffort,
    /// Bare video id scraped from the page; nothing was checked.
    LowConfidence,
}

impl MatchConfidence {
    pub fn label(self) -> &'static str {
        match self {
            MatchConfidence::Verified => "verified",
            MatchConfidence::BestEffort => "best effort",
            MatchConfidence::LowConfidence => "low confidence",
        }
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceMatch {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub duration_seconds: f64,
    pub confidence: MatchConfidence,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No match found")]
    NoMatch,
    #[error("No YouTube results found for \"{0}\"")]
    NoResults(String),
    #[error("Search request failed: {0}")]
    Transport(String),
}

/// `resolve(title, artist, duration) -> source | error`
pub trait SourceResolver {
    fn resolve(
        &mut self,
        title: &str,
        artist: &str,
        duration_ms: u64,
    ) -> Result<SourceMatch, ResolveError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: String,
    pub duration_seconds: u64,
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// `"3:45"` or `"1:02:03"` to seconds; anything else is 0.
pub fn parse_duration(text: &str) -> u64 {
    let parts: Option<Vec<u64>> = text
        .trim()
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect();
    match parts.as_deref() {
        Some([hours, minutes, seconds]) => hours * 3600 + minutes * 60 + seconds,
        Some([minutes, seconds]) => minutes * 60 + seconds,
        _ => 0,
    }
}

fn initial_data_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)var ytInitialData = (\{.*?\});</script>")
            .expect("initial data pattern should compile")
    })
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""videoId":"([a-zA-Z0-9_-]{11})""#).expect("video id pattern should compile")
    })
}

/// Video results from the embedded `ytInitialData` blob, in page order.
pub fn extract_candidates(html: &str) -> Vec<VideoCandidate> {
    let Some(blob) = initial_data_pattern()
        .captures(html)
        .and_then(|captures| captures.get(1))
    else {
        return Vec::new();
    };
    let data: Value = match serde_json::from_str(blob.as_str()) {
        Ok(data) => data,
        Err(err) => {
            log_debug(&format!("search page data did not parse: {err}"));
            return Vec::new();
        }
    };
    let Some(sections) = data.pointer(CANDIDATES_POINTER).and_then(Value::as_array) else {
        return Vec::new();
    };
    sections
        .iter()
        .filter_map(|section| {
            section
                .pointer("/itemSectionRenderer/contents")
                .and_then(Value::as_array)
        })
        .flatten()
        .filter_map(|item| item.get("videoRenderer"))
        .filter_map(|video| {
            let video_id = video.get("videoId")?.as_str()?.to_string();
            let title = video
                .pointer("/title/runs/0/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if video_id.is_empty() || title.is_empty() {
                return None;
            }
            let duration_seconds = video
                .pointer("/lengthText/simpleText")
                .and_then(Value::as_str)
                .map(parse_duration)
                .unwrap_or(0);
            Some(VideoCandidate {
                video_id,
                title,
                duration_seconds,
            })
        })
        .collect()
}

/// Unique video ids anywhere in the page, first occurrence first.
pub fn extract_video_ids(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    video_id_pattern()
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Closest duration within tolerance is verified; otherwise the first hit is taken as best effort.
pub fn pick_candidate(
    candidates: &[VideoCandidate],
    duration_ms: u64,
) -> Option<(&VideoCandidate, MatchConfidence)> {
    let first = candidates.first()?;
    if duration_ms == 0 {
        return Some((first, MatchConfidence::BestEffort));
    }
    let target = duration_ms as f64 / 1000.0;
    let distance = |candidate: &VideoCandidate| (candidate.duration_seconds as f64 - target).abs();
    let closest = candidates.iter().fold(first, |best, candidate| {
        if distance(candidate) < distance(best) {
            candidate
        } else {
            best
        }
    });
    if distance(closest) <= DURATION_TOLERANCE_SECS {
        Some((closest, MatchConfidence::Verified))
    } else {
        Some((first, MatchConfidence::BestEffort))
    }
}

/// Scrapes www.youtube.com/results; falls back to a bare id scan of an "audio" query.
pub struct YouTubeResolver {
    agent: ureq::Agent,
    search_url: String,
}

impl YouTubeResolver {
    pub fn new() -> Self {
        Self::with_search_url(YOUTUBE_SEARCH_URL)
    }

    pub fn with_search_url(search_url: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            search_url: search_url.into(),
        }
    }

    fn fetch_results_page(&self, query: &str) -> Result<Option<String>, ResolveError> {
        let response = self
            .agent
            .get(&self.search_url)
            .set("User-Agent", USER_AGENT)
            .set("Accept-Language", "en-US,en;q=0.9")
            .query("search_query", query)
            .call();
        match response {
            Ok(response) => response
                .into_string()
                .map(Some)
                .map_err(|err| ResolveError::Transport(err.to_string())),
            Err(ureq::Error::Status(status, _)) => {
                log_debug(&format!("search page returned HTTP {status}"));
                Ok(None)
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ResolveError::Transport(transport.to_string()))
            }
        }
    }

    fn search_primary(&self, query: &str, duration_ms: u64) -> Option<SourceMatch> {
        let html = match self.fetch_results_page(query) {
            Ok(Some(html)) => html,
            Ok(None) => return None,
            Err(err) => {
                log_debug(&format!("primary search failed: {err}"));
                return None;
            }
        };
        let candidates = extract_candidates(&html);
        let (candidate, confidence) = pick_candidate(&candidates, duration_ms)?;
        Some(SourceMatch {
            url: watch_url(&candidate.video_id),
            video_id: candidate.video_id.clone(),
            title: candidate.title.clone(),
            duration_seconds: candidate.duration_seconds as f64,
            confidence,
        })
    }

    fn search_fallback(&self, query: &str, duration_ms: u64) -> Result<SourceMatch, ResolveError> {
        let html = self
            .fetch_results_page(&format!("{query} audio"))?
            .ok_or(ResolveError::NoMatch)?;
        let video_id = extract_video_ids(&html)
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoResults(query.to_string()))?;
        Ok(SourceMatch {
            url: watch_url(&video_id),
            video_id,
            title: query.to_string(),
            duration_seconds: duration_ms as f64 / 1000.0,
            confidence: MatchConfidence::LowConfidence,
        })
    }
}

impl Default for YouTubeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceResolver for YouTubeResolver {
    fn resolve(
        &mut self,
        title: &str,
        artist: &str,
        duration_ms: u64,
    ) -> Result<SourceMatch, ResolveError> {
        let query = format!("{title} {artist}");
        if let Some(found) = self.search_primary(&query, duration_ms) {
            return Ok(found);
        }
        log_debug("primary search found nothing; trying id scan");
        self.search_fallback(&query, duration_ms)
    }
}
