use super::*;
use crate::resolver::{MatchConfidence, ResolveError, SourceMatch};
use crate::tagging::TagError;
use crate::transfer::TransferError;
use std::collections::HashMap;
use std::path::Path;

fn track(title: &str, artist: &str, duration_ms: u64) -> Track {
    Track {
        id: title.to_lowercase(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: "Album".to_string(),
        duration_ms,
        ..Track::default()
    }
}

/// Resolves every title except those listed as missing.
#[derive(Default)]
struct FakeResolver {
    missing: Vec<String>,
    confidence: HashMap<String, MatchConfidence>,
    calls: Vec<String>,
}

impl SourceResolver for FakeResolver {
    fn resolve(
        &mut self,
        title: &str,
        _artist: &str,
        duration_ms: u64,
    ) -> Result<SourceMatch, ResolveError> {
        self.calls.push(title.to_string());
        if self.missing.iter().any(|missing| missing == title) {
            return Err(ResolveError::NoMatch);
        }
        Ok(SourceMatch {
            url: format!("https://example.invalid/{title}"),
            video_id: title.to_string(),
            title: title.to_string(),
            duration_seconds: duration_ms as f64 / 1000.0,
            confidence: self
                .confidence
                .get(title)
                .copied()
                .unwrap_or(MatchConfidence::Verified),
        })
    }
}

/// Writes a small file and replays a scripted progress sequence.
struct FakeTransfer {
    progress: Vec<(f64, &'static str)>,
    fail_urls: Vec<String>,
    requests: Vec<TransferRequest>,
}

impl FakeTransfer {
    fn new(progress: Vec<(f64, &'static str)>) -> Self {
        Self {
            progress,
            fail_urls: Vec::new(),
            requests: Vec::new(),
        }
    }
}

impl Transfer for FakeTransfer {
    fn transfer(
        &mut self,
        request: &TransferRequest,
        on_progress: &mut dyn FnMut(f64, &str),
    ) -> Result<PathBuf, TransferError> {
        self.requests.push(request.clone());
        for (percent, message) in &self.progress {
            on_progress(*percent, message);
        }
        if self.fail_urls.contains(&request.source_url) {
            return Err(TransferError::Exit {
                code: Some(1),
                stderr: "ERROR: unavailable".to_string(),
            });
        }
        let path = request.expected_path();
        fs::write(&path, vec![0u8; 1234]).map_err(TransferError::Io)?;
        Ok(path)
    }
}

#[derive(Default)]
struct FakeTagger {
    fail: bool,
    tagged: Vec<PathBuf>,
}

impl TagWriter for FakeTagger {
    fn write(&mut self, path: &Path, _track: &Track) -> Result<(), TagError> {
        self.tagged.push(path.to_path_buf());
        if self.fail {
            Err(TagError::UnsupportedFormat(path.display().to_string()))
        } else {
            Ok(())
        }
    }
}

fn options(dir: &Path) -> PipelineOptions {
    PipelineOptions {
        output_dir: dir.to_path_buf(),
        audio_format: "mp3".to_string(),
        audio_quality: "best".to_string(),
    }
}

#[test]
fn failed_search_then_success_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![track("A", "X", 200_000), track("B", "Y", 180_000)];
    let mut resolver = FakeResolver {
        missing: vec!["A".to_string()],
        ..FakeResolver::default()
    };
    let mut transfer = FakeTransfer::new(vec![(50.0, "Downloading..."), (100.0, "Done")]);
    let mut tagger = FakeTagger::default();

    let results = DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |_| {})
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert_eq!(results[0].error.as_deref(), Some("No match found"));
    assert_eq!(results[0].track.title, "A");
    assert!(results[1].success);
    assert_eq!(
        results[1].file_path.as_deref(),
        Some(dir.path().join("B — Y.mp3").as_path())
    );
    assert_eq!(results[1].file_size, Some(1234));
    assert_eq!(resolver.calls, vec!["A", "B"]);
    assert_eq!(transfer.requests.len(), 1);
}

#[test]
fn one_result_per_track_even_when_everything_fails() {
    let dir = tempfile::tempdir().unwrap();
    let tracks: Vec<Track> = (0..5)
        .map(|index| track(&format!("T{index}"), "Artist", 1000))
        .collect();
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(Vec::new());
    transfer.fail_urls = tracks
        .iter()
        .map(|track| format!("https://example.invalid/{}", track.title))
        .collect();
    let mut tagger = FakeTagger::default();

    let results = DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |_| {})
        .unwrap();

    assert_eq!(results.len(), tracks.len());
    for (result, track) in results.iter().zip(&tracks) {
        assert_eq!(result.track.title, track.title);
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("yt-dlp exited with code 1: ERROR: unavailable")
        );
    }
    assert!(tagger.tagged.is_empty());
}

#[test]
fn displayed_percent_never_decreases() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![track("A", "X", 1000), track("B", "Y", 1000)];
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(vec![
        (10.0, "Downloading..."),
        (40.0, "Downloading..."),
        (20.0, "Downloading..."),
        (40.0, "Converting..."),
        (5.0, "Converting..."),
        (100.0, "Done"),
    ]);
    let mut tagger = FakeTagger::default();
    let mut seen: Vec<Vec<f64>> = vec![Vec::new(); tracks.len()];

    DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |progress| {
            let active = progress.active;
            seen[active].push(progress.statuses[active].percent());
        })
        .unwrap();

    for percents in &seen {
        assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]), "{percents:?}");
        assert_eq!(percents.last().copied(), Some(100.0));
    }
}

#[test]
fn observer_sees_every_state_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![track("A", "X", 1000)];
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(vec![(30.0, "Downloading...")]);
    let mut tagger = FakeTagger::default();
    let mut states = Vec::new();

    DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |progress| {
            let state = progress.statuses[0].state();
            if states.last() != Some(&state) {
                states.push(state);
            }
        })
        .unwrap();

    assert_eq!(
        states,
        vec![
            TrackState::Searching,
            TrackState::Downloading,
            TrackState::Metadata,
            TrackState::Done
        ]
    );
}

#[test]
fn tag_failure_keeps_track_successful() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![track("A", "X", 1000)];
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(Vec::new());
    let mut tagger = FakeTagger {
        fail: true,
        ..FakeTagger::default()
    };

    let results = DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |_| {})
        .unwrap();

    assert!(results[0].success);
    assert!(results[0].error.is_none());
    assert_eq!(tagger.tagged.len(), 1);
}

#[test]
fn low_confidence_match_is_kept_on_result() {
    let dir = tempfile::tempdir().unwrap();
    let tracks = vec![track("A", "X", 1000), track("B", "Y", 1000)];
    let mut resolver = FakeResolver::default();
    resolver
        .confidence
        .insert("B".to_string(), MatchConfidence::LowConfidence);
    let mut transfer = FakeTransfer::new(Vec::new());
    let mut tagger = FakeTagger::default();

    let results = DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&tracks, &mut |_| {})
        .unwrap();

    assert!(!results[0].is_low_confidence());
    assert!(results[1].is_low_confidence());
    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.low_confidence, 1);
    assert_eq!(summary.total_bytes, 2468);
}

#[test]
fn unusable_output_dir_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"not a directory").unwrap();
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(Vec::new());
    let mut tagger = FakeTagger::default();

    let err = DownloadPipeline::new(
        &mut resolver,
        &mut transfer,
        &mut tagger,
        options(&blocker.join("nested")),
    )
    .run(&[track("A", "X", 1000)], &mut |_| {})
    .unwrap_err();

    assert!(matches!(err, PipelineError::OutputDir { .. }));
    assert!(resolver.calls.is_empty());
}

#[test]
fn empty_track_list_yields_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = FakeResolver::default();
    let mut transfer = FakeTransfer::new(Vec::new());
    let mut tagger = FakeTagger::default();
    let results = DownloadPipeline::new(&mut resolver, &mut transfer, &mut tagger, options(dir.path()))
        .run(&[], &mut |_| panic!("no progress expected"))
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn status_percent_is_clamped_and_monotonic() {
    let mut status = TrackStatus::queued();
    assert!(status.advance(30.0));
    assert!(!status.advance(30.0));
    assert!(!status.advance(12.0));
    assert!(status.advance(250.0));
    assert_eq!(status.percent(), 100.0);
}
