use super::*;
use crate::config::{ConfigStore, UserConfig};
use crate::input::{scripted_dispatcher, KeyDispatcher, KeyInput};
use crate::modal::CheckboxState;
use crate::pipeline::{DownloadResult, PipelineProgress, TrackStatus};
use crate::render::{strip_styles, MemoryScreen, PLAIN_PALETTE};
use crate::resolver::MatchConfidence;
use crate::spotify::{
    Album, AuthError, FetchError, MusicCatalog, Playlist, ResourceKind, Track,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn scripted(keys: &[KeyInput]) -> KeyDispatcher {
    let (tx, dispatcher) = scripted_dispatcher();
    for key in keys {
        tx.send(*key).unwrap();
    }
    dispatcher
}

fn typed(text: &str) -> Vec<KeyInput> {
    text.chars()
        .map(|ch| if ch == ' ' { KeyInput::Space } else { KeyInput::Char(ch) })
        .collect()
}

fn track(title: &str, artist: &str) -> Track {
    Track {
        id: title.to_lowercase(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: "Record".to_string(),
        duration_ms: 185_000,
        release_date: Some("2001-06-01".to_string()),
        ..Track::default()
    }
}

fn tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|index| track(&format!("Song {index}"), "Band"))
        .collect()
}

struct SearchOnly {
    results: Result<Vec<Track>, String>,
    queries: Vec<String>,
}

impl MusicCatalog for SearchOnly {
    fn authenticate(&mut self) -> Result<(), AuthError> {
        Ok(())
    }

    fn track(&mut self, _id: &str) -> Result<Track, FetchError> {
        Err(FetchError::Decode("unused".into()))
    }

    fn playlist(&mut self, _id: &str) -> Result<Playlist, FetchError> {
        Err(FetchError::Decode("unused".into()))
    }

    fn album(&mut self, _id: &str) -> Result<Album, FetchError> {
        Err(FetchError::Decode("unused".into()))
    }

    fn search_tracks(&mut self, query: &str, _limit: usize) -> Result<Vec<Track>, FetchError> {
        self.queries.push(query.to_string());
        self.results.clone().map_err(|text| FetchError::Api { status: 500, text })
    }
}

#[test]
fn welcome_maps_cursor_to_action() {
    let mut keys = scripted(&[KeyInput::Down, KeyInput::Return]);
    let mut screen = MemoryScreen::default();
    let action = show_welcome(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(action, MainAction::Search);

    let first = strip_styles(&screen.frames()[0]);
    assert!(first.contains("> Paste a Spotify URL"));
    assert!(screen.last_plain().contains("> Search for a song"));
    assert!(first.contains(concat!("v", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn welcome_escape_and_wrap_to_exit() {
    let mut keys = scripted(&[KeyInput::Escape]);
    let mut screen = MemoryScreen::default();
    let action = show_welcome(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(action, MainAction::Exit);

    let mut keys = scripted(&[KeyInput::Up, KeyInput::Return]);
    let action = show_welcome(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(action, MainAction::Exit);
}

#[test]
fn url_validation_states() {
    assert_eq!(validate_url_text("   "), UrlValidation::Empty);
    assert_eq!(
        validate_url_text(" https://open.spotify.com/album/abc123 "),
        UrlValidation::Valid(ResourceKind::Album)
    );
    assert_eq!(validate_url_text("https://example.com"), UrlValidation::Invalid);

    let valid = url_input_frame(&PLAIN_PALETTE, "spotify:playlist:xyz");
    assert!(valid.contains("Valid Playlist URL detected"));
    let invalid = url_input_frame(&PLAIN_PALETTE, "nope");
    assert!(invalid.contains("Not a valid Spotify URL"));
    assert!(url_input_frame(&PLAIN_PALETTE, "").contains("Supported:"));
}

#[test]
fn url_input_redraws_per_keystroke_and_trims() {
    let mut input = vec![KeyInput::Space];
    input.extend(typed("spotify:track:abc"));
    input.push(KeyInput::Return);
    let mut keys = scripted(&input);
    let mut screen = MemoryScreen::default();
    let url = show_url_input(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(url.as_deref(), Some("spotify:track:abc"));
    assert_eq!(screen.frames().len(), input.len());
    assert!(screen.last_plain().contains("Valid Track URL detected"));
}

#[test]
fn blank_url_counts_as_cancel() {
    let mut keys = scripted(&[KeyInput::Space, KeyInput::Return]);
    let mut screen = MemoryScreen::default();
    let url = show_url_input(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(url, None);
}

#[test]
fn preview_shows_metadata_and_confirms() {
    let song = track("Title", "Artist");
    let frame = preview_frame(&PLAIN_PALETTE, &song);
    assert!(frame.contains("Track found"));
    assert!(frame.contains("Record  (2001)"));
    assert!(frame.contains("3:05"));

    let mut keys = scripted(&[KeyInput::Down, KeyInput::Return]);
    let mut screen = MemoryScreen::default();
    assert!(show_preview(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &song).unwrap());

    let mut keys = scripted(&[KeyInput::Escape]);
    assert!(!show_preview(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &song).unwrap());
}

#[test]
fn search_picks_highlighted_result() {
    let mut catalog = SearchOnly {
        results: Ok(vec![track("One", "A"), track("Two", "B")]),
        queries: Vec::new(),
    };
    let mut input = typed(" daft punk ");
    input.extend([KeyInput::Return, KeyInput::Down, KeyInput::Return]);
    let mut keys = scripted(&input);
    let mut screen = MemoryScreen::default();
    let picked = show_search(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &mut catalog)
        .unwrap()
        .unwrap();
    assert_eq!(picked.title, "Two");
    assert_eq!(catalog.queries, vec!["daft punk"]);
    let last = screen.last_plain();
    assert!(last.contains("Results for \"daft punk\"  (2 found)"));
    assert!(last.contains("B  on  Record"));
}

#[test]
fn search_failure_and_empty_results_show_a_message() {
    let mut catalog = SearchOnly {
        results: Err("boom".into()),
        queries: Vec::new(),
    };
    let mut input = typed("x");
    input.extend([KeyInput::Return, KeyInput::Return]);
    let mut keys = scripted(&input);
    let mut screen = MemoryScreen::default();
    let picked =
        show_search(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &mut catalog).unwrap();
    assert!(picked.is_none());
    assert!(screen
        .last_plain()
        .contains("Search failed: Spotify API error: 500 boom"));

    catalog.results = Ok(Vec::new());
    let mut keys = scripted(&input);
    let picked =
        show_search(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &mut catalog).unwrap();
    assert!(picked.is_none());
    assert!(screen.last_plain().contains("No results for \"x\""));
}

#[test]
fn search_escape_skips_the_request() {
    let mut catalog = SearchOnly {
        results: Ok(vec![track("One", "A")]),
        queries: Vec::new(),
    };
    let mut keys = scripted(&[KeyInput::Char('a'), KeyInput::Escape]);
    let mut screen = MemoryScreen::default();
    let picked =
        show_search(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE), &mut catalog).unwrap();
    assert!(picked.is_none());
    assert!(catalog.queries.is_empty());
}

#[test]
fn track_list_returns_checked_tracks_in_order() {
    let playlist = Playlist {
        name: "Mix".into(),
        description: String::new(),
        owner: "sam".into(),
        artwork_url: None,
        tracks: tracks(5),
    };
    let mut keys = scripted(&[
        KeyInput::Down,
        KeyInput::Down,
        KeyInput::Space,
        KeyInput::Return,
    ]);
    let mut screen = MemoryScreen::default();
    let selected = show_track_list(
        &mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE),
        TrackCollection::Playlist(&playlist),
    )
    .unwrap()
    .unwrap();
    let titles: Vec<&str> = selected.iter().map(|track| track.title.as_str()).collect();
    assert_eq!(titles, ["Song 0", "Song 1", "Song 3", "Song 4"]);
    let last = screen.last_plain();
    assert!(last.contains("Playlist: Mix"));
    assert!(last.contains("by sam  |  5 tracks  |  15:25 total"));
    assert!(last.contains("4/5 selected"));
}

#[test]
fn track_list_escape_is_distinct_from_empty_selection() {
    let album = Album {
        name: "LP".into(),
        artist: "Band".into(),
        release_date: Some("1999".into()),
        artwork_url: None,
        tracks: tracks(2),
    };
    let mut keys = scripted(&[KeyInput::Char('a'), KeyInput::Return]);
    let mut screen = MemoryScreen::default();
    let selected = show_track_list(
        &mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE),
        TrackCollection::Album(&album),
    )
    .unwrap();
    assert_eq!(selected, Some(Vec::new()));
    assert!(screen.last_plain().contains("Album: LP"));
    assert!(screen.last_plain().contains("by Band  |  2 tracks  |  1999"));

    let mut keys = scripted(&[KeyInput::Escape]);
    let selected = show_track_list(
        &mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE),
        TrackCollection::Album(&album),
    )
    .unwrap();
    assert_eq!(selected, None);
}

#[test]
fn long_track_list_is_windowed() {
    let playlist = Playlist {
        name: "Long".into(),
        description: String::new(),
        owner: "me".into(),
        artwork_url: None,
        tracks: tracks(50),
    };
    assert_eq!(list_capacity(40), 15);
    assert_eq!(list_capacity(22), 10);
    assert_eq!(list_capacity(5), 1);

    let mut state = CheckboxState::new(50);
    for _ in 0..25 {
        state.move_down();
    }
    let frame = track_list_frame(&PLAIN_PALETTE, 22, &TrackCollection::Playlist(&playlist), &state);
    assert!(frame.contains("21-30 of 50"));
    assert!(frame.contains("Song 20 "));
    assert!(frame.contains("Song 29 "));
    assert!(!frame.contains("Song 19 "));
    assert!(!frame.contains("Song 30 "));
}

#[test]
fn progress_capacity_follows_terminal_height() {
    assert_eq!(download_capacity(3, 40), 3);
    assert_eq!(download_capacity(50, 14), 8);
    assert_eq!(download_capacity(50, 30), 20);
}

#[test]
fn progress_frame_centres_on_active_track() {
    let songs = tracks(20);
    let mut statuses = vec![TrackStatus::queued(); songs.len()];
    for status in statuses.iter_mut().take(12) {
        status.enter(crate::pipeline::TrackState::Done, "Done");
        status.file_size = Some(2048);
    }
    statuses[3].enter(crate::pipeline::TrackState::Error, "No match found");
    statuses[12].enter(crate::pipeline::TrackState::Downloading, "Downloading...");
    statuses[12].advance(50.0);
    assert_eq!(active_index(&statuses), 12);

    let progress = PipelineProgress {
        tracks: &songs,
        statuses: &statuses,
        active: 12,
    };
    let frame = progress_frame(&PLAIN_PALETTE, 18, &progress, Duration::from_secs(65));
    assert!(frame.contains("Downloading 11/20"));
    assert!(frame.contains("... 9-16 of 20"));
    assert!(frame.contains("> 13. Song 12 — Band"));
    assert!(frame.contains("██████░░░░░░  50%  Downloading..."));
    assert!(frame.contains("+  9. Song 8 — Band 2.0 KB"));
    assert!(frame.contains("Elapsed: 1m 5s  |  1 failed"));
    assert!(!frame.contains("Song 3 "));
}

fn result(title: &str, success: bool) -> DownloadResult {
    DownloadResult {
        track: track(title, "Band"),
        success,
        file_path: success.then(|| PathBuf::from(format!("/music/{title} — Band.mp3"))),
        file_size: success.then_some(1024 * 1024),
        error: (!success).then(|| "No match found".to_string()),
        confidence: Some(MatchConfidence::Verified),
    }
}

#[test]
fn completion_headline_and_summary() {
    let dir = Path::new("/music");
    let all_ok = [result("A", true), result("B", true)];
    let frame = complete_frame(&PLAIN_PALETTE, &all_ok, dir, Duration::from_secs(42));
    assert!(frame.contains("All downloads complete!"));
    assert!(frame.contains("Saved to: /music/"));
    assert!(frame.contains("2/2 downloaded  |  2.0 MB  |  42s"));

    let mut mixed = vec![result("A", true), result("B", false)];
    mixed[0].confidence = Some(MatchConfidence::LowConfidence);
    let frame = complete_frame(&PLAIN_PALETTE, &mixed, dir, Duration::from_secs(3));
    assert!(frame.contains("Downloads finished with 1 error"));
    assert!(frame.contains("(low-confidence match)"));
    assert!(frame.contains("Failed:"));
    assert!(frame.contains("No match found"));
    assert!(frame.contains("1/2 downloaded"));

    let frame = complete_frame(&PLAIN_PALETTE, &[result("A", false)], dir, Duration::ZERO);
    assert!(frame.contains("All downloads failed"));
    assert!(!frame.contains("Saved to"));
}

#[test]
fn completion_keys() {
    let results = [result("A", true)];
    let mut screen = MemoryScreen::default();
    for (key, expected) in [
        (KeyInput::Return, CompletionAction::Back),
        (KeyInput::Char('q'), CompletionAction::Quit),
        (KeyInput::Char('Q'), CompletionAction::Quit),
    ] {
        let mut keys = scripted(&[KeyInput::Escape, KeyInput::Down, key]);
        let action = show_complete(
            &mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE),
            &results,
            Path::new("/music"),
            Duration::ZERO,
        )
        .unwrap();
        assert_eq!(action, expected);
    }
}

#[test]
fn setup_collects_trimmed_credentials() {
    let mut input = typed(" abcdefghijk ");
    input.push(KeyInput::Return);
    input.extend(typed("secret"));
    input.push(KeyInput::Return);
    let mut keys = scripted(&input);
    let mut screen = MemoryScreen::default();
    let credentials = prompt_credentials(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE))
        .unwrap()
        .unwrap();
    assert_eq!(credentials.client_id, "abcdefghijk");
    assert_eq!(credentials.client_secret, "secret");
    assert!(screen.last_plain().contains("Client ID: abcdefgh..."));
}

#[test]
fn setup_escape_cancels() {
    let mut keys = scripted(&[KeyInput::Char('x'), KeyInput::Return, KeyInput::Escape]);
    let mut screen = MemoryScreen::default();
    let credentials =
        prompt_credentials(&mut Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)).unwrap();
    assert_eq!(credentials, None);
    assert!(client_id_frame(&PLAIN_PALETTE, "").contains("developer.spotify.com/dashboard"));
}

#[test]
fn settings_updates_download_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let mut config = UserConfig::default();
    let mut input = vec![KeyInput::Return];
    input.extend(std::iter::repeat(KeyInput::Backspace).take(200));
    input.extend(typed("/tmp/tunes"));
    input.push(KeyInput::Return);
    let mut keys = scripted(&input);
    let mut screen = MemoryScreen::default();
    {
        let mut ui = Ui::new(&mut keys, &mut screen, PLAIN_PALETTE)
            .with_notice_delay(Duration::ZERO);
        show_settings(&mut ui, &store, &mut config).unwrap();
    }
    assert_eq!(config.download_dir, PathBuf::from("/tmp/tunes"));
    assert_eq!(store.try_load().unwrap().download_dir, PathBuf::from("/tmp/tunes"));
    assert!(screen.last_plain().contains("Download directory updated!"));
}

#[test]
fn settings_reset_clears_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("config.json"));
    let mut config = UserConfig {
        spotify_client_id: "id".into(),
        spotify_client_secret: "secret".into(),
        ..UserConfig::default()
    };
    let mut keys = scripted(&[KeyInput::Down, KeyInput::Return]);
    let mut screen = MemoryScreen::default();
    let mut ui = Ui::new(&mut keys, &mut screen, PLAIN_PALETTE).with_notice_delay(Duration::ZERO);
    show_settings(&mut ui, &store, &mut config).unwrap();
    assert!(!config.has_credentials());
    assert!(!store.try_load().unwrap().has_credentials());
}

#[test]
fn message_frames() {
    let frame = error_frame(&PLAIN_PALETTE, "Invalid Spotify URL", &["Supported formats:"]);
    assert_eq!(
        frame,
        "\n  Invalid Spotify URL\n\n  Supported formats:\n\n  Press Enter to go back"
    );
    assert_eq!(status_frame(&PLAIN_PALETTE, "Working..."), "\n  Working...");
    assert_eq!(success_frame(&PLAIN_PALETTE, "Saved"), "\n  ✓  Saved");
}
