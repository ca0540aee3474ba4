//! Screen Flow Controller: first-run setup, authentication, then either the
//! link given on the command line or the main menu loop.

use crate::config::{AppConfig, ConfigStore, UserConfig};
use crate::pipeline::{DownloadPipeline, PipelineError, PipelineOptions};
use crate::resolver::{SourceResolver, YouTubeResolver};
use crate::screens::{
    auth_failed_frame, error_frame, invalid_url_frame, prompt_credentials, run_downloads,
    show_complete, show_preview, show_search, show_settings, show_track_list, show_url_input,
    show_welcome, status_frame, success_frame, CompletionAction, Credentials, MainAction,
    TrackCollection, Ui,
};
use crate::spotify::{parse_spotify_url, FetchError, MusicCatalog, ResourceKind, SpotifyClient, Track};
use crate::tagging::{Id3TagWriter, TagWriter};
use crate::transfer::{Transfer, YtDlpTransfer};
use crate::{log_debug, log_debug_content};
use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Builds a catalog client once credentials are known.
pub type CatalogFactory = Box<dyn FnMut(&Credentials) -> Box<dyn MusicCatalog>>;

/// External collaborators behind their traits.
pub struct Collaborators {
    pub connect: CatalogFactory,
    pub resolver: Box<dyn SourceResolver>,
    pub transfer: Box<dyn Transfer>,
    pub tagger: Box<dyn TagWriter>,
}

impl Collaborators {
    /// Spotify, YouTube search, yt-dlp and ID3 tagging.
    pub fn production(config: &AppConfig) -> Self {
        Self {
            connect: Box::new(|credentials: &Credentials| -> Box<dyn MusicCatalog> {
                Box::new(SpotifyClient::new(
                    credentials.client_id.clone(),
                    credentials.client_secret.clone(),
                ))
            }),
            resolver: Box::new(YouTubeResolver::new()),
            transfer: Box::new(
                YtDlpTransfer::new(config.ytdlp_cmd.clone()).with_ffmpeg(&config.ffmpeg_cmd),
            ),
            tagger: Box::new(Id3TagWriter::new()),
        }
    }
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit from the menu, or a command-line link handled to completion.
    Finished,
    /// `q` on the completion screen.
    Quit,
    SetupCancelled,
    AuthFailed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Finished | Outcome::Quit => 0,
            Outcome::SetupCancelled | Outcome::AuthFailed => 1,
        }
    }

    /// Line printed once the terminal has been released.
    pub fn farewell(self) -> Option<&'static str> {
        match self {
            Outcome::Finished => Some("Goodbye!"),
            Outcome::SetupCancelled => Some("Setup cancelled."),
            Outcome::Quit | Outcome::AuthFailed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Continue,
    Quit,
}

pub struct App<'a> {
    ui: Ui<'a>,
    store: ConfigStore,
    config: UserConfig,
    /// `--output-dir` for this run only; never written back.
    output_override: Option<PathBuf>,
    services: Collaborators,
}

impl<'a> App<'a> {
    pub fn new(
        ui: Ui<'a>,
        store: ConfigStore,
        config: UserConfig,
        output_override: Option<PathBuf>,
        services: Collaborators,
    ) -> Self {
        Self {
            ui,
            store,
            config,
            output_override,
            services,
        }
    }

    pub fn config(&self) -> &UserConfig {
        &self.config
    }

    pub fn run(&mut self, initial_url: Option<&str>) -> Result<Outcome> {
        if !self.config.has_credentials() && !self.first_run_setup()? {
            return Ok(Outcome::SetupCancelled);
        }

        let palette = self.ui.palette;
        self.ui.show(&status_frame(&palette, "Authenticating with Spotify..."))?;
        let credentials = Credentials {
            client_id: self.config.spotify_client_id.clone(),
            client_secret: self.config.spotify_client_secret.clone(),
        };
        let mut catalog = (self.services.connect)(&credentials);
        if let Err(err) = catalog.authenticate() {
            warn!("spotify authentication failed");
            log_debug(&format!("authentication failed: {err}"));
            self.ui.show(&auth_failed_frame(&palette, &err.to_string()))?;
            self.config.clear_credentials();
            if let Err(save_err) = self.store.save(&self.config) {
                log_debug(&format!("could not clear stored credentials: {save_err}"));
            }
            return Ok(Outcome::AuthFailed);
        }
        info!("spotify session established");

        if let Some(url) = initial_url {
            return Ok(match self.handle_url(catalog.as_mut(), url)? {
                Next::Continue => Outcome::Finished,
                Next::Quit => Outcome::Quit,
            });
        }

        loop {
            let next = match show_welcome(&mut self.ui)? {
                MainAction::Url => match show_url_input(&mut self.ui)? {
                    Some(url) => self.handle_url(catalog.as_mut(), &url)?,
                    None => Next::Continue,
                },
                MainAction::Search => match show_search(&mut self.ui, catalog.as_mut())? {
                    Some(track) => self.download(vec![track])?,
                    None => Next::Continue,
                },
                MainAction::Settings => {
                    show_settings(&mut self.ui, &self.store, &mut self.config)?;
                    Next::Continue
                }
                MainAction::Exit => return Ok(Outcome::Finished),
            };
            if next == Next::Quit {
                return Ok(Outcome::Quit);
            }
        }
    }

    /// `false` when the operator backs out of setup.
    fn first_run_setup(&mut self) -> Result<bool> {
        let Some(credentials) = prompt_credentials(&mut self.ui)? else {
            return Ok(false);
        };
        self.config.spotify_client_id = credentials.client_id;
        self.config.spotify_client_secret = credentials.client_secret;
        let palette = self.ui.palette;
        match self.store.save(&self.config) {
            Ok(()) => {
                let saved = format!("Credentials saved to {}", self.store.path().display());
                self.ui.notice(&success_frame(&palette, &saved))?;
            }
            Err(err) => {
                log_debug(&format!("could not save credentials: {err}"));
                let headline = format!("Could not save credentials: {err}");
                self.ui.acknowledge(&error_frame(&palette, &headline, &[
                    "They will be used for this session only.",
                ]))?;
            }
        }
        Ok(true)
    }

    fn handle_url(&mut self, catalog: &mut dyn MusicCatalog, url: &str) -> Result<Next> {
        let palette = self.ui.palette;
        let Some(link) = parse_spotify_url(url) else {
            log_debug_content(&format!("rejected link: {url}"));
            self.ui.acknowledge(&invalid_url_frame(&palette))?;
            return Ok(Next::Continue);
        };
        info!(kind = link.kind.as_str(), "fetching spotify resource");
        self.ui
            .show(&status_frame(&palette, &format!("Fetching {} info...", link.kind)))?;

        match link.kind {
            ResourceKind::Track => match catalog.track(&link.id) {
                Ok(track) => {
                    if show_preview(&mut self.ui, &track)? {
                        self.download(vec![track])
                    } else {
                        Ok(Next::Continue)
                    }
                }
                Err(err) => self.fetch_failed(err),
            },
            ResourceKind::Playlist => match catalog.playlist(&link.id) {
                Ok(playlist) => self.select_and_download(TrackCollection::Playlist(&playlist)),
                Err(err) => self.fetch_failed(err),
            },
            ResourceKind::Album => match catalog.album(&link.id) {
                Ok(album) => self.select_and_download(TrackCollection::Album(&album)),
                Err(err) => self.fetch_failed(err),
            },
        }
    }

    fn fetch_failed(&mut self, err: FetchError) -> Result<Next> {
        log_debug(&format!("fetch failed: {err}"));
        let palette = self.ui.palette;
        let headline = format!("Failed to fetch: {err}");
        self.ui
            .acknowledge(&error_frame(&palette, &headline, &["Check the URL and try again"]))?;
        Ok(Next::Continue)
    }

    fn select_and_download(&mut self, collection: TrackCollection<'_>) -> Result<Next> {
        match show_track_list(&mut self.ui, collection)? {
            Some(selected) if !selected.is_empty() => self.download(selected),
            _ => Ok(Next::Continue),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.output_override
            .clone()
            .unwrap_or_else(|| self.config.download_dir.clone())
    }

    fn download(&mut self, tracks: Vec<Track>) -> Result<Next> {
        let output_dir = self.output_dir();
        let options = PipelineOptions {
            output_dir: output_dir.clone(),
            audio_format: self.config.audio_format.clone(),
            audio_quality: self.config.audio_quality.clone(),
        };
        let started = Instant::now();
        let services = &mut self.services;
        let mut pipeline = DownloadPipeline::new(
            services.resolver.as_mut(),
            services.transfer.as_mut(),
            services.tagger.as_mut(),
            options,
        );
        let results = match run_downloads(&mut self.ui, &mut pipeline, &tracks) {
            Ok(results) => results,
            Err(err) => {
                let Some(pipeline_err) = err.downcast_ref::<PipelineError>() else {
                    return Err(err);
                };
                let palette = self.ui.palette;
                let headline = format!("Download failed: {pipeline_err}");
                self.ui.acknowledge(&error_frame(&palette, &headline, &[]))?;
                return Ok(Next::Continue);
            }
        };

        match show_complete(&mut self.ui, &results, &output_dir, started.elapsed())? {
            CompletionAction::Back => Ok(Next::Continue),
            CompletionAction::Quit => Ok(Next::Quit),
        }
    }
}
