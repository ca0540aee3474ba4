//! Download Pipeline: one track at a time through
//! `queued → searching → downloading → metadata → done`, or `error`.
//!
//! A run always yields one [`DownloadResult`] per input track, in input
//! order. Only an unusable output directory aborts the whole run.

mod status;
#[cfg(test)]
mod tests;

pub use status::{DownloadResult, RunSummary, TrackState, TrackStatus};

use crate::log_debug;
use crate::render::format::track_file_stem;
use crate::resolver::SourceResolver;
use crate::spotify::Track;
use crate::tagging::TagWriter;
use crate::transfer::{Transfer, TransferRequest};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot create download directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where and how files are written for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub audio_format: String,
    pub audio_quality: String,
}

/// Snapshot handed to the observer after every status change.
#[derive(Debug, Clone, Copy)]
pub struct PipelineProgress<'a> {
    pub tracks: &'a [Track],
    pub statuses: &'a [TrackStatus],
    /// Index of the track currently being processed.
    pub active: usize,
}

impl PipelineProgress<'_> {
    pub fn finished(&self) -> usize {
        self.statuses
            .iter()
            .filter(|status| status.state().is_finished())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.statuses
            .iter()
            .filter(|status| status.state() == TrackState::Error)
            .count()
    }
}

/// Sequential driver over the resolve, transfer and tag collaborators.
pub struct DownloadPipeline<'a> {
    resolver: &'a mut dyn SourceResolver,
    transfer: &'a mut dyn Transfer,
    tagger: &'a mut dyn TagWriter,
    options: PipelineOptions,
}

impl<'a> DownloadPipeline<'a> {
    pub fn new(
        resolver: &'a mut dyn SourceResolver,
        transfer: &'a mut dyn Transfer,
        tagger: &'a mut dyn TagWriter,
        options: PipelineOptions,
    ) -> Self {
        Self {
            resolver,
            transfer,
            tagger,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process every track in order, calling `observe` after each status mutation.
    pub fn run(
        &mut self,
        tracks: &[Track],
        observe: &mut dyn FnMut(PipelineProgress<'_>),
    ) -> Result<Vec<DownloadResult>, PipelineError> {
        ensure_output_dir(&self.options.output_dir)?;
        info!(tracks = tracks.len(), "download run started");
        log_debug(&format!("download run started for {} tracks", tracks.len()));

        let mut statuses = vec![TrackStatus::queued(); tracks.len()];
        let mut results = Vec::with_capacity(tracks.len());
        for index in 0..tracks.len() {
            results.push(self.process_track(index, tracks, &mut statuses, observe));
        }

        let summary = RunSummary::from_results(&results);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "download run finished"
        );
        Ok(results)
    }

    fn process_track(
        &mut self,
        index: usize,
        tracks: &[Track],
        statuses: &mut [TrackStatus],
        observe: &mut dyn FnMut(PipelineProgress<'_>),
    ) -> DownloadResult {
        let track = &tracks[index];

        statuses[index].enter(TrackState::Searching, "Searching...");
        debug!(index, state = "searching", "track state changed");
        notify(observe, tracks, statuses, index);

        let source = match self
            .resolver
            .resolve(&track.title, &track.artist, track.duration_ms)
        {
            Ok(source) => source,
            Err(err) => {
                let message = err.to_string();
                statuses[index].enter(TrackState::Error, message.clone());
                debug!(index, state = "error", stage = "search", "track state changed");
                notify(observe, tracks, statuses, index);
                return DownloadResult::failed(track, message, None);
            }
        };
        statuses[index].confidence = Some(source.confidence);

        statuses[index].enter(TrackState::Downloading, "Starting download...");
        debug!(
            index,
            state = "downloading",
            confidence = source.confidence.label(),
            "track state changed"
        );
        notify(observe, tracks, statuses, index);

        let request = TransferRequest {
            source_url: source.url.clone(),
            output_dir: self.options.output_dir.clone(),
            file_stem: track_file_stem(&track.title, &track.artist),
            audio_format: self.options.audio_format.clone(),
            audio_quality: self.options.audio_quality.clone(),
        };
        let transferred = {
            let mut on_progress = |percent: f64, message: &str| {
                let status = &mut statuses[index];
                let raised = status.advance(percent);
                let relabeled = status.message != message;
                if relabeled {
                    status.message = message.to_string();
                }
                if raised || relabeled {
                    notify(observe, tracks, statuses, index);
                }
            };
            self.transfer.transfer(&request, &mut on_progress)
        };
        let file_path = match transferred {
            Ok(path) => path,
            Err(err) => {
                let message = err.to_string();
                statuses[index].enter(TrackState::Error, message.clone());
                debug!(index, state = "error", stage = "download", "track state changed");
                notify(observe, tracks, statuses, index);
                return DownloadResult::failed(track, message, Some(source.confidence));
            }
        };

        statuses[index].enter(TrackState::Metadata, "Writing tags...");
        debug!(index, state = "metadata", "track state changed");
        notify(observe, tracks, statuses, index);
        // Tagging is best-effort: a failure leaves the download successful.
        let _ = self.tagger.write(&file_path, track);

        let file_size = fs::metadata(&file_path).map(|meta| meta.len()).unwrap_or(0);
        let status = &mut statuses[index];
        status.advance(100.0);
        status.enter(TrackState::Done, "Done");
        status.file_path = Some(file_path.clone());
        status.file_size = Some(file_size);
        debug!(index, state = "done", bytes = file_size, "track state changed");
        notify(observe, tracks, statuses, index);
        DownloadResult::succeeded(track, file_path, file_size, source.confidence)
    }
}

fn notify(
    observe: &mut dyn FnMut(PipelineProgress<'_>),
    tracks: &[Track],
    statuses: &[TrackStatus],
    active: usize,
) {
    observe(PipelineProgress {
        tracks,
        statuses,
        active,
    });
}

fn ensure_output_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path).map_err(|source| PipelineError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}
