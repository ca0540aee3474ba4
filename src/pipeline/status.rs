use crate::resolver::MatchConfidence;
use crate::spotify::Track;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Queued,
    Searching,
    Downloading,
    Metadata,
    Done,
    Error,
}

impl TrackState {
    pub fn label(self) -> &'static str {
        match self {
            TrackState::Queued => "queued",
            TrackState::Searching => "searching",
            TrackState::Downloading => "downloading",
            TrackState::Metadata => "metadata",
            TrackState::Done => "done",
            TrackState::Error => "error",
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, TrackState::Done | TrackState::Error)
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Live view of one track during a run. Only the pipeline mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStatus {
    state: TrackState,
    percent: f64,
    pub message: String,
    pub file_path: Option<PathBuf>,
    pub file_size: Option<u64>,
    pub confidence: Option<MatchConfidence>,
}

impl TrackStatus {
    pub fn queued() -> Self {
        Self {
            state: TrackState::Queued,
            percent: 0.0,
            message: String::new(),
            file_path: None,
            file_size: None,
            confidence: None,
        }
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub(crate) fn enter(&mut self, state: TrackState, message: impl Into<String>) {
        self.state = state;
        self.message = message.into();
    }

    /// Raise the displayed percent. Values at or below the current one are dropped.
    pub(crate) fn advance(&mut self, percent: f64) -> bool {
        let percent = percent.clamp(0.0, 100.0);
        if percent > self.percent {
            self.percent = percent;
            true
        } else {
            false
        }
    }
}

impl Default for TrackStatus {
    fn default() -> Self {
        Self::queued()
    }
}

/// Final outcome for one track. One per input track, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub track: Track,
    pub success: bool,
    pub file_path: Option<PathBuf>,
    pub file_size: Option<u64>,
    pub error: Option<String>,
    /// How the source was matched, when one was found.
    pub confidence: Option<MatchConfidence>,
}

impl DownloadResult {
    pub(crate) fn failed(track: &Track, error: String, confidence: Option<MatchConfidence>) -> Self {
        Self {
            track: track.clone(),
            success: false,
            file_path: None,
            file_size: None,
            error: Some(error),
            confidence,
        }
    }

    pub(crate) fn succeeded(
        track: &Track,
        file_path: PathBuf,
        file_size: u64,
        confidence: MatchConfidence,
    ) -> Self {
        Self {
            track: track.clone(),
            success: true,
            file_path: Some(file_path),
            file_size: Some(file_size),
            error: None,
            confidence: Some(confidence),
        }
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Some(MatchConfidence::LowConfidence)
    }
}

/// Totals for the completion screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_bytes: u64,
    pub low_confidence: usize,
}

impl RunSummary {
    pub fn from_results(results: &[DownloadResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..RunSummary::default()
        };
        for result in results {
            if result.success {
                summary.succeeded += 1;
                summary.total_bytes += result.file_size.unwrap_or(0);
                if result.is_low_confidence() {
                    summary.low_confidence += 1;
                }
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}
