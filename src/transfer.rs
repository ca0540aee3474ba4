//! Runs the external downloader/transcoder and turns its output into progress updates.

use crate::input::{clear_active_child, set_active_child};
use crate::log_debug;
use regex::Regex;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use thiserror::Error;

pub const DOWNLOADING_MESSAGE: &str = "Downloading...";
pub const CONVERTING_MESSAGE: &str = "Converting...";
pub const DONE_MESSAGE: &str = "Done";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("yt-dlp exited with code {}: {}", exit_code_label(.code), .stderr.trim())]
    Exit { code: Option<i32>, stderr: String },
    #[error("Failed to read downloader output: {0}")]
    Io(#[from] io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|code| code.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Everything the downloader needs for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_url: String,
    pub output_dir: PathBuf,
    /// File name without extension.
    pub file_stem: String,
    pub audio_format: String,
    pub audio_quality: String,
}

impl TransferRequest {
    /// `dir/stem.%(ext)s`, expanded by the downloader.
    pub fn output_template(&self) -> PathBuf {
        self.output_dir.join(format!("{}.%(ext)s", self.file_stem))
    }

    pub fn expected_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.file_stem, self.audio_format))
    }
}

/// Fetch + transcode one source into a local audio file, reporting `(percent, message)`.
pub trait Transfer {
    fn transfer(
        &mut self,
        request: &TransferRequest,
        on_progress: &mut dyn FnMut(f64, &str),
    ) -> Result<PathBuf, TransferError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: f64,
    pub message: &'static str,
}

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[download\]\s+([\d.]+)%").expect("progress pattern should compile")
    })
}

/// Line parser for `--newline --progress` output. Percent only ever rises.
#[derive(Debug, Default)]
pub struct ProgressParser {
    last_percent: f64,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_percent(&self) -> f64 {
        self.last_percent
    }

    pub fn feed(&mut self, line: &str) -> Option<ProgressUpdate> {
        if let Some(percent) = progress_pattern()
            .captures(line)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<f64>().ok())
        {
            if percent > self.last_percent {
                self.last_percent = percent;
                return Some(ProgressUpdate {
                    percent,
                    message: DOWNLOADING_MESSAGE,
                });
            }
            return None;
        }
        if line.contains("[ExtractAudio]") || line.contains("Post-process") {
            return Some(ProgressUpdate {
                percent: self.last_percent,
                message: CONVERTING_MESSAGE,
            });
        }
        None
    }
}

/// `yt-dlp` (or a compatible binary) as the transfer backend.
#[derive(Debug, Clone)]
pub struct YtDlpTransfer {
    program: String,
    ffmpeg_location: Option<String>,
}

impl YtDlpTransfer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ffmpeg_location: None,
        }
    }

    /// Point the downloader at a specific ffmpeg binary.
    pub fn with_ffmpeg(mut self, ffmpeg_cmd: &str) -> Self {
        if Path::new(ffmpeg_cmd).is_absolute() {
            self.ffmpeg_location = Some(ffmpeg_cmd.to_string());
        }
        self
    }

    pub fn build_args(&self, request: &TransferRequest) -> Vec<String> {
        let quality = match request.audio_quality.as_str() {
            "best" | "" => "0",
            other => other,
        };
        let mut args = vec![
            request.source_url.clone(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            request.audio_format.clone(),
            "--audio-quality".to_string(),
            quality.to_string(),
            "--output".to_string(),
            request.output_template().to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--progress".to_string(),
            "--newline".to_string(),
            "--no-check-certificates".to_string(),
        ];
        if let Some(location) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(location.clone());
        }
        args
    }
}

impl Transfer for YtDlpTransfer {
    fn transfer(
        &mut self,
        request: &TransferRequest,
        on_progress: &mut dyn FnMut(f64, &str),
    ) -> Result<PathBuf, TransferError> {
        let mut child = Command::new(&self.program)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransferError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        set_active_child(child.id());
        log_debug(&format!("downloader started (pid {})", child.id()));

        // Drain stderr on its own thread so a chatty child never blocks on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut collected = String::new();
                let _ = stderr.read_to_string(&mut collected);
                collected
            })
        });

        let mut parser = ProgressParser::new();
        let read_result = match child.stdout.take() {
            Some(stdout) => read_progress(stdout, &mut parser, on_progress),
            None => Ok(()),
        };

        let status = child.wait();
        clear_active_child();
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        let status = status?;
        read_result?;

        if !status.success() {
            log_debug(&format!("downloader exited with {:?}", status.code()));
            return Err(TransferError::Exit {
                code: status.code(),
                stderr,
            });
        }
        on_progress(100.0, DONE_MESSAGE);
        Ok(request.expected_path())
    }
}

fn read_progress(
    stdout: impl Read,
    parser: &mut ProgressParser,
    on_progress: &mut dyn FnMut(f64, &str),
) -> io::Result<()> {
    let reader = BufReader::new(stdout);
    for line in reader.split(b'\n') {
        let line = line?;
        let text = String::from_utf8_lossy(&line);
        if let Some(update) = parser.feed(text.trim_end_matches('\r')) {
            on_progress(update.percent, update.message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dir: &Path) -> TransferRequest {
        TransferRequest {
            source_url: "https://www.youtube.com/watch?v=aaaaaaaaaaa".into(),
            output_dir: dir.to_path_buf(),
            file_stem: "B — Y".into(),
            audio_format: "mp3".into(),
            audio_quality: "best".into(),
        }
    }

    /// Spawning tests share the process-wide active-child slot.
    #[cfg(unix)]
    fn child_slot() -> std::sync::MutexGuard<'static, ()> {
        crate::input::CHILD_SLOT_TEST_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn parser_only_reports_rising_percent() {
        let mut parser = ProgressParser::new();
        let lines = [
            "[youtube] aaaaaaaaaaa: Downloading webpage",
            "[download]   1.5% of    4.81MiB at  1.23MiB/s ETA 00:03",
            "[download]   1.5% of    4.81MiB at  1.23MiB/s ETA 00:03",
            "[download]   0.9% of    4.81MiB",
            "[download]  45.2% of    4.81MiB",
            "[download] 100.0% of    4.81MiB in 00:00:02",
        ];
        let seen: Vec<f64> = lines
            .iter()
            .filter_map(|line| parser.feed(line))
            .map(|update| update.percent)
            .collect();
        assert_eq!(seen, vec![1.5, 45.2, 100.0]);
    }

    #[test]
    fn post_processing_reports_converting_at_last_percent() {
        let mut parser = ProgressParser::new();
        parser.feed("[download]  80.0% of 3MiB");
        let update = parser
            .feed("[ExtractAudio] Destination: /tmp/x.mp3")
            .unwrap();
        assert_eq!(update.percent, 80.0);
        assert_eq!(update.message, CONVERTING_MESSAGE);
    }

    #[test]
    fn args_carry_format_quality_and_template() {
        let dir = Path::new("/music");
        let args = YtDlpTransfer::new("yt-dlp").build_args(&request(dir));
        assert_eq!(args[0], "https://www.youtube.com/watch?v=aaaaaaaaaaa");
        let quality = args.iter().position(|arg| arg == "--audio-quality").unwrap();
        assert_eq!(args[quality + 1], "0");
        let output = args.iter().position(|arg| arg == "--output").unwrap();
        assert_eq!(args[output + 1], "/music/B — Y.%(ext)s");
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--ffmpeg-location".to_string()));
    }

    #[test]
    fn explicit_ffmpeg_path_is_forwarded() {
        let transfer = YtDlpTransfer::new("yt-dlp").with_ffmpeg("/opt/ffmpeg/bin/ffmpeg");
        let args = transfer.build_args(&request(Path::new("/music")));
        assert_eq!(args[args.len() - 2], "--ffmpeg-location");
        assert_eq!(args[args.len() - 1], "/opt/ffmpeg/bin/ffmpeg");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut transfer = YtDlpTransfer::new("ssdl-test-no-such-downloader");
        let err = transfer
            .transfer(&request(dir.path()), &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, TransferError::Spawn { .. }));
        assert!(err.to_string().starts_with("Failed to spawn"));
    }

    #[test]
    fn exit_error_text_includes_code_and_stderr() {
        let err = TransferError::Exit {
            code: Some(1),
            stderr: "ERROR: Video unavailable\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "yt-dlp exited with code 1: ERROR: Video unavailable"
        );
    }

    #[cfg(unix)]
    fn fake_downloader(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("fake-yt-dlp");
        std::fs::write(&script, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn fake_downloader_progress_and_output() {
        let _guard = child_slot();
        let bin_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let script = fake_downloader(
            bin_dir.path(),
            r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
echo "[download]  10.0% of 4MiB"
echo "[download]   5.0% of 4MiB"
echo "[download]  55.5% of 4MiB"
echo "[ExtractAudio] Destination: somewhere"
target=$(printf '%s' "$out" | sed 's/%(ext)s/mp3/')
printf 'ID3' > "$target"
exit 0
"#,
        );
        let mut transfer = YtDlpTransfer::new(script.to_string_lossy());
        let mut updates = Vec::new();
        let path = transfer
            .transfer(&request(out_dir.path()), &mut |percent, message| {
                updates.push((percent, message.to_string()))
            })
            .unwrap();
        assert_eq!(path, out_dir.path().join("B — Y.mp3"));
        assert!(path.exists());
        assert_eq!(
            updates,
            vec![
                (10.0, DOWNLOADING_MESSAGE.to_string()),
                (55.5, DOWNLOADING_MESSAGE.to_string()),
                (55.5, CONVERTING_MESSAGE.to_string()),
                (100.0, DONE_MESSAGE.to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn fake_downloader_failure_is_exit_error() {
        let _guard = child_slot();
        let bin_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let script = fake_downloader(bin_dir.path(), "echo 'ERROR: blocked' >&2\nexit 3\n");
        let mut transfer = YtDlpTransfer::new(script.to_string_lossy());
        let err = transfer
            .transfer(&request(out_dir.path()), &mut |_, _| {})
            .unwrap_err();
        match err {
            TransferError::Exit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "ERROR: blocked");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// A stand-in downloader run through `sh`: records its pid, prints one
    /// progress line, then exits with `code`.
    #[cfg(unix)]
    fn scripted_downloader(dir: &Path, code: i32) -> (YtDlpTransfer, TransferRequest, PathBuf) {
        let pid_file = dir.join("downloader.pid");
        let script = dir.join("downloader.sh");
        std::fs::write(
            &script,
            format!(
                "echo $$ > '{}'\necho '[download]  50.0% of 1.00MiB'\nexit {code}\n",
                pid_file.display()
            ),
        )
        .unwrap();
        let mut request = request(dir);
        request.source_url = script.display().to_string();
        (YtDlpTransfer::new("sh"), request, pid_file)
    }

    #[cfg(unix)]
    fn recorded_pid(pid_file: &Path) -> u32 {
        std::fs::read_to_string(pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn child_is_registered_while_running_and_cleared_after_success() {
        let _guard = child_slot();
        let dir = tempfile::tempdir().unwrap();
        let (mut transfer, request, pid_file) = scripted_downloader(dir.path(), 0);

        let mut seen = Vec::new();
        let path = transfer
            .transfer(&request, &mut |percent, _| {
                seen.push((percent, crate::input::active_child()))
            })
            .unwrap();

        let pid = recorded_pid(&pid_file);
        assert_eq!(path, request.expected_path());
        assert_eq!(seen, vec![(50.0, Some(pid)), (100.0, None)]);
        assert_eq!(crate::input::active_child(), None);
    }

    #[cfg(unix)]
    #[test]
    fn child_is_cleared_after_a_failed_download() {
        let _guard = child_slot();
        let dir = tempfile::tempdir().unwrap();
        let (mut transfer, request, pid_file) = scripted_downloader(dir.path(), 3);

        let mut seen = Vec::new();
        let err = transfer
            .transfer(&request, &mut |_, _| seen.push(crate::input::active_child()))
            .unwrap_err();

        assert!(matches!(err, TransferError::Exit { code: Some(3), .. }));
        assert_eq!(seen, vec![Some(recorded_pid(&pid_file))]);
        assert_eq!(crate::input::active_child(), None);
    }
}
