//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Builder for FFmpeg commands over an ordered list of input streams.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file paths, in stream-index order
    inputs: Vec<PathBuf>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
    /// Pin the filter_complex evaluation to one worker thread
    single_filter_thread: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
            single_filter_thread: false,
        }
    }

    /// Append an input stream. Order is significant: the Nth call becomes
    /// stream `[N:v]` in filtergraph references.
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Append multiple input streams in order.
    pub fn inputs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.inputs
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    /// Add an output argument (after the inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a labelled stream to the output.
    pub fn map(self, label: impl AsRef<str>) -> Self {
        let label = label.as_ref();
        self.output_arg("-map").output_arg(format!("[{label}]"))
    }

    /// Constrain filter evaluation to a single worker.
    ///
    /// Required whenever the filtergraph carries expressions with persistent
    /// `st`/`ld` state: parallel frame evaluation would corrupt the shared
    /// slots and produce visibly wrong transitions.
    pub fn single_filter_thread(mut self) -> Self {
        self.single_filter_thread = true;
        self
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().to_string());
        }

        args.extend(self.output_args.clone());

        if self.single_filter_thread {
            args.push("-filter_complex_threads".to_string());
            args.push("1".to_string());
        }

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    ///
    /// Non-progress stderr output is collected and surfaced verbatim in the
    /// failure error when FFmpeg exits abnormally.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("stderr not captured", None, None)
        })?;
        let mut reader = BufReader::new(stderr).lines();

        // Parse progress records; keep everything else as diagnostics.
        let stderr_handle = tokio::spawn(async move {
            let mut current = FfmpegProgress::default();
            let mut diagnostics = String::new();

            while let Ok(Some(line)) = reader.next_line().await {
                match parse_progress_line(&line, &mut current) {
                    ProgressLine::Update(progress) => progress_callback(progress),
                    ProgressLine::Record => {}
                    ProgressLine::Other => {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            diagnostics.push_str(trimmed);
                            diagnostics.push('\n');
                        }
                    }
                }
            }

            diagnostics
        });

        let result = self.wait_for_completion(&mut child).await;
        let diagnostics = stderr_handle.await.unwrap_or_default();

        match result {
            Err(MediaError::FfmpegFailed {
                message, exit_code, ..
            }) => Err(MediaError::FfmpegFailed {
                message,
                stderr: (!diagnostics.is_empty()).then_some(diagnostics),
                exit_code,
            }),
            other => other,
        }
    }

    /// Wait for the child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<()> {
        let status = if let Some(timeout_secs) = self.timeout_secs {
            let timeout = tokio::time::timeout(
                std::time::Duration::from_secs(timeout_secs),
                self.wait_or_cancel(child),
            );
            match timeout.await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        "FFmpeg timed out after {} seconds, killing process",
                        timeout_secs
                    );
                    let _ = child.kill().await;
                    return Err(MediaError::Timeout(timeout_secs));
                }
            }
        } else {
            self.wait_or_cancel(child).await?
        };

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                None,
                status.code(),
            ))
        }
    }

    /// Wait for exit, killing the process if the cancel signal fires first.
    async fn wait_or_cancel(&self, child: &mut Child) -> MediaResult<std::process::ExitStatus> {
        let mut cancel_rx = self.cancel_rx.clone();
        let Some(rx) = cancel_rx.as_mut() else {
            return Ok(child.wait().await?);
        };

        let cancelled = async {
            // A dropped sender means cancellation can never fire.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let outcome = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancelled => None,
        };

        match outcome {
            Some(status) => Ok(status?),
            None => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }
}

/// Classification of one FFmpeg stderr line.
enum ProgressLine {
    /// End of a `-progress` record block: emit a snapshot
    Update(FfmpegProgress),
    /// A `-progress` key we either consumed or deliberately ignore
    Record,
    /// Anything else: engine diagnostics, kept verbatim
    Other,
}

/// Parse one stderr line against FFmpeg's `-progress` record keys.
///
/// Only lines whose key belongs to the `-progress` vocabulary are treated
/// as records; error text that happens to contain `=` (filter init
/// failures quote their args) must land in diagnostics instead.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> ProgressLine {
    let Some((key, value)) = line.trim().split_once('=') else {
        return ProgressLine::Other;
    };

    match key {
        "out_time_ms" | "out_time_us" => {
            // Both keys carry microseconds in modern FFmpeg builds.
            if let Ok(us) = value.parse::<i64>() {
                current.out_time_ms = us / 1000;
            }
        }
        "frame" => {
            if let Ok(frame) = value.parse() {
                current.frame = frame;
            }
        }
        "fps" => {
            if let Ok(fps) = value.parse() {
                current.fps = fps;
            }
        }
        "speed" => {
            // Format: "1.5x" or "N/A"
            if let Some(speed_str) = value.strip_suffix('x') {
                if let Ok(speed) = speed_str.parse() {
                    current.speed = speed;
                }
            }
        }
        "progress" => {
            // "continue" or "end"
            if value == "end" {
                current.is_complete = true;
            }
            return ProgressLine::Update(current.clone());
        }
        "out_time" | "bitrate" | "total_size" | "dup_frames" | "drop_frames" => {}
        key if key.starts_with("stream_") && key.ends_with("_q") => {}
        _ => return ProgressLine::Other,
    }

    ProgressLine::Record
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
