//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;
use vstitch_models::PlanError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing, planning, or rendering.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe failed for {path}: {message}")]
    FfprobeFailed {
        path: PathBuf,
        message: String,
        stderr: Option<String>,
    },

    #[error("Input clip not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file {path}: {message}")]
    InvalidVideo { path: PathBuf, message: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid-video error for a clip.
    pub fn invalid_video(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidVideo {
            path: path.into(),
            message: message.into(),
        }
    }
}
