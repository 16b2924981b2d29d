#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for eased cross-fade stitching.
//!
//! This crate provides:
//! - FFprobe duration probing (concurrent across clips)
//! - Symbolic easing/transition expressions and their composition
//! - Filter-graph compilation (speed scaling + chained custom xfades)
//! - Type-safe multi-input FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation support via tokio

pub mod command;
pub mod error;
pub mod expr;
pub mod graph;
pub mod probe;
pub mod progress;
pub mod stitch;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use expr::{compose_expr, easing_expr, transition_expr};
pub use graph::{compile_filter_graph, FilterGraph};
pub use probe::{probe_durations, probe_video, VideoInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use stitch::{stitch_clips, StitchRequest};
