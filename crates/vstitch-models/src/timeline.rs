//! Transition timeline planning.
//!
//! Pure offset arithmetic over immutable clip records. No I/O happens here;
//! durations arrive from the prober (or a fixed override) and the resulting
//! plan is consumed once by the filter-graph compiler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::{Easing, Transition};

/// Default cross-fade duration in seconds.
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.5;

/// The transition applied uniformly at every clip boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Pixel-blend formula
    pub transition: Transition,
    /// Progress remapping curve
    pub easing: Easing,
    /// Overlap window in seconds
    pub duration_secs: f64,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            transition: Transition::default(),
            easing: Easing::default(),
            duration_secs: DEFAULT_TRANSITION_DURATION,
        }
    }
}

/// A single input clip with its probed (or overridden) duration.
///
/// Immutable once constructed; `adjusted_duration_secs` already accounts for
/// the global playback-speed multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSource {
    /// Path to the clip file
    pub path: PathBuf,
    /// Playable length as probed or overridden, in seconds
    pub raw_duration_secs: f64,
    /// `raw_duration_secs / speed`
    pub adjusted_duration_secs: f64,
}

impl ClipSource {
    /// Create a clip record, applying the speed multiplier up front.
    pub fn new(path: impl Into<PathBuf>, raw_duration_secs: f64, speed: f64) -> Self {
        Self {
            path: path.into(),
            raw_duration_secs,
            adjusted_duration_secs: raw_duration_secs / speed,
        }
    }
}

/// Reference to a stream consumed or produced by a transition stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRef {
    /// The Nth input clip (0-based, playback order)
    Clip(usize),
    /// The output of the Nth transition stage
    Stage(usize),
}

/// One cross-fade boundary between the running composite and the next clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSegment {
    /// Left input: the first clip or the previous stage's composite
    pub left: StreamRef,
    /// Right input: always the joining clip
    pub right: StreamRef,
    /// Start of the overlap window on the output timeline, in seconds
    pub offset_secs: f64,
    /// Unique stage label; the last stage is the terminal `vout`
    pub output_label: String,
}

/// The complete, immutable plan for one render request.
///
/// `N` clips always yield exactly `N-1` segments with strictly increasing
/// offsets. Every intermediate stage output feeds exactly the next stage;
/// the final stage is the unique terminal sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelinePlan {
    /// Clips in playback order (insertion order is meaningful)
    pub clips: Vec<ClipSource>,
    /// One segment per boundary between consecutive clips
    pub segments: Vec<TransitionSegment>,
    /// Overlap window applied at every boundary, in seconds
    pub transition_duration_secs: f64,
    /// Global playback-speed multiplier (1.0 = unchanged)
    pub speed: f64,
    /// Total output duration in seconds
    pub total_duration_secs: f64,
}

impl TimelinePlan {
    /// Plan the transition timeline for an ordered clip sequence.
    ///
    /// Walks the clips left to right keeping the accumulated output length;
    /// each boundary starts its overlap `transition_duration_secs` before the
    /// running composite ends.
    pub fn plan(
        clips: Vec<ClipSource>,
        transition_duration_secs: f64,
        speed: f64,
    ) -> Result<Self, PlanError> {
        if clips.len() < 2 {
            return Err(PlanError::TooFewClips(clips.len()));
        }
        if !transition_duration_secs.is_finite() || transition_duration_secs <= 0.0 {
            return Err(PlanError::InvalidTransitionDuration(transition_duration_secs));
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlanError::InvalidSpeed(speed));
        }

        let shortest_secs = clips
            .iter()
            .map(|c| c.adjusted_duration_secs)
            .fold(f64::INFINITY, f64::min);
        // The overlap must fit strictly inside the shortest clip.
        if transition_duration_secs >= shortest_secs {
            return Err(PlanError::InfeasibleTransition {
                transition_secs: transition_duration_secs,
                shortest_secs,
            });
        }

        let last = clips.len() - 1;
        let mut segments = Vec::with_capacity(last);
        let mut accumulated = clips[0].adjusted_duration_secs;

        for (i, clip) in clips.iter().enumerate().skip(1) {
            let offset_secs = accumulated - transition_duration_secs;
            let left = if i == 1 {
                StreamRef::Clip(0)
            } else {
                StreamRef::Stage(i - 2)
            };
            let output_label = if i == last {
                "vout".to_string()
            } else {
                format!("v{i}")
            };
            segments.push(TransitionSegment {
                left,
                right: StreamRef::Clip(i),
                offset_secs,
                output_label,
            });
            accumulated += clip.adjusted_duration_secs - transition_duration_secs;
        }

        Ok(Self {
            clips,
            segments,
            transition_duration_secs,
            speed,
            total_duration_secs: accumulated,
        })
    }

    /// Total output duration in whole milliseconds, for progress reporting.
    pub fn total_duration_ms(&self) -> i64 {
        (self.total_duration_secs * 1000.0).round() as i64
    }

    /// Whether the plan needs per-clip presentation-timestamp rescaling.
    pub fn needs_speed_scale(&self) -> bool {
        self.speed != 1.0
    }
}

/// Errors detected while validating or planning a stitch request.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Need at least 2 clips to stitch, got {0}")]
    TooFewClips(usize),

    #[error("Transition duration must be a positive number, got {0}")]
    InvalidTransitionDuration(f64),

    #[error("Speed multiplier must be a positive number, got {0}")]
    InvalidSpeed(f64),

    #[error("Clip duration override must be a positive number, got {0}")]
    InvalidDurationOverride(f64),

    #[error(
        "Transition duration ({transition_secs}s) must be shorter than the shortest clip ({shortest_secs:.2}s)"
    )]
    InfeasibleTransition {
        transition_secs: f64,
        shortest_secs: f64,
    },
}
