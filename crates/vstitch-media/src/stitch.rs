//! End-to-end stitch orchestration.
//!
//! Validation happens before any I/O, probing runs concurrently across all
//! clips, planning and graph compilation are pure, and rendering is a single
//! FFmpeg invocation with the filter stage pinned to one worker.

use std::path::PathBuf;
use tracing::info;

use vstitch_models::{ClipSource, EncodingConfig, PlanError, TimelinePlan, TransitionSpec};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::graph::{compile_filter_graph, FilterGraph};
use crate::probe::probe_durations;
use crate::progress::FfmpegProgress;

/// One stitch render request.
#[derive(Debug, Clone)]
pub struct StitchRequest {
    /// Input clips in playback order
    pub clips: Vec<PathBuf>,
    /// Output file path
    pub output: PathBuf,
    /// Transition applied at every boundary
    pub spec: TransitionSpec,
    /// Playback-speed multiplier (1.0 = unchanged)
    pub speed: f64,
    /// Fixed per-clip duration; skips probing entirely when set
    pub duration_override: Option<f64>,
    /// Output encoding settings
    pub encoding: EncodingConfig,
}

impl StitchRequest {
    /// Create a request with default speed and encoding.
    pub fn new(clips: Vec<PathBuf>, output: impl Into<PathBuf>, spec: TransitionSpec) -> Self {
        Self {
            clips,
            output: output.into(),
            spec,
            speed: 1.0,
            duration_override: None,
            encoding: EncodingConfig::default(),
        }
    }

    /// Reject invalid scalar inputs before any file is touched.
    fn validate(&self) -> Result<(), PlanError> {
        if self.clips.len() < 2 {
            return Err(PlanError::TooFewClips(self.clips.len()));
        }
        if !self.spec.duration_secs.is_finite() || self.spec.duration_secs <= 0.0 {
            return Err(PlanError::InvalidTransitionDuration(self.spec.duration_secs));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(PlanError::InvalidSpeed(self.speed));
        }
        if let Some(d) = self.duration_override {
            if !d.is_finite() || d <= 0.0 {
                return Err(PlanError::InvalidDurationOverride(d));
            }
        }
        Ok(())
    }
}

/// Plan the timeline and compile the filter graph for known durations.
fn plan_graph(
    request: &StitchRequest,
    durations: &[f64],
) -> MediaResult<(TimelinePlan, FilterGraph)> {
    let clips: Vec<ClipSource> = request
        .clips
        .iter()
        .zip(durations)
        .map(|(path, d)| ClipSource::new(path, *d, request.speed))
        .collect();

    let plan = TimelinePlan::plan(clips, request.spec.duration_secs, request.speed)?;
    let graph = compile_filter_graph(&plan, &request.spec);
    Ok((plan, graph))
}

/// Stitch the request's clips into one output with eased cross-fades.
///
/// Returns the output path on success. Progress callbacks receive FFmpeg's
/// streamed progress records together with the planned total duration in
/// milliseconds.
pub async fn stitch_clips<F>(
    request: &StitchRequest,
    runner: &FfmpegRunner,
    on_progress: F,
) -> MediaResult<PathBuf>
where
    F: Fn(FfmpegProgress, i64) + Send + 'static,
{
    request.validate()?;

    for clip in &request.clips {
        if !clip.exists() {
            return Err(MediaError::FileNotFound(clip.clone()));
        }
    }

    info!(
        "Stitching {} clips -> {} (transition={}, easing={}, duration={}s)",
        request.clips.len(),
        request.output.display(),
        request.spec.transition,
        request.spec.easing,
        request.spec.duration_secs,
    );

    let durations = match request.duration_override {
        Some(d) => {
            info!("Using fixed clip duration: {d}s");
            vec![d; request.clips.len()]
        }
        None => probe_durations(&request.clips).await?,
    };

    let (plan, graph) = plan_graph(request, &durations)?;
    info!(
        "Planned {} transitions, total output {:.2}s",
        plan.segments.len(),
        plan.total_duration_secs
    );

    let cmd = FfmpegCommand::new(&request.output)
        .inputs(&request.clips)
        .filter_complex(graph.filtergraph)
        .map(&graph.output_label)
        .single_filter_thread()
        .video_codec(&request.encoding.codec)
        .crf(request.encoding.crf)
        .preset(&request.encoding.preset)
        .output_args(request.encoding.extra_args.clone());

    let total_ms = plan.total_duration_ms();
    runner
        .run_with_progress(&cmd, move |progress| on_progress(progress, total_ms))
        .await?;

    info!("Saved: {}", request.output.display());
    Ok(request.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstitch_models::{Easing, Transition};

    fn request(clips: &[&str], transition_duration: f64) -> StitchRequest {
        StitchRequest {
            clips: clips.iter().map(PathBuf::from).collect(),
            output: PathBuf::from("out.mp4"),
            spec: TransitionSpec {
                transition: Transition::Fade,
                easing: Easing::CubicOut,
                duration_secs: transition_duration,
            },
            speed: 1.0,
            duration_override: None,
            encoding: EncodingConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected_before_any_io() {
        let runner = FfmpegRunner::new();

        // Paths do not exist; a validation error proves nothing was probed.
        let err = stitch_clips(&request(&["/missing/a.mp4"], 0.5), &runner, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Plan(PlanError::TooFewClips(1))));

        let err = stitch_clips(
            &request(&["/missing/a.mp4", "/missing/b.mp4"], 0.0),
            &runner,
            |_, _| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            MediaError::Plan(PlanError::InvalidTransitionDuration(_))
        ));

        let mut req = request(&["/missing/a.mp4", "/missing/b.mp4"], 0.5);
        req.duration_override = Some(-2.0);
        let err = stitch_clips(&req, &runner, |_, _| {}).await.unwrap_err();
        assert!(matches!(
            err,
            MediaError::Plan(PlanError::InvalidDurationOverride(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_clip_reported_by_path() {
        let runner = FfmpegRunner::new();
        let err = stitch_clips(
            &request(&["/missing/a.mp4", "/missing/b.mp4"], 0.5),
            &runner,
            |_, _| {},
        )
        .await
        .unwrap_err();

        match err {
            MediaError::FileNotFound(path) => {
                assert_eq!(path, PathBuf::from("/missing/a.mp4"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_graph_threads_durations_through() {
        let req = request(&["a.mp4", "b.mp4", "c.mp4"], 0.5);
        let (plan, graph) = plan_graph(&req, &[5.0, 5.0, 5.0]).unwrap();

        assert_eq!(plan.segments.len(), 2);
        assert!((plan.total_duration_secs - 14.0).abs() < 1e-9);
        assert_eq!(graph.output_label, "vout");
        assert!(graph.filtergraph.contains("offset=4.500"));
        assert!(graph.filtergraph.contains("offset=9.000"));
    }

    #[test]
    fn test_plan_graph_infeasible_transition() {
        let req = request(&["a.mp4", "b.mp4"], 3.0);
        let err = plan_graph(&req, &[3.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            MediaError::Plan(PlanError::InfeasibleTransition { .. })
        ));
    }
}
