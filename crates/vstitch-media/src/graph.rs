//! Filter-graph compilation.
//!
//! Turns an immutable [`TimelinePlan`] plus a [`TransitionSpec`] into the
//! filtergraph string handed to FFmpeg: an optional `setpts` speed-scale
//! stage per input, then a left-to-right chain of custom xfade stages ending
//! at the terminal `[vout]` sink.

use vstitch_models::{StreamRef, TimelinePlan, TransitionSpec};

use crate::expr::{compose_expr, escape_expr};

/// A compiled filter graph, consumed once by the render driver.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    /// Complete `-filter_complex` description
    pub filtergraph: String,
    /// Label of the terminal output stream
    pub output_label: String,
}

/// Compile the plan into a chained xfade filtergraph.
pub fn compile_filter_graph(plan: &TimelinePlan, spec: &TransitionSpec) -> FilterGraph {
    let expr = escape_expr(&compose_expr(spec.easing, spec.transition));

    let mut filters: Vec<String> = Vec::new();

    // Rescale presentation timestamps per clip when a speed multiplier is
    // set; every downstream reference then uses the rescaled streams.
    let input_labels: Vec<String> = if plan.needs_speed_scale() {
        let pts_factor = 1.0 / plan.speed;
        (0..plan.clips.len())
            .map(|i| {
                filters.push(format!("[{i}:v]setpts={pts_factor:.6}*PTS[s{i}]"));
                format!("s{i}")
            })
            .collect()
    } else {
        (0..plan.clips.len()).map(|i| format!("{i}:v")).collect()
    };

    for segment in &plan.segments {
        filters.push(format!(
            "[{left}][{right}]xfade=transition=custom:duration={duration}:offset={offset:.3}:expr='{expr}'[{label}]",
            left = stream_label(&segment.left, &input_labels, plan),
            right = stream_label(&segment.right, &input_labels, plan),
            duration = plan.transition_duration_secs,
            offset = segment.offset_secs,
            label = segment.output_label,
        ));
    }

    let output_label = plan
        .segments
        .last()
        .map(|s| s.output_label.clone())
        .unwrap_or_else(|| "vout".to_string());

    FilterGraph {
        filtergraph: filters.join(";"),
        output_label,
    }
}

/// Resolve a stream reference to its filtergraph label.
fn stream_label<'a>(
    stream: &StreamRef,
    input_labels: &'a [String],
    plan: &'a TimelinePlan,
) -> &'a str {
    match stream {
        StreamRef::Clip(i) => &input_labels[*i],
        StreamRef::Stage(j) => &plan.segments[*j].output_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstitch_models::{ClipSource, Easing, Transition};

    fn plan(durations: &[f64], transition_duration: f64, speed: f64) -> TimelinePlan {
        let clips = durations
            .iter()
            .enumerate()
            .map(|(i, d)| ClipSource::new(format!("clip-{i}.mp4"), *d, speed))
            .collect();
        TimelinePlan::plan(clips, transition_duration, speed).unwrap()
    }

    fn spec(easing: Easing, transition: Transition) -> TransitionSpec {
        TransitionSpec {
            transition,
            easing,
            duration_secs: 0.5,
        }
    }

    #[test]
    fn test_two_clip_graph() {
        let graph = compile_filter_graph(
            &plan(&[5.0, 5.0], 0.5, 1.0),
            &spec(Easing::CubicOut, Transition::Fade),
        );

        assert_eq!(
            graph.filtergraph,
            "[0:v][1:v]xfade=transition=custom:duration=0.5:offset=4.500\
             :expr='st(0,P^3);A*ld(0)+B*(1-ld(0))'[vout]"
        );
        assert_eq!(graph.output_label, "vout");
    }

    #[test]
    fn test_stage_count_and_single_terminal_sink() {
        for n in 2..=8 {
            let durations = vec![5.0; n];
            let graph = compile_filter_graph(
                &plan(&durations, 0.5, 1.0),
                &spec(Easing::Linear, Transition::Fade),
            );

            let stages = graph.filtergraph.matches("xfade=").count();
            assert_eq!(stages, n - 1, "N={n}");
            assert_eq!(graph.filtergraph.matches("[vout]").count(), 1, "N={n}");
        }
    }

    #[test]
    fn test_intermediate_stages_feed_the_chain() {
        let graph = compile_filter_graph(
            &plan(&[5.0, 5.0, 5.0], 0.5, 1.0),
            &spec(Easing::Linear, Transition::Fade),
        );

        // The expression itself contains ';', so check the chain by its
        // quoted stage boundaries rather than splitting on the separator.
        let fg = &graph.filtergraph;
        assert!(fg.starts_with("[0:v][1:v]xfade="));
        assert!(fg.contains("'[v1];[v1][2:v]xfade="));
        assert!(fg.ends_with("'[vout]"));
        assert!(fg.contains("offset=4.500"));
        assert!(fg.contains("offset=9.000"));
    }

    #[test]
    fn test_speed_scale_stages_prepended() {
        let graph = compile_filter_graph(
            &plan(&[10.0, 10.0], 1.0, 2.0),
            &spec(Easing::Linear, Transition::Fade),
        );

        assert!(graph.filtergraph.starts_with("[0:v]setpts=0.500000*PTS[s0]"));
        assert!(graph.filtergraph.contains("[1:v]setpts=0.500000*PTS[s1]"));
        // The xfade chain consumes the rescaled streams and the offsets use
        // the adjusted (5s) durations.
        assert!(graph.filtergraph.contains("[s0][s1]xfade="));
        assert!(graph.filtergraph.contains("offset=4.000"));
        assert!(!graph.filtergraph.contains("[0:v][1:v]xfade"));
    }

    #[test]
    fn test_unit_speed_has_no_setpts() {
        let graph = compile_filter_graph(
            &plan(&[5.0, 5.0], 0.5, 1.0),
            &spec(Easing::Linear, Transition::Fade),
        );
        assert!(!graph.filtergraph.contains("setpts"));
    }
}
