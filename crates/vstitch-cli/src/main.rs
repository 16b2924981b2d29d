//! Stitch video clips with eased cross-fade transitions.
//!
//! Prints the output path on stdout on success; all logging and progress
//! goes to stderr so the tool composes in pipelines.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vstitch_media::{stitch_clips, FfmpegRunner, MediaError, StitchRequest};
use vstitch_models::{
    Easing, EncodingConfig, Transition, TransitionSpec, DEFAULT_TRANSITION_DURATION,
};

#[derive(Parser, Debug)]
#[command(
    name = "vstitch",
    version,
    about = "Stitch video clips with smooth eased transitions using FFmpeg",
    after_help = catalog_help()
)]
struct Cli {
    /// Input video files, in playback order (at least 2).
    #[arg(short, long, required = true, num_args = 1..)]
    clips: Vec<PathBuf>,

    /// Output video file path.
    #[arg(short, long)]
    output: PathBuf,

    /// Transition formula.
    #[arg(short, long, default_value_t = Transition::Fade)]
    transition: Transition,

    /// Easing curve.
    #[arg(short, long, default_value_t = Easing::CubicOut)]
    easing: Easing,

    /// Transition duration in seconds.
    #[arg(short = 'd', long, default_value_t = DEFAULT_TRANSITION_DURATION)]
    transition_duration: f64,

    /// Fixed clip duration in seconds (skips probing when set).
    #[arg(long)]
    clip_duration: Option<f64>,

    /// Playback speed multiplier (1.5 = 50% faster).
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Video codec for the output.
    #[arg(long, default_value = "libx264")]
    codec: String,

    /// Constant Rate Factor (0-51, lower is better quality).
    #[arg(long, default_value_t = 18)]
    crf: u8,

    /// Encoding preset.
    #[arg(long, default_value = "fast")]
    preset: String,

    /// Abort the render after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Map argument errors to exit code 1, like every other validation failure.
/// Help and version requests are not failures and keep exit code 0.
fn exit_for_parse_error(err: clap::Error) -> ExitCode {
    let code = if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };
    let _ = err.print();
    code
}

fn catalog_help() -> String {
    let easings: Vec<&str> = Easing::ALL.iter().map(|e| e.as_str()).collect();
    let transitions: Vec<&str> = Transition::ALL.iter().map(|t| t.as_str()).collect();
    format!(
        "Transitions: {}\nEasings: {}",
        transitions.join(", "),
        easings.join(", ")
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout is reserved for the output path.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vstitch=info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return exit_for_parse_error(err),
    };

    match run(cli).await {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            if let MediaError::FfmpegFailed {
                stderr: Some(diagnostics),
                ..
            } = &err
            {
                eprintln!("{diagnostics}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<PathBuf, MediaError> {
    let request = StitchRequest {
        clips: cli.clips,
        output: cli.output,
        spec: TransitionSpec {
            transition: cli.transition,
            easing: cli.easing,
            duration_secs: cli.transition_duration,
        },
        speed: cli.speed,
        duration_override: cli.clip_duration,
        encoding: EncodingConfig {
            codec: cli.codec,
            preset: cli.preset,
            crf: cli.crf,
            extra_args: Vec::new(),
        },
    };

    // Ctrl-C kills the render subprocess; no partial output is promised.
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let mut runner = FfmpegRunner::new().with_cancel(cancel_rx);
    if let Some(secs) = cli.timeout_secs {
        runner = runner.with_timeout(secs);
    }

    let last_reported = std::sync::atomic::AtomicI64::new(-1);
    stitch_clips(&request, &runner, move |progress, total_ms| {
        // One log line per whole percent keeps long renders readable.
        let percent = progress.percentage(total_ms);
        let whole = percent.floor() as i64;
        if whole > last_reported.swap(whole, std::sync::atomic::Ordering::Relaxed)
            || progress.is_complete
        {
            match progress.eta_seconds(total_ms) {
                Some(eta) => info!("Progress: {percent:.1}% (ETA {eta:.0}s)"),
                None => info!("Progress: {percent:.1}%"),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(extra: &'a [&'a str]) -> Vec<&'a str> {
        let mut args = vec![
            "vstitch", "--clips", "a.mp4", "b.mp4", "--output", "out.mp4",
        ];
        args.extend_from_slice(extra);
        args
    }

    #[test]
    fn test_valid_args_parse() {
        let cli = Cli::try_parse_from(args(&[
            "--transition",
            "fadeblack",
            "--easing",
            "sinusoidal-in-out",
        ]))
        .unwrap();
        assert_eq!(cli.transition, Transition::FadeBlack);
        assert_eq!(cli.easing, Easing::SinusoidalInOut);
        assert_eq!(cli.clips.len(), 2);
    }

    #[test]
    fn test_unknown_names_are_failures_not_usage_errors() {
        // use_stderr() is what routes a parse error to ExitCode::FAILURE
        // in exit_for_parse_error.
        for bad in [
            &["--transition", "crosszoom"][..],
            &["--easing", "bounce"][..],
        ] {
            let err = Cli::try_parse_from(args(bad)).unwrap_err();
            assert!(err.use_stderr(), "{bad:?} should be a failure");
        }
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["vstitch", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
