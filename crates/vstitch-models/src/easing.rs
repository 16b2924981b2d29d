//! Easing curve catalog.
//!
//! Naming follows the engine's convention, not CSS: `*-in` curves are fast
//! at the start and gentle at the end, `*-out` curves start slow and
//! accelerate. This mapping is load-bearing and must not be "fixed".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available easing curves.
///
/// Each curve remaps linear transition progress `P ∈ [0,1]` to an eased
/// value in `[0,1]` with `f(0)=0` and `f(1)=1`. The symbolic form executed
/// inside FFmpeg lives in `vstitch-media`; [`Easing::remap`] is the
/// host-side reference evaluation of the same closed forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed, no remapping
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SinusoidalIn,
    SinusoidalOut,
    SinusoidalInOut,
    /// Very fast start, ultra gentle end (sextic ease, approximates
    /// cubic-bezier(0.19, 1, 0.22, 1))
    Luxurious,
    /// Classic smoothstep, gentle both ends
    Cinematic,
    /// Alias shape of [`Easing::Cinematic`] kept as a separate name
    Smooth,
}

impl Easing {
    /// All available easing curves.
    pub const ALL: &'static [Easing] = &[
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuarticIn,
        Easing::QuarticOut,
        Easing::QuarticInOut,
        Easing::QuinticIn,
        Easing::QuinticOut,
        Easing::QuinticInOut,
        Easing::SinusoidalIn,
        Easing::SinusoidalOut,
        Easing::SinusoidalInOut,
        Easing::Luxurious,
        Easing::Cinematic,
        Easing::Smooth,
    ];

    /// Returns the curve name as used on the CLI and in serialized plans.
    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadraticIn => "quadratic-in",
            Easing::QuadraticOut => "quadratic-out",
            Easing::QuadraticInOut => "quadratic-in-out",
            Easing::CubicIn => "cubic-in",
            Easing::CubicOut => "cubic-out",
            Easing::CubicInOut => "cubic-in-out",
            Easing::QuarticIn => "quartic-in",
            Easing::QuarticOut => "quartic-out",
            Easing::QuarticInOut => "quartic-in-out",
            Easing::QuinticIn => "quintic-in",
            Easing::QuinticOut => "quintic-out",
            Easing::QuinticInOut => "quintic-in-out",
            Easing::SinusoidalIn => "sinusoidal-in",
            Easing::SinusoidalOut => "sinusoidal-out",
            Easing::SinusoidalInOut => "sinusoidal-in-out",
            Easing::Luxurious => "luxurious",
            Easing::Cinematic => "cinematic",
            Easing::Smooth => "smooth",
        }
    }

    /// Host-side reference evaluation of the curve.
    ///
    /// Mirrors the symbolic expression evaluated per pixel inside the
    /// compositing engine. Used to verify curve shape (boundaries,
    /// monotonicity) without spawning any subprocess.
    pub fn remap(&self, p: f64) -> f64 {
        use std::f64::consts::PI;

        match self {
            Easing::Linear => p,
            Easing::QuadraticIn => p * (2.0 - p),
            Easing::QuadraticOut => p * p,
            Easing::QuadraticInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    2.0 * p * (2.0 - p) - 1.0
                }
            }
            Easing::CubicIn => 1.0 - (1.0 - p).powi(3),
            Easing::CubicOut => p.powi(3),
            Easing::CubicInOut => {
                if p < 0.5 {
                    4.0 * p.powi(3)
                } else {
                    1.0 - 4.0 * (1.0 - p).powi(3)
                }
            }
            Easing::QuarticIn => 1.0 - (1.0 - p).powi(4),
            Easing::QuarticOut => p.powi(4),
            Easing::QuarticInOut => {
                if p < 0.5 {
                    8.0 * p.powi(4)
                } else {
                    1.0 - 8.0 * (1.0 - p).powi(4)
                }
            }
            Easing::QuinticIn => 1.0 - (1.0 - p).powi(5),
            Easing::QuinticOut => p.powi(5),
            Easing::QuinticInOut => {
                if p < 0.5 {
                    16.0 * p.powi(5)
                } else {
                    1.0 - 16.0 * (1.0 - p).powi(5)
                }
            }
            Easing::SinusoidalIn => (p * PI / 2.0).sin(),
            Easing::SinusoidalOut => 1.0 - (p * PI / 2.0).cos(),
            Easing::SinusoidalInOut => (1.0 - (p * PI).cos()) / 2.0,
            Easing::Luxurious => 1.0 - (1.0 - p).powi(6),
            Easing::Cinematic | Easing::Smooth => p * p * (3.0 - 2.0 * p),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::CubicOut
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Easing {
    type Err = EasingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Easing::ALL
            .iter()
            .find(|e| e.as_str() == lower)
            .copied()
            .ok_or_else(|| EasingParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown easing curve: {0}")]
pub struct EasingParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_parse_roundtrip() {
        for easing in Easing::ALL {
            assert_eq!(easing.as_str().parse::<Easing>().unwrap(), *easing);
        }
        assert_eq!("CUBIC-OUT".parse::<Easing>().unwrap(), Easing::CubicOut);
        assert!("bounce".parse::<Easing>().is_err());
    }

    #[test]
    fn test_boundaries() {
        for easing in Easing::ALL {
            assert!(
                easing.remap(0.0).abs() < EPS,
                "{easing}: f(0) = {}",
                easing.remap(0.0)
            );
            assert!(
                (easing.remap(1.0) - 1.0).abs() < EPS,
                "{easing}: f(1) = {}",
                easing.remap(1.0)
            );
        }
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        for easing in Easing::ALL {
            let mut prev = easing.remap(0.0);
            for i in 1..=1000 {
                let p = i as f64 / 1000.0;
                let v = easing.remap(p);
                assert!(
                    v >= prev - EPS,
                    "{easing}: decreased at P={p} ({prev} -> {v})"
                );
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_is_fast_start() {
        // Engine naming: "in" accelerates immediately, "out" ramps up late.
        assert!(Easing::CubicIn.remap(0.25) > 0.25);
        assert!(Easing::CubicOut.remap(0.25) < 0.25);
        assert!((Easing::CubicOut.remap(0.5) - 0.125).abs() < EPS);
    }

    #[test]
    fn test_in_out_midpoint_halves_meet() {
        for easing in [
            Easing::QuadraticInOut,
            Easing::CubicInOut,
            Easing::QuarticInOut,
            Easing::QuinticInOut,
            Easing::SinusoidalInOut,
        ] {
            assert!((easing.remap(0.5) - 0.5).abs() < 1e-6, "{easing}");
        }
    }
}
