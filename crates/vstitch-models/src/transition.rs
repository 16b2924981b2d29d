//! Transition formula catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available transition formulas.
///
/// Each formula blends two overlapping clips per pixel, driven by the eased
/// progress produced by an [`crate::Easing`] curve. The symbolic pixel
/// expressions live in `vstitch-media`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Linear alpha blend of the two frames
    Fade,
    /// Fade A to black, then black to B (chroma stays neutral)
    FadeBlack,
    /// Fade A to white, then white to B (chroma stays neutral)
    FadeWhite,
    /// Hard vertical boundary sweeping left
    WipeLeft,
    /// Hard vertical boundary sweeping right
    WipeRight,
    /// Hard horizontal boundary sweeping up
    WipeUp,
    /// Hard horizontal boundary sweeping down
    WipeDown,
    /// Incoming frame pushes the outgoing frame off to the left
    SlideLeft,
    /// Incoming frame pushes the outgoing frame off to the right
    SlideRight,
    /// Shrinking circle keeps A inside, reveals B outside
    CircleCrop,
    /// Growing circle reveals B from the center
    CircleOpen,
    /// Shrinking circle closes down on A
    CircleClose,
    /// Granular stochastic reveal from a per-pixel hash threshold
    Dissolve,
}

impl Transition {
    /// All available transition formulas.
    pub const ALL: &'static [Transition] = &[
        Transition::Fade,
        Transition::FadeBlack,
        Transition::FadeWhite,
        Transition::WipeLeft,
        Transition::WipeRight,
        Transition::WipeUp,
        Transition::WipeDown,
        Transition::SlideLeft,
        Transition::SlideRight,
        Transition::CircleCrop,
        Transition::CircleOpen,
        Transition::CircleClose,
        Transition::Dissolve,
    ];

    /// Returns the formula name as used on the CLI and in serialized plans.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Fade => "fade",
            Transition::FadeBlack => "fadeblack",
            Transition::FadeWhite => "fadewhite",
            Transition::WipeLeft => "wipeleft",
            Transition::WipeRight => "wiperight",
            Transition::WipeUp => "wipeup",
            Transition::WipeDown => "wipedown",
            Transition::SlideLeft => "slideleft",
            Transition::SlideRight => "slideright",
            Transition::CircleCrop => "circlecrop",
            Transition::CircleOpen => "circleopen",
            Transition::CircleClose => "circleclose",
            Transition::Dissolve => "dissolve",
        }
    }
}

impl Default for Transition {
    fn default() -> Self {
        Transition::Fade
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Transition {
    type Err = TransitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Transition::ALL
            .iter()
            .find(|t| t.as_str() == lower)
            .copied()
            .ok_or_else(|| TransitionParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown transition: {0}")]
pub struct TransitionParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for transition in Transition::ALL {
            assert_eq!(
                transition.as_str().parse::<Transition>().unwrap(),
                *transition
            );
        }
        assert_eq!(
            "FadeBlack".parse::<Transition>().unwrap(),
            Transition::FadeBlack
        );
        assert!("crosszoom".parse::<Transition>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Transition::CircleOpen.to_string(), "circleopen");
        assert_eq!(Transition::default().to_string(), "fade");
    }
}
