//! Shared data models for the vstitch transition planner.
//!
//! This crate provides Serde-serializable types for:
//! - Easing curves and transition formulas (closed catalogs)
//! - Clip records and transition specifications
//! - Timeline planning (offset arithmetic and feasibility checks)
//! - Output encoding configuration

pub mod easing;
pub mod encoding;
pub mod timeline;
pub mod transition;

// Re-export common types
pub use easing::{Easing, EasingParseError};
pub use encoding::EncodingConfig;
pub use timeline::{
    ClipSource, PlanError, StreamRef, TimelinePlan, TransitionSegment, TransitionSpec,
    DEFAULT_TRANSITION_DURATION,
};
pub use transition::{Transition, TransitionParseError};
