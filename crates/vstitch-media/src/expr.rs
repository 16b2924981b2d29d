//! Symbolic easing and transition expressions for FFmpeg's custom xfade.
//!
//! Each easing expression stores the eased progress in state slot `st(0)`;
//! each transition expression reads it back with `ld(0)`. Composing the two
//! with `;` lets any curve drive any formula without enumerating every
//! combination. The state slots persist across frames within one filter
//! instance, so the filter_complex stage must run with a single evaluation
//! thread (see [`crate::command::FfmpegCommand::build_args`]).
//!
//! Expression shapes follow the xfade-easing convention
//! (<https://github.com/scriptituk/xfade-easing>).

use vstitch_models::{Easing, Transition};

/// Symbolic expression for an easing curve, over linear progress `P`.
pub fn easing_expr(easing: Easing) -> &'static str {
    match easing {
        Easing::Linear => "st(0,P)",
        Easing::QuadraticIn => "st(0,P*(2-P))",
        Easing::QuadraticOut => "st(0,P*P)",
        Easing::QuadraticInOut => "st(0,if(lt(P,0.5),2*P*P,2*P*(2-P)-1))",
        Easing::CubicIn => "st(0,1-(1-P)^3)",
        Easing::CubicOut => "st(0,P^3)",
        Easing::CubicInOut => "st(0,if(lt(P,0.5),4*P^3,1-4*(1-P)^3))",
        Easing::QuarticIn => "st(0,1-(1-P)^4)",
        Easing::QuarticOut => "st(0,P^4)",
        Easing::QuarticInOut => "st(0,if(lt(P,0.5),8*P^4,1-8*(1-P)^4))",
        Easing::QuinticIn => "st(0,1-(1-P)^5)",
        Easing::QuinticOut => "st(0,P^5)",
        Easing::QuinticInOut => "st(0,if(lt(P,0.5),16*P^5,1-16*(1-P)^5))",
        Easing::SinusoidalIn => "st(0,sin(P*PI/2))",
        Easing::SinusoidalOut => "st(0,1-cos(P*PI/2))",
        Easing::SinusoidalInOut => "st(0,(1-cos(P*PI))/2)",
        Easing::Luxurious => "st(0,1-(1-P)^6)",
        Easing::Cinematic | Easing::Smooth => "st(0,P*P*(3-2*P))",
    }
}

/// Symbolic pixel-blend expression for a transition, over eased progress
/// `ld(0)`, pixel coordinates `X`/`Y`, frame dimensions `W`/`H`, source
/// samples `A`/`B` and the color plane index `PLANE`.
pub fn transition_expr(transition: Transition) -> &'static str {
    match transition {
        Transition::Fade => "A*ld(0)+B*(1-ld(0))",
        // Two-phase blends go through a plane-aware neutral: the luma plane
        // uses 0 (black) or 255 (white), chroma planes always use the
        // mid-value 128. Chroma encodes color offset, not brightness;
        // driving it to 0/255 would tint the fade.
        Transition::FadeBlack => {
            "st(1,if(eq(PLANE,0),0,128));\
             if(lt(ld(0),0.5),lerp(A,ld(1),2*ld(0)),lerp(ld(1),B,2*ld(0)-1))"
        }
        Transition::FadeWhite => {
            "st(1,if(eq(PLANE,0),255,128));\
             if(lt(ld(0),0.5),lerp(A,ld(1),2*ld(0)),lerp(ld(1),B,2*ld(0)-1))"
        }
        Transition::WipeLeft => "if(gt(X,W*ld(0)),B,A)",
        Transition::WipeRight => "if(gt(X,W*(1-ld(0))),A,B)",
        Transition::WipeUp => "if(gt(Y,H*ld(0)),B,A)",
        Transition::WipeDown => "if(gt(Y,H*(1-ld(0))),A,B)",
        // Slides resample the outgoing frame at a shifted coordinate so it
        // is pushed out rather than uncovered in place.
        Transition::SlideLeft => "if(gt(X,W*ld(0)),B,if(gt(X,W*ld(0)-W),b(X-W*ld(0)+W,Y),A))",
        Transition::SlideRight => {
            "if(lt(X,W*(1-ld(0))),B,if(lt(X,W*(2-ld(0))),a(X-W+W*ld(0),Y),A))"
        }
        // Distance from frame center against the half diagonal scaled by
        // eased progress.
        Transition::CircleCrop => "if(lt(hypot(X-W/2,Y-H/2),hypot(W/2,H/2)*ld(0)),A,B)",
        Transition::CircleOpen => "if(lt(hypot(X-W/2,Y-H/2),hypot(W/2,H/2)*ld(0)),B,A)",
        Transition::CircleClose => "if(gt(hypot(X-W/2,Y-H/2),hypot(W/2,H/2)*(1-ld(0))),B,A)",
        // Fractional-hash threshold per pixel for a granular reveal.
        Transition::Dissolve => {
            "st(1,st(1,sin(X*12.9898+Y*78.233)*43758.545)-floor(ld(1)));\
             st(1,ld(1)*2+ld(0)*2-1.5);\
             if(gte(ld(1),0.5),A,B)"
        }
    }
}

/// Combine an easing curve and a transition formula into one xfade
/// expression: the curve writes `st(0)`, the formula reads `ld(0)`.
pub fn compose_expr(easing: Easing, transition: Transition) -> String {
    format!("{};{}", easing_expr(easing), transition_expr(transition))
}

/// Escape single quotes so the expression can be embedded as a quoted
/// literal inside a filtergraph description.
pub fn escape_expr(expr: &str) -> String {
    expr.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_easing_writes_the_shared_slot() {
        for easing in Easing::ALL {
            let expr = easing_expr(*easing);
            assert!(expr.starts_with("st(0,"), "{easing}: {expr}");
            assert!(expr.ends_with(')'), "{easing}: {expr}");
        }
    }

    #[test]
    fn test_every_transition_reads_eased_progress() {
        for transition in Transition::ALL {
            let expr = transition_expr(*transition);
            assert!(expr.contains("ld(0)"), "{transition}: {expr}");
            // Raw linear progress must never leak past the easing stage.
            assert!(!expr.contains('P') || expr.contains("PLANE"), "{transition}: {expr}");
        }
    }

    #[test]
    fn test_fade_via_black_neutral_is_plane_aware() {
        let expr = transition_expr(Transition::FadeBlack);
        assert!(expr.contains("if(eq(PLANE,0),0,128)"));

        let expr = transition_expr(Transition::FadeWhite);
        assert!(expr.contains("if(eq(PLANE,0),255,128)"));
    }

    #[test]
    fn test_compose_chains_curve_then_formula() {
        let expr = compose_expr(Easing::CubicOut, Transition::Fade);
        assert_eq!(expr, "st(0,P^3);A*ld(0)+B*(1-ld(0))");
    }

    #[test]
    fn test_escape_single_quotes() {
        assert_eq!(escape_expr("a'b"), "a'\\''b");
        assert_eq!(escape_expr("no quotes"), "no quotes");
    }
}
