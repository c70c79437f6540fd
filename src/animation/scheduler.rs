//! Time-based pointer animations driven by host frame callbacks.
//!
//! A [`Tween`] never reads a clock itself. The host passes the frame timestamp
//! (milliseconds, e.g. from its per-frame callback) into [`Tween::step`] until
//! it reports completion.

use crate::animation::ease::Ease;
use crate::foundation::config::AnimationConfig;
use crate::foundation::core::{PageBox, Point};
use crate::foundation::math::lerp;
use crate::interact::input::FlipDirection;

/// The three scheduled animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    /// Carries the fold past the opposite edge, then advances the page.
    CompleteFlip,
    /// Returns the pointer to the corner, leaving the page unchanged.
    SnapBack,
    /// Cosmetic peek out of the bottom-right corner and back.
    HintPeek,
}

/// Converts frame timestamps into a monotonic progress fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    start_ms: f64,
    duration_ms: f64,
    last_t: f64,
}

impl FrameClock {
    pub fn new(start_ms: f64, duration_ms: f64) -> Self {
        Self {
            start_ms,
            duration_ms,
            last_t: 0.0,
        }
    }

    /// Progress in `[0, 1]` at `now_ms`. Never moves backwards, even if the
    /// host delivers out-of-order timestamps.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let raw = if self.duration_ms > 0.0 {
            (now_ms - self.start_ms) / self.duration_ms
        } else {
            1.0
        };
        let t = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 1.0 };
        self.last_t = self.last_t.max(t);
        self.last_t
    }

    pub fn last(&self) -> f64 {
        self.last_t
    }
}

/// Path followed by the pointer over normalized time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Straight eased interpolation.
    Eased { from: Point, to: Point, ease: Ease },
    /// Out to `peak` with a sine ease-out until `split`, then back to `rest`
    /// with a quadratic ease-out.
    Peek { rest: Point, peak: Point, split: f64 },
}

impl Motion {
    pub fn position_at(&self, t: f64) -> Point {
        match *self {
            Self::Eased { from, to, ease } => from.lerp(to, ease.apply(t)),
            Self::Peek { rest, peak, split } => {
                if t < split {
                    let e = Ease::OutSine.apply(t / split);
                    Point::new(lerp(rest.x, peak.x, e), lerp(rest.y, peak.y, e))
                } else {
                    let e = Ease::OutQuad.apply((t - split) / (1.0 - split));
                    Point::new(lerp(peak.x, rest.x, e), lerp(peak.y, rest.y, e))
                }
            }
        }
    }

    fn rescaled(self, sx: f64, sy: f64) -> Self {
        let scale = |p: Point| Point::new(p.x * sx, p.y * sy);
        match self {
            Self::Eased { from, to, ease } => Self::Eased {
                from: scale(from),
                to: scale(to),
                ease,
            },
            Self::Peek { rest, peak, split } => Self::Peek {
                rest: scale(rest),
                peak: scale(peak),
                split,
            },
        }
    }
}

/// Result of advancing a tween by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenStep {
    pub pointer: Point,
    pub t: f64,
    pub finished: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub kind: AnimationKind,
    pub motion: Motion,
    clock: FrameClock,
}

impl Tween {
    pub fn new(kind: AnimationKind, motion: Motion, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            kind,
            motion,
            clock: FrameClock::new(start_ms, duration_ms),
        }
    }

    /// Carry the pointer just past the edge opposite the dragged one, at the
    /// corner's height. A next-page flip ends left of the page, a
    /// previous-page flip right of it.
    pub fn complete_flip(
        from: Point,
        corner: Point,
        direction: FlipDirection,
        page_box: PageBox,
        cfg: &AnimationConfig,
        now_ms: f64,
    ) -> Self {
        let w = page_box.width;
        let to_x = match direction {
            FlipDirection::Next => -w * cfg.complete_overshoot,
            FlipDirection::Previous => w * (1.0 + cfg.complete_overshoot),
        };
        Self::new(
            AnimationKind::CompleteFlip,
            Motion::Eased {
                from,
                to: Point::new(to_x, corner.y),
                ease: Ease::OutCubic,
            },
            now_ms,
            cfg.complete_ms,
        )
    }

    pub fn snap_back(from: Point, corner: Point, cfg: &AnimationConfig, now_ms: f64) -> Self {
        Self::new(
            AnimationKind::SnapBack,
            Motion::Eased {
                from,
                to: corner,
                ease: Ease::DampedOut,
            },
            now_ms,
            cfg.snap_back_ms,
        )
    }

    pub fn hint_peek(corner: Point, page_box: PageBox, cfg: &AnimationConfig, now_ms: f64) -> Self {
        Self::new(
            AnimationKind::HintPeek,
            Motion::Peek {
                rest: corner,
                peak: Point::new(
                    page_box.width * cfg.hint_peak[0],
                    page_box.height * cfg.hint_peak[1],
                ),
                split: cfg.hint_split,
            },
            now_ms,
            cfg.hint_ms,
        )
    }

    pub fn step(&mut self, now_ms: f64) -> TweenStep {
        let t = self.clock.advance(now_ms);
        TweenStep {
            pointer: self.motion.position_at(t),
            t,
            finished: t >= 1.0,
        }
    }

    /// Same tween with every waypoint scaled per axis, for a page box that
    /// changed size mid-animation. Progress is kept.
    pub fn rescaled(self, sx: f64, sy: f64) -> Self {
        Self {
            motion: self.motion.rescaled(sx, sy),
            ..self
        }
    }

    /// Pointer at the last observed frame.
    pub fn current(&self) -> Point {
        self.motion.position_at(self.clock.last())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
