//! Gesture state machine.
//!
//! [`Flipbook`] owns the session and the gesture. Host input (pointer, keys,
//! resize) and host frame callbacks ([`Flipbook::tick`]) are the only ways it
//! changes; [`Flipbook::curl_frame`] reads the state back out for the
//! compositor. A single [`Phase`] value holds the drag or the running
//! animation, so the two can never be active at once.

use crate::animation::scheduler::{AnimationKind, Tween};
use crate::audio::cue::{CueSink, FlipCuePlayer};
use crate::compose::compositor::CurlFrame;
use crate::foundation::config::FlipbookConfig;
use crate::foundation::core::{PageBox, Point};
use crate::foundation::error::FlipbookResult;
use crate::geometry::fold::{compute_fold, constrain_pointer, progress_for};
use crate::interact::input::{Cursor, FlipDirection, NavKey, NavStatus, edge_zone_hit};
use crate::interact::session::FlipbookSession;
use crate::pages::source::{PageSequence, PageSource};

/// Controller state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Dragging { direction: FlipDirection },
    Animating { tween: Tween, direction: FlipDirection },
}

/// Pivot corner and live pointer, in page-local units. Zeroed between gestures.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gesture {
    pub corner: Point,
    pub pointer: Point,
}

/// What one [`Flipbook::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// The gesture moved; the host should repaint.
    pub redraw: bool,
    /// The animation that ended on this frame, if any.
    pub finished: Option<AnimationKind>,
    /// Page index after a completed flip.
    pub turned_to: Option<usize>,
}

/// Page-curl controller: one reading session plus the gesture driving it.
pub struct Flipbook<S = PageSequence> {
    session: FlipbookSession<S>,
    config: FlipbookConfig,
    phase: Phase,
    gesture: Gesture,
    hover: Cursor,
    hint_due_ms: Option<f64>,
    cue: Option<FlipCuePlayer>,
}

impl<S: PageSource> Flipbook<S> {
    /// Start a session at `now_ms` (host clock). The hint peek is scheduled
    /// `hint_delay_ms` later and fires from [`Flipbook::tick`].
    pub fn new(pages: S, page_box: PageBox, config: FlipbookConfig, now_ms: f64) -> FlipbookResult<Self> {
        config.validate()?;
        let session = FlipbookSession::new(pages, page_box)?;
        let hint_due_ms = Some(now_ms + config.animation.hint_delay_ms);
        tracing::debug!(
            page_count = session.page_count(),
            width = page_box.width,
            height = page_box.height,
            "flipbook session started"
        );
        Ok(Self {
            session,
            config,
            phase: Phase::Idle,
            gesture: Gesture::default(),
            hover: Cursor::Default,
            hint_due_ms,
            cue: None,
        })
    }

    /// Start a session with a page box fitted to the viewport.
    pub fn for_viewport(
        pages: S,
        viewport_w: f64,
        viewport_h: f64,
        dpr: f64,
        config: FlipbookConfig,
        now_ms: f64,
    ) -> FlipbookResult<Self> {
        let aspect = pages
            .aspect_ratio()
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(config.layout.default_aspect_ratio);
        let page_box = PageBox::fit(viewport_w, viewport_h, aspect, dpr, &config.layout)?;
        Self::new(pages, page_box, config, now_ms)
    }

    /// Play a synthesized cue through `sink` on every completed flip. Ignored
    /// when audio is disabled in the configuration.
    pub fn with_cue_sink(mut self, sink: Box<dyn CueSink>) -> Self {
        if self.config.audio.enabled {
            let seed = self.session.page_count() as u64 ^ 0x5EED_F11B;
            self.cue = Some(FlipCuePlayer::new(self.config.audio.sample_rate, seed, sink));
        }
        self
    }

    pub fn session(&self) -> &FlipbookSession<S> {
        &self.session
    }

    pub fn pages(&self) -> &S {
        self.session.pages()
    }

    pub fn config(&self) -> &FlipbookConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn page_box(&self) -> PageBox {
        self.session.page_box()
    }

    pub fn current_page(&self) -> usize {
        self.session.current_page()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating { .. })
    }

    pub fn status(&self) -> NavStatus {
        self.session.status()
    }

    pub fn cursor(&self) -> Cursor {
        if self.is_dragging() {
            Cursor::Grabbing
        } else {
            self.hover
        }
    }

    /// Edge zone under `point` whose neighbor page exists.
    fn active_zone(&self, point: Point) -> Option<(FlipDirection, Point)> {
        let hit = edge_zone_hit(point, self.session.page_box(), &self.config.gesture)?;
        self.session
            .neighbor(hit.direction)
            .map(|_| (hit.direction, hit.corner))
    }

    /// Begin a drag. Returns `true` when a drag started.
    ///
    /// Ignored while a drag or animation is in progress, outside both edge
    /// zones, and when the zone's neighbor page does not exist.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        let Some((direction, corner)) = self.active_zone(point) else {
            return false;
        };
        self.phase = Phase::Dragging { direction };
        self.gesture = Gesture {
            corner,
            pointer: point,
        };
        tracing::debug!(?direction, corner_x = corner.x, corner_y = corner.y, "drag started");
        true
    }

    /// Track the pointer. Returns `true` when the frame needs a repaint.
    ///
    /// Outside a drag this only refreshes the hover cursor.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.is_dragging() {
            self.gesture.pointer = point;
            return true;
        }
        self.hover = if self.active_zone(point).is_some() {
            Cursor::Grab
        } else {
            Cursor::Default
        };
        false
    }

    /// Release a drag, choosing between completing the flip and snapping
    /// back. Returns the animation that was started.
    pub fn pointer_up(&mut self, now_ms: f64) -> Option<AnimationKind> {
        let Phase::Dragging { direction } = self.phase else {
            return None;
        };
        self.hover = Cursor::Default;

        let progress = self.release_progress();
        let Gesture { corner, pointer } = self.gesture;
        let tween = if progress > self.config.gesture.complete_threshold {
            self.start_complete(pointer, corner, direction, now_ms)
        } else {
            Tween::snap_back(pointer, corner, &self.config.animation, now_ms)
        };
        tracing::debug!(progress, kind = ?tween.kind, "drag released");
        self.phase = Phase::Animating { tween, direction };
        Some(tween.kind)
    }

    fn release_progress(&self) -> f64 {
        let page_box = self.session.page_box();
        let (w, h) = (page_box.width, page_box.height);
        let Gesture { corner, pointer } = self.gesture;
        let clamped = constrain_pointer(corner, pointer, w, h, self.config.gesture.clamp_margin);
        compute_fold(corner, clamped).map_or(0.0, |f| progress_for(f.distance, w, h))
    }

    /// Complete-flip tween plus the cue that accompanies it.
    fn start_complete(
        &mut self,
        from: Point,
        corner: Point,
        direction: FlipDirection,
        now_ms: f64,
    ) -> Tween {
        if let Some(cue) = self.cue.as_mut() {
            cue.fire();
        }
        Tween::complete_flip(
            from,
            corner,
            direction,
            self.session.page_box(),
            &self.config.animation,
            now_ms,
        )
    }

    /// Flip to the neighbor in `direction` as if the corner had been dragged
    /// from just inside the bottom edge. No-op while busy or past either end.
    pub fn navigate(&mut self, direction: FlipDirection, now_ms: f64) -> bool {
        if self.phase != Phase::Idle || self.session.neighbor(direction).is_none() {
            return false;
        }
        let page_box = self.session.page_box();
        let (w, h) = (page_box.width, page_box.height);
        let off = self.config.gesture.nav_start_offset;
        let (corner, pointer) = match direction {
            FlipDirection::Next => (Point::new(w, h), Point::new(w - off, h - off)),
            FlipDirection::Previous => (Point::new(0.0, h), Point::new(off, h - off)),
        };
        self.gesture = Gesture { corner, pointer };
        let tween = self.start_complete(pointer, corner, direction, now_ms);
        self.phase = Phase::Animating { tween, direction };
        tracing::debug!(?direction, "navigation flip started");
        true
    }

    pub fn key(&mut self, key: NavKey, now_ms: f64) -> bool {
        self.navigate(key.direction(), now_ms)
    }

    /// Start the hint peek. Dropped while busy or with fewer than two pages.
    pub fn request_hint(&mut self, now_ms: f64) -> bool {
        if self.phase != Phase::Idle || self.session.page_count() < 2 {
            return false;
        }
        let page_box = self.session.page_box();
        let corner = Point::new(page_box.width, page_box.height);
        let tween = Tween::hint_peek(corner, page_box, &self.config.animation, now_ms);
        self.gesture = Gesture {
            corner,
            pointer: corner,
        };
        self.phase = Phase::Animating {
            tween,
            direction: FlipDirection::Next,
        };
        tracing::debug!("hint peek started");
        true
    }

    /// Refit the page box to a new viewport, keeping the current page.
    pub fn resize(&mut self, viewport_w: f64, viewport_h: f64, dpr: f64) -> FlipbookResult<PageBox> {
        let page_box = PageBox::fit(
            viewport_w,
            viewport_h,
            self.session.aspect_ratio(),
            dpr,
            &self.config.layout,
        )?;
        let old = self.session.page_box();
        self.session.set_page_box(page_box);

        // A live gesture keeps its place relative to the page.
        let (sx, sy) = (page_box.width / old.width, page_box.height / old.height);
        if self.phase != Phase::Idle {
            let scale = |p: Point| Point::new(p.x * sx, p.y * sy);
            self.gesture = Gesture {
                corner: scale(self.gesture.corner),
                pointer: scale(self.gesture.pointer),
            };
        }
        if let Phase::Animating { tween, direction } = self.phase {
            self.phase = Phase::Animating {
                tween: tween.rescaled(sx, sy),
                direction,
            };
        }
        tracing::debug!(width = page_box.width, height = page_box.height, "page box resized");
        Ok(page_box)
    }

    /// Per-frame callback. Fires the scheduled hint once due, advances the
    /// running animation and applies its end transition.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if let Some(due) = self.hint_due_ms
            && now_ms >= due
        {
            self.hint_due_ms = None;
            self.request_hint(now_ms);
        }

        let Phase::Animating {
            mut tween,
            direction,
        } = self.phase
        else {
            return Tick::default();
        };

        let step = tween.step(now_ms);
        self.gesture.pointer = step.pointer;
        tracing::trace!(t = step.t, kind = ?tween.kind, "animation frame");
        if !step.finished {
            self.phase = Phase::Animating { tween, direction };
            return Tick {
                redraw: true,
                ..Tick::default()
            };
        }

        self.phase = Phase::Idle;
        self.gesture = Gesture::default();
        let turned_to = match tween.kind {
            AnimationKind::CompleteFlip => self.session.turn(direction),
            AnimationKind::SnapBack | AnimationKind::HintPeek => None,
        };
        tracing::debug!(kind = ?tween.kind, page = self.session.current_page(), "animation finished");
        Tick {
            redraw: true,
            finished: Some(tween.kind),
            turned_to,
        }
    }

    /// Compositor input for the state last observed.
    pub fn curl_frame(&self) -> CurlFrame {
        let page_box = self.session.page_box();
        let current = self.session.current_slot();
        let direction = match self.phase {
            Phase::Idle => return CurlFrame::flat(page_box, current),
            Phase::Dragging { direction } | Phase::Animating { direction, .. } => direction,
        };
        CurlFrame::folded(
            page_box,
            current,
            self.session.neighbor_slot(direction),
            self.gesture.corner,
            self.gesture.pointer,
            &self.config,
        )
    }

    /// End the session and hand the page source back.
    pub fn reset(self) -> S {
        tracing::debug!("flipbook session ended");
        self.session.into_pages()
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Flipbook<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flipbook")
            .field("session", &self.session)
            .field("phase", &self.phase)
            .field("gesture", &self.gesture)
            .field("hint_due_ms", &self.hint_due_ms)
            .field("cue", &self.cue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/controller.rs"]
mod tests;
