//! Host-facing input vocabulary: directions, keys, cursor affordances and the
//! navigation indicator.

use crate::foundation::config::GestureConfig;
use crate::foundation::core::{PageBox, Point};

/// Which neighbor a flip reveals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlipDirection {
    Previous,
    Next,
}

impl FlipDirection {
    pub fn sign(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Keyboard navigation. Left/Up go back, Right/Down go forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Up,
    Right,
    Down,
}

impl NavKey {
    pub fn direction(self) -> FlipDirection {
        match self {
            Self::Left | Self::Up => FlipDirection::Previous,
            Self::Right | Self::Down => FlipDirection::Next,
        }
    }
}

/// Pointer affordance the host should display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
}

/// Edge zone hit: the direction a drag from here would flip, and the corner the
/// fold pivots around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeHit {
    pub direction: FlipDirection,
    pub corner: Point,
}

/// Classify a page-local point against the leading and trailing edge zones.
///
/// The corner sits on the near vertical edge, at the bottom when the point is
/// in the lower half of the page and at the top otherwise. Neighbor
/// availability is the caller's concern.
pub fn edge_zone_hit(point: Point, page_box: PageBox, gesture: &GestureConfig) -> Option<EdgeHit> {
    let (w, h) = (page_box.width, page_box.height);
    let zone = w * gesture.edge_zone_fraction;
    let corner_y = if point.y > h / 2.0 { h } else { 0.0 };
    if point.x > w - zone {
        Some(EdgeHit {
            direction: FlipDirection::Next,
            corner: Point::new(w, corner_y),
        })
    } else if point.x < zone {
        Some(EdgeHit {
            direction: FlipDirection::Previous,
            corner: Point::new(0.0, corner_y),
        })
    } else {
        None
    }
}

/// Page indicator and previous/next affordance state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavStatus {
    /// Zero-based current page.
    pub current: usize,
    pub total: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl NavStatus {
    pub fn new(current: usize, total: usize) -> Self {
        Self {
            current,
            total,
            prev_disabled: current == 0,
            next_disabled: current + 1 >= total,
        }
    }

    /// `"k / N"` with a one-based `k`.
    pub fn label(&self) -> String {
        format!("{} / {}", self.current + 1, self.total)
    }
}
