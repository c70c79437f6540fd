use crate::foundation::config::LayoutConfig;
use crate::foundation::error::{FlipbookError, FlipbookResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Straight (non-premultiplied) RGBA8 color as configured by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Same color with alpha replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

/// The logical page box the flipbook draws into.
///
/// Width and height are logical units (CSS-pixel equivalent); `dpr` is the
/// device pixel ratio used to size the backing surface.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl PageBox {
    pub fn new(width: f64, height: f64, dpr: f64) -> FlipbookResult<Self> {
        if !(width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0) {
            return Err(FlipbookError::validation(format!(
                "page box must be finite and at least 1x1, got {width}x{height}"
            )));
        }
        if !(dpr.is_finite() && dpr > 0.0) {
            return Err(FlipbookError::validation(format!(
                "device pixel ratio must be finite and > 0, got {dpr}"
            )));
        }
        Ok(Self { width, height, dpr })
    }

    /// Fit a page of `aspect` (width / height) into a viewport.
    pub fn fit(
        viewport_w: f64,
        viewport_h: f64,
        aspect: f64,
        dpr: f64,
        layout: &LayoutConfig,
    ) -> FlipbookResult<Self> {
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(FlipbookError::validation(format!(
                "page aspect ratio must be finite and > 0, got {aspect}"
            )));
        }
        if !(viewport_w.is_finite() && viewport_h.is_finite()) {
            return Err(FlipbookError::validation("viewport size must be finite"));
        }

        let mobile = viewport_w <= layout.mobile_breakpoint;
        let mut w = viewport_w
            * if mobile {
                layout.mobile_width_fraction
            } else {
                layout.desktop_width_fraction
            };
        let mut h = w / aspect;
        let max_h = viewport_h * layout.max_height_fraction;
        if h > max_h {
            h = max_h;
            w = h * aspect;
        }
        let width = w.max(layout.min_page_width).round();
        let height = (width / aspect).round();
        Self::new(width, height.max(1.0), dpr)
    }

    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn diagonal(self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Backing surface size in device pixels.
    pub fn surface_size(self) -> (u32, u32) {
        (
            (self.width * self.dpr).round().max(1.0) as u32,
            (self.height * self.dpr).round().max(1.0) as u32,
        )
    }

    /// Map a viewport point into page-local logical coordinates given where
    /// the page box currently sits on screen.
    pub fn to_page_local(self, viewport_point: Point, on_screen: Rect) -> Point {
        let sx = if on_screen.width() > 0.0 {
            self.width / on_screen.width()
        } else {
            1.0
        };
        let sy = if on_screen.height() > 0.0 {
            self.height / on_screen.height()
        } else {
            1.0
        };
        Point::new(
            (viewport_point.x - on_screen.x0) * sx,
            (viewport_point.y - on_screen.y0) * sy,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
