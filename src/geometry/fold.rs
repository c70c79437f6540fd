//! Fold-line geometry for a page corner dragged towards a pointer.
//!
//! All functions are pure. Coordinates are page-local logical units with the
//! origin at the top-left corner of the page box.

use crate::foundation::core::{Affine, BezPath, Point, Vec2};

/// The crease induced by dragging `corner` to `pointer`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoldGeometry {
    /// Midpoint of the corner-pointer segment; the fold line passes through it.
    pub midpoint: Point,
    /// Unit vector along the fold line, `(-dy, dx) / dist`.
    pub direction: Vec2,
    /// Unit normal pointing from the pointer back towards the corner.
    pub normal: Vec2,
    /// Distance between corner and pointer.
    pub distance: f64,
}

/// Which half-plane of the fold line a region covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoldSide {
    /// The side containing the pivot corner, where the neighbor page is revealed.
    Corner,
    /// The opposite side, where the current page stays flat.
    Kept,
}

impl FoldSide {
    fn sign(self) -> f64 {
        match self {
            Self::Corner => 1.0,
            Self::Kept => -1.0,
        }
    }
}

/// Compute the fold for a drag, or `None` when corner and pointer are closer than one unit.
pub fn compute_fold(corner: Point, pointer: Point) -> Option<FoldGeometry> {
    let d = pointer - corner;
    let distance = d.hypot();
    if !distance.is_finite() || distance < 1.0 {
        return None;
    }
    Some(FoldGeometry {
        midpoint: corner.midpoint(pointer),
        direction: Vec2::new(-d.y, d.x) / distance,
        normal: -d / distance,
        distance,
    })
}

/// Reflect the pointer so the corner-pointer midpoint stays inside the page
/// box grown by `margin` on every side.
pub fn constrain_pointer(
    corner: Point,
    pointer: Point,
    width: f64,
    height: f64,
    margin: f64,
) -> Point {
    let mut x = pointer.x;
    let mut y = pointer.y;
    if (corner.x + x) / 2.0 < -margin {
        x = -2.0 * margin - corner.x;
    }
    if (corner.x + x) / 2.0 > width + margin {
        x = 2.0 * (width + margin) - corner.x;
    }
    if (corner.y + y) / 2.0 < -margin {
        y = -2.0 * margin - corner.y;
    }
    if (corner.y + y) / 2.0 > height + margin {
        y = 2.0 * (height + margin) - corner.y;
    }
    Point::new(x, y)
}

/// Fold distance normalized by the page diagonal, clamped to `[0, 1]`.
pub fn progress_for(distance: f64, width: f64, height: f64) -> f64 {
    let diagonal = width.hypot(height);
    if !(diagonal > 0.0) || !distance.is_finite() {
        return 0.0;
    }
    (distance / diagonal).clamp(0.0, 1.0)
}

/// Curvature of the fold boundary: zero when fully closed or fully open,
/// peaking at half progress.
pub fn curvature_for(distance: f64, width: f64, height: f64, scale: f64) -> f64 {
    let progress = progress_for(distance, width, height);
    // sin(pi) is ~1.2e-16, not zero.
    if progress >= 1.0 {
        return 0.0;
    }
    (progress * std::f64::consts::PI).sin() * width * scale
}

/// Householder reflection across the line through `midpoint` with unit `normal`.
pub fn reflect_across_fold(normal: Vec2, midpoint: Point) -> Affine {
    let (nx, ny) = (normal.x, normal.y);
    let d = nx * midpoint.x + ny * midpoint.y;
    Affine::new([
        1.0 - 2.0 * nx * nx,
        -2.0 * nx * ny,
        -2.0 * nx * ny,
        1.0 - 2.0 * ny * ny,
        2.0 * nx * d,
        2.0 * ny * d,
    ])
}

/// Length the fold line is extended in both directions so it spans any page box.
pub fn fold_extent(width: f64, height: f64) -> f64 {
    (width + height) * 2.0
}

impl FoldGeometry {
    fn line_ends(&self, extent: f64) -> (Point, Point) {
        (
            self.midpoint - self.direction * extent,
            self.midpoint + self.direction * extent,
        )
    }

    fn control_point(&self, curvature: f64) -> Point {
        self.midpoint - self.normal * curvature
    }

    /// Open path along the fold: a line, or a quadratic bowed towards the kept
    /// side when `curvature > curve_threshold`.
    pub fn boundary(&self, curvature: f64, extent: f64, curve_threshold: f64) -> BezPath {
        let (a, b) = self.line_ends(extent);
        let mut p = BezPath::new();
        p.move_to(a);
        if curvature > curve_threshold {
            p.quad_to(self.control_point(curvature), b);
        } else {
            p.line_to(b);
        }
        p
    }

    /// Closed region covering one side of the (possibly curved) fold boundary.
    pub fn half_plane(
        &self,
        side: FoldSide,
        curvature: f64,
        extent: f64,
        curve_threshold: f64,
    ) -> BezPath {
        let (a, b) = self.line_ends(extent);
        let offset = self.normal * (extent * side.sign());
        let mut p = self.boundary(curvature, extent, curve_threshold);
        p.line_to(b + offset);
        p.line_to(a + offset);
        p.close_path();
        p
    }

    /// Reflection that mirrors page content across this fold.
    pub fn reflection(&self) -> Affine {
        reflect_across_fold(self.normal, self.midpoint)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fold.rs"]
mod tests;
