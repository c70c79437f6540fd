//! Drawing-surface independent description of a composed frame.
//!
//! A [`LayerStack`] is an ordered list of layers. Each layer opens a fresh set
//! of clip regions, evaluates its operations in order, and closes every clip it
//! opened, so no masking state leaks from one layer into the next.

use smallvec::SmallVec;

use crate::foundation::core::{Affine, BezPath, PageBox, Point, Rgba8};

/// One color stop of a [`LinearRamp`]; `offset` is in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba8,
}

/// A linear gradient from `start` to `end`, padded with the first and last
/// stop colors beyond its ends. Fills whatever the enclosing clips leave open.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRamp {
    pub start: Point,
    pub end: Point,
    pub stops: SmallVec<[GradientStop; 5]>,
}

impl LinearRamp {
    pub fn new(start: Point, end: Point, stops: &[(f64, Rgba8)]) -> Self {
        Self {
            start,
            end,
            stops: stops
                .iter()
                .map(|&(offset, color)| GradientStop { offset, color })
                .collect(),
        }
    }

    /// Color at `t` along the ramp, as straight RGBA in `[0, 255]`.
    pub fn sample(&self, t: f64) -> [f64; 4] {
        fn channels(c: Rgba8) -> [f64; 4] {
            [
                f64::from(c.r),
                f64::from(c.g),
                f64::from(c.b),
                f64::from(c.a),
            ]
        }

        let Some(first) = self.stops.first() else {
            return [0.0; 4];
        };
        if t <= first.offset {
            return channels(first.color);
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let u = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                let (ca, cb) = (channels(a.color), channels(b.color));
                return std::array::from_fn(|i| ca[i] + (cb[i] - ca[i]) * u);
            }
        }
        self.stops
            .last()
            .map(|s| channels(s.color))
            .unwrap_or([0.0; 4])
    }
}

/// A single drawing instruction. Page-sized fills cover `[0, w] x [0, h]` in
/// the instruction's own transform.
#[derive(Clone, Debug, PartialEq)]
pub enum Draw {
    /// A page bitmap stretched over the page box.
    Page {
        index: usize,
        transform: Affine,
        opacity: f32,
    },
    /// A flat color over the page box.
    Fill { color: Rgba8, transform: Affine },
    /// A gradient covering the current clip.
    Ramp(LinearRamp),
    /// A stroked open path.
    Stroke {
        path: BezPath,
        color: Rgba8,
        width: f64,
    },
}

/// An entry in a layer: either a draw under the layer's clips, or a nested
/// group with additional clips of its own.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerOp {
    Draw(Draw),
    Clipped {
        clips: SmallVec<[BezPath; 2]>,
        draws: SmallVec<[Draw; 2]>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// The unfolded current page.
    Flat,
    /// The neighbor page on the corner side, with the fold shadow.
    Revealed,
    /// The current page on the kept side.
    Kept,
    /// The mirrored back of the current page.
    CurlBack,
    /// The crease stroke.
    FoldEdge,
    /// Specular light along the kept side of the crease.
    Highlight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Clip regions intersected in order; all are in page-local coordinates.
    pub clips: SmallVec<[BezPath; 2]>,
    pub ops: SmallVec<[LayerOp; 3]>,
}

impl Layer {
    pub(crate) fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            clips: SmallVec::new(),
            ops: SmallVec::new(),
        }
    }

    pub(crate) fn clip(mut self, path: BezPath) -> Self {
        self.clips.push(path);
        self
    }

    pub(crate) fn draw(mut self, draw: Draw) -> Self {
        self.ops.push(LayerOp::Draw(draw));
        self
    }

    pub(crate) fn op(mut self, op: LayerOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Every draw in evaluation order, nested groups flattened.
    pub fn draws(&self) -> impl Iterator<Item = &Draw> {
        self.ops.iter().flat_map(|op| match op {
            LayerOp::Draw(d) => std::slice::from_ref(d).iter(),
            LayerOp::Clipped { draws, .. } => draws.iter(),
        })
    }
}

/// An ordered, fully resolved frame description.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerStack {
    pub page_box: PageBox,
    pub layers: SmallVec<[Layer; 5]>,
}

impl LayerStack {
    pub fn kinds(&self) -> impl Iterator<Item = LayerKind> + '_ {
        self.layers.iter().map(|l| l.kind)
    }
}
