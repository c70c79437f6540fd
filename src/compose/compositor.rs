//! Five-layer page curl compositing.

use smallvec::smallvec;

use crate::compose::layers::{Draw, Layer, LayerKind, LayerOp, LayerStack, LinearRamp};
use crate::foundation::config::{CurlConfig, FlipbookConfig, PaletteConfig};
use crate::foundation::core::{Affine, BezPath, PageBox, Point, Rgba8};
use crate::geometry::fold::{
    FoldGeometry, FoldSide, compute_fold, constrain_pointer, curvature_for, fold_extent,
    progress_for,
};

/// A page reference that may fall outside the page sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSlot {
    Page(usize),
    Placeholder,
}

impl PageSlot {
    pub fn resolve(index: isize, page_count: usize) -> Self {
        match usize::try_from(index) {
            Ok(i) if i < page_count => Self::Page(i),
            _ => Self::Placeholder,
        }
    }
}

/// Fold state for one frame, derived from the gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoldFrame {
    pub geometry: FoldGeometry,
    pub progress: f64,
    pub curvature: f64,
    pub revealed: PageSlot,
}

/// Everything the compositor needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurlFrame {
    pub page_box: PageBox,
    pub current: PageSlot,
    /// `None` renders the current page flat.
    pub fold: Option<FoldFrame>,
}

impl CurlFrame {
    pub fn flat(page_box: PageBox, current: PageSlot) -> Self {
        Self {
            page_box,
            current,
            fold: None,
        }
    }

    /// Run the geometry path for a corner/pointer pair: clamp the pointer,
    /// compute the fold, then derive progress and curvature. A degenerate fold
    /// yields a flat frame.
    pub fn folded(
        page_box: PageBox,
        current: PageSlot,
        revealed: PageSlot,
        corner: Point,
        pointer: Point,
        cfg: &FlipbookConfig,
    ) -> Self {
        let (w, h) = (page_box.width, page_box.height);
        let clamped = constrain_pointer(corner, pointer, w, h, cfg.gesture.clamp_margin);
        let fold = compute_fold(corner, clamped).map(|geometry| FoldFrame {
            geometry,
            progress: progress_for(geometry.distance, w, h),
            curvature: curvature_for(geometry.distance, w, h, cfg.curl.curvature_scale),
            revealed,
        });
        Self {
            page_box,
            current,
            fold,
        }
    }

    pub fn progress(&self) -> f64 {
        self.fold.map(|f| f.progress).unwrap_or(0.0)
    }
}

const SHADOW_MAX_WIDTH: f64 = 70.0;
const SHADOW_MIN_WIDTH: f64 = 2.0;
const SHADOW_MAX_ALPHA: f64 = 0.45;
const GHOST_OPACITY: f32 = 0.05;
const CURL_MIN_LENGTH: f64 = 20.0;
const EDGE_MIN_PROGRESS: f64 = 0.01;
const EDGE_MAX_ALPHA: f64 = 0.3;
const EDGE_MAX_WIDTH: f64 = 1.8;
const HIGHLIGHT_MIN_PROGRESS: f64 = 0.015;
const HIGHLIGHT_MAX_LENGTH: f64 = 25.0;
const HIGHLIGHT_MAX_ALPHA: f64 = 0.14;

/// Compose a frame into an ordered layer stack.
///
/// The result depends only on `frame` and `cfg`, so composing the same frame
/// twice yields identical stacks.
pub fn compose_frame(frame: &CurlFrame, cfg: &FlipbookConfig) -> LayerStack {
    let palette = &cfg.palette;
    let Some(fold) = frame.fold else {
        return LayerStack {
            page_box: frame.page_box,
            layers: smallvec![
                Layer::new(LayerKind::Flat).draw(page_draw(
                    frame.current,
                    Affine::IDENTITY,
                    1.0,
                    palette
                ))
            ],
        };
    };

    let clip = ClipSet::new(frame.page_box, &fold, &cfg.curl);
    let mut layers = smallvec![
        revealed_layer(frame, &fold, &clip, palette),
        kept_layer(frame, &clip, palette),
        curl_back_layer(frame, &fold, &clip, palette),
    ];
    if let Some(layer) = fold_edge_layer(&fold, &clip, palette) {
        layers.push(layer);
    }
    if let Some(layer) = highlight_layer(frame, &fold, &clip) {
        layers.push(layer);
    }
    LayerStack {
        page_box: frame.page_box,
        layers,
    }
}

/// Clip paths shared by several layers of one frame.
struct ClipSet {
    page: BezPath,
    corner_side: BezPath,
    kept_side: BezPath,
    boundary: BezPath,
}

impl ClipSet {
    fn new(page_box: PageBox, fold: &FoldFrame, curl: &CurlConfig) -> Self {
        let ext = fold_extent(page_box.width, page_box.height);
        let g = &fold.geometry;
        let cv = fold.curvature;
        let th = curl.curve_threshold;
        Self {
            page: rect_path(page_box),
            corner_side: g.half_plane(FoldSide::Corner, cv, ext, th),
            kept_side: g.half_plane(FoldSide::Kept, cv, ext, th),
            boundary: g.boundary(cv, ext, th),
        }
    }
}

fn rect_path(page_box: PageBox) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((page_box.width, 0.0));
    p.line_to((page_box.width, page_box.height));
    p.line_to((0.0, page_box.height));
    p.close_path();
    p
}

fn page_draw(slot: PageSlot, transform: Affine, opacity: f32, palette: &PaletteConfig) -> Draw {
    match slot {
        PageSlot::Page(index) => Draw::Page {
            index,
            transform,
            opacity,
        },
        PageSlot::Placeholder => Draw::Fill {
            color: palette.placeholder,
            transform,
        },
    }
}

fn revealed_layer(
    frame: &CurlFrame,
    fold: &FoldFrame,
    clip: &ClipSet,
    palette: &PaletteConfig,
) -> Layer {
    let g = &fold.geometry;
    let pr = fold.progress;
    let mut layer = Layer::new(LayerKind::Revealed)
        .clip(clip.page.clone())
        .clip(clip.corner_side.clone())
        .draw(page_draw(fold.revealed, Affine::IDENTITY, 1.0, palette));

    let width = SHADOW_MAX_WIDTH.min(frame.page_box.width * pr * 0.25);
    if width > SHADOW_MIN_WIDTH {
        let alpha = SHADOW_MAX_ALPHA.min(pr * 0.55);
        let black = Rgba8::black();
        layer = layer.draw(Draw::Ramp(LinearRamp::new(
            g.midpoint + g.normal,
            g.midpoint + g.normal * width,
            &[
                (0.0, black.with_alpha(alpha)),
                (0.35, black.with_alpha(alpha * 0.35)),
                (1.0, black.with_alpha(0.0)),
            ],
        )));
    }
    layer
}

fn kept_layer(frame: &CurlFrame, clip: &ClipSet, palette: &PaletteConfig) -> Layer {
    Layer::new(LayerKind::Kept)
        .clip(clip.page.clone())
        .clip(clip.kept_side.clone())
        .draw(page_draw(frame.current, Affine::IDENTITY, 1.0, palette))
}

fn curl_back_layer(
    frame: &CurlFrame,
    fold: &FoldFrame,
    clip: &ClipSet,
    palette: &PaletteConfig,
) -> Layer {
    let g = &fold.geometry;
    let mirror = g.reflection();

    // The flap is the corner-side part of the page, mirrored onto the kept side.
    let flap = LayerOp::Clipped {
        clips: smallvec![mirror * clip.page.clone(), mirror * clip.corner_side.clone()],
        draws: smallvec![
            Draw::Fill {
                color: palette.paper_back,
                transform: mirror,
            },
            page_draw(frame.current, mirror, GHOST_OPACITY, palette),
        ],
    };

    let length = CURL_MIN_LENGTH.max(g.distance * 0.5);
    let (black, white) = (Rgba8::black(), Rgba8::white());
    let thickness = LinearRamp::new(
        g.midpoint - g.normal,
        g.midpoint - g.normal * length,
        &[
            (0.0, black.with_alpha(0.2)),
            (0.1, white.with_alpha(0.06)),
            (0.3, black.with_alpha(0.04)),
            (0.7, white.with_alpha(0.02)),
            (1.0, black.with_alpha(0.1)),
        ],
    );

    Layer::new(LayerKind::CurlBack)
        .clip(clip.page.clone())
        .clip(clip.kept_side.clone())
        .op(flap)
        .draw(Draw::Ramp(thickness))
}

fn fold_edge_layer(fold: &FoldFrame, clip: &ClipSet, palette: &PaletteConfig) -> Option<Layer> {
    let pr = fold.progress;
    if pr <= EDGE_MIN_PROGRESS {
        return None;
    }
    Some(
        Layer::new(LayerKind::FoldEdge)
            .clip(clip.page.clone())
            .draw(Draw::Stroke {
                path: clip.boundary.clone(),
                color: palette.fold_edge.with_alpha(EDGE_MAX_ALPHA.min(pr * 0.4)),
                width: EDGE_MAX_WIDTH.min(pr * 2.5),
            }),
    )
}

fn highlight_layer(frame: &CurlFrame, fold: &FoldFrame, clip: &ClipSet) -> Option<Layer> {
    let pr = fold.progress;
    if pr <= HIGHLIGHT_MIN_PROGRESS {
        return None;
    }
    let g = &fold.geometry;
    let length = HIGHLIGHT_MAX_LENGTH.min(frame.page_box.width * pr * 0.12);
    let white = Rgba8::white();
    Some(
        Layer::new(LayerKind::Highlight)
            .clip(clip.page.clone())
            .clip(clip.kept_side.clone())
            .draw(Draw::Ramp(LinearRamp::new(
                g.midpoint - g.normal,
                g.midpoint - g.normal * length,
                &[
                    (0.0, white.with_alpha(HIGHLIGHT_MAX_ALPHA.min(pr * 0.18))),
                    (1.0, white.with_alpha(0.0)),
                ],
            ))),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
