#![forbid(unsafe_code)]

pub mod animation;
pub mod audio;
pub mod compose;
pub mod foundation;
pub mod geometry;
pub mod interact;
pub mod pages;
pub mod render;

pub use animation::ease::Ease;
pub use animation::scheduler::{AnimationKind, FrameClock, Motion, Tween, TweenStep};
pub use audio::cue::{
    CollectingSink, CueBuffer, CueSink, FlipCuePlayer, synthesize_flip_cue, write_cue_f32le,
};
pub use compose::compositor::{CurlFrame, FoldFrame, PageSlot, compose_frame};
pub use compose::layers::{Draw, Layer, LayerKind, LayerOp, LayerStack, LinearRamp};
pub use foundation::config::FlipbookConfig;
pub use foundation::core::{Affine, BezPath, PageBox, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use foundation::error::{FlipbookError, FlipbookResult};
pub use geometry::fold::{
    FoldGeometry, FoldSide, compute_fold, constrain_pointer, curvature_for, progress_for,
    reflect_across_fold,
};
pub use interact::controller::{Flipbook, Gesture, Phase, Tick};
pub use interact::input::{Cursor, FlipDirection, NavKey, NavStatus};
pub use interact::session::FlipbookSession;
pub use pages::source::{PageBitmap, PageSequence, PageSource, decode_page, load_page_dir};
pub use render::backend::{BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend};
pub use render::cpu::CpuBackend;
