use smallvec::SmallVec;

use super::*;
use crate::compose::compositor::{CurlFrame, PageSlot, compose_frame};
use crate::foundation::config::FlipbookConfig;
use crate::pages::source::PageSequence;

fn two_pages() -> PageSequence {
    [[255, 0, 0, 255], [0, 0, 255, 255]]
        .into_iter()
        .map(|rgba| PageBitmap::solid(4, 3, rgba).unwrap())
        .collect()
}

fn near(px: [u8; 4], want: [u8; 4], tol: u8) -> bool {
    px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= tol)
}

#[test]
fn flat_page_fills_surface_at_device_scale() {
    let pages = two_pages();
    let page_box = PageBox::new(40.0, 30.0, 2.0).unwrap();
    let stack = compose_frame(
        &CurlFrame::flat(page_box, PageSlot::Page(0)),
        &FlipbookConfig::default(),
    );
    let mut backend = CpuBackend::new(RenderSettings::default());
    let frame = backend.render(&stack, &pages).unwrap();
    assert_eq!((frame.width, frame.height), (80, 60));
    assert!(frame.premultiplied);
    assert!(near(frame.pixel(40, 30).unwrap(), [255, 0, 0, 255], 1));
}

#[test]
fn placeholder_uses_palette_color() {
    let cfg = FlipbookConfig::default();
    let page_box = PageBox::new(20.0, 20.0, 1.0).unwrap();
    let stack = compose_frame(&CurlFrame::flat(page_box, PageSlot::Placeholder), &cfg);
    let mut backend = CpuBackend::new(RenderSettings::default());
    let frame = backend.render(&stack, &PageSequence::default()).unwrap();
    let p = cfg.palette.placeholder;
    assert!(near(frame.pixel(10, 10).unwrap(), [p.r, p.g, p.b, 255], 2));
}

#[test]
fn clear_color_shows_through_empty_stack() {
    let stack = LayerStack {
        page_box: PageBox::new(8.0, 8.0, 1.0).unwrap(),
        layers: SmallVec::new(),
    };
    let mut backend = CpuBackend::new(RenderSettings {
        clear_rgba: Some([10, 20, 30, 255]),
    });
    let frame = backend.render(&stack, &PageSequence::default()).unwrap();
    assert!(near(frame.pixel(4, 4).unwrap(), [10, 20, 30, 255], 1));
}

#[test]
fn folded_frame_shows_kept_revealed_and_flap() {
    let pages = two_pages();
    let page_box = PageBox::new(80.0, 60.0, 1.0).unwrap();
    // Straight fold at x = 60: revealed page right of it, flap mirrored onto 40..60.
    let frame = CurlFrame::folded(
        page_box,
        PageSlot::Page(0),
        PageSlot::Page(1),
        Point::new(80.0, 60.0),
        Point::new(40.0, 60.0),
        &FlipbookConfig::default(),
    );
    let stack = compose_frame(&frame, &FlipbookConfig::default());
    let mut backend = CpuBackend::new(RenderSettings::default());
    let out = backend.render(&stack, &pages).unwrap();

    let kept = out.pixel(20, 30).unwrap();
    assert!(kept[0] > 200 && kept[1] < 10 && kept[2] < 10, "kept={kept:?}");

    let revealed = out.pixel(75, 10).unwrap();
    assert!(near(revealed, [0, 0, 255, 255], 3), "revealed={revealed:?}");

    let flap = out.pixel(50, 10).unwrap();
    assert!(flap[0] > 200 && flap[1] > 180 && flap[2] > 170, "flap={flap:?}");
}

#[test]
fn page_images_are_cached_by_bitmap_identity() {
    let pages = two_pages();
    let page_box = PageBox::new(10.0, 10.0, 1.0).unwrap();
    let stack = compose_frame(
        &CurlFrame::flat(page_box, PageSlot::Page(1)),
        &FlipbookConfig::default(),
    );
    let mut backend = CpuBackend::new(RenderSettings::default());
    backend.render(&stack, &pages).unwrap();
    backend.render(&stack, &pages).unwrap();
    assert_eq!(backend.image_cache.len(), 1);
}

#[test]
fn page_cache_is_bounded_and_clearable() {
    let pages = two_pages();
    let page_box = PageBox::new(10.0, 10.0, 1.0).unwrap();
    let cfg = FlipbookConfig::default();
    let mut backend = CpuBackend::with_cache_capacity(RenderSettings::default(), 1);

    for index in [0, 1] {
        let stack = compose_frame(&CurlFrame::flat(page_box, PageSlot::Page(index)), &cfg);
        backend.render(&stack, &pages).unwrap();
    }
    let newest = pages.page(1).unwrap().id();
    assert_eq!(backend.image_cache.len(), 1);
    assert!(backend.image_cache.contains_key(&newest));
    assert_eq!(backend.lru, [newest]);

    backend.clear_cache();
    assert!(backend.image_cache.is_empty());
    assert!(backend.lru.is_empty());
}

#[test]
fn oversized_surface_and_missing_page_are_render_errors() {
    let mut backend = CpuBackend::new(RenderSettings::default());
    let huge = LayerStack {
        page_box: PageBox::new(70_000.0, 10.0, 1.0).unwrap(),
        layers: SmallVec::new(),
    };
    let err = backend.render(&huge, &PageSequence::default()).unwrap_err();
    assert!(matches!(err, FlipbookError::Render(_)));

    let page_box = PageBox::new(10.0, 10.0, 1.0).unwrap();
    let stack = compose_frame(
        &CurlFrame::flat(page_box, PageSlot::Page(3)),
        &FlipbookConfig::default(),
    );
    let err = backend.render(&stack, &two_pages()).unwrap_err();
    assert!(matches!(err, FlipbookError::Render(_)));
}

#[test]
fn baked_ramp_is_premultiplied() {
    let ramp = LinearRamp::new(
        Point::ZERO,
        Point::new(1.0, 0.0),
        &[(0.0, Rgba8::white().with_alpha(0.5)), (1.0, Rgba8::white().with_alpha(0.5))],
    );
    let pixmap = bake_ramp(&ramp).unwrap();
    let px = &pixmap.data_as_u8_slice()[..4];
    assert_eq!(px[3], 128);
    assert_eq!(px[0], 128);
}
