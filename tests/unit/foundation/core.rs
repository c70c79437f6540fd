use super::*;

#[test]
fn fit_desktop_is_height_limited() {
    let layout = LayoutConfig::default();
    // 1440 * 0.85 = 1224 wide would need ~1731 tall; 900 * 0.82 = 738 caps it.
    let b = PageBox::fit(1440.0, 900.0, 21.0 / 29.7, 1.0, &layout).unwrap();
    assert_eq!(b.width, (738.0 * 21.0 / 29.7_f64).round());
    assert_eq!(b.height, (b.width / (21.0 / 29.7)).round());
}

#[test]
fn fit_mobile_uses_wider_fraction_and_min_width() {
    let layout = LayoutConfig::default();
    let b = PageBox::fit(400.0, 4000.0, 0.5, 2.0, &layout).unwrap();
    assert_eq!(b.width, 372.0);
    assert_eq!(b.height, 744.0);
    assert_eq!(b.surface_size(), (744, 1488));

    let tiny = PageBox::fit(100.0, 100.0, 1.0, 1.0, &layout).unwrap();
    assert_eq!(tiny.width, 260.0);
    assert_eq!(tiny.height, 260.0);
}

#[test]
fn rejects_degenerate_boxes() {
    assert!(PageBox::new(0.0, 10.0, 1.0).is_err());
    assert!(PageBox::new(10.0, f64::NAN, 1.0).is_err());
    assert!(PageBox::new(10.0, 10.0, 0.0).is_err());
    assert!(PageBox::fit(800.0, 600.0, 0.0, 1.0, &LayoutConfig::default()).is_err());
}

#[test]
fn to_page_local_scales_by_on_screen_rect() {
    let b = PageBox::new(800.0, 600.0, 2.0).unwrap();
    let on_screen = Rect::new(100.0, 50.0, 500.0, 350.0);
    let p = b.to_page_local(Point::new(300.0, 200.0), on_screen);
    assert_eq!(p, Point::new(400.0, 300.0));
}

#[test]
fn straight_to_premul() {
    let c = Rgba8::black().with_alpha(0.5);
    assert_eq!(c.a, 128);
    assert_eq!(Rgba8::white().with_alpha(0.0).to_premul(), Rgba8Premul::transparent());
    let p = Rgba8 { r: 200, g: 100, b: 0, a: 128 }.to_premul();
    assert_eq!(p.r, ((200u16 * 128 + 127) / 255) as u8);
}
