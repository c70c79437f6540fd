use super::*;

fn page_box() -> PageBox {
    PageBox::new(800.0, 600.0, 1.0).unwrap()
}

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn clock_is_monotonic_and_clamped() {
    let mut clock = FrameClock::new(1000.0, 100.0);
    assert_eq!(clock.advance(900.0), 0.0);
    assert_eq!(clock.advance(1050.0), 0.5);
    assert_eq!(clock.advance(1020.0), 0.5);
    assert_eq!(clock.advance(5000.0), 1.0);
    assert_eq!(clock.advance(f64::NAN), 1.0);

    let mut zero = FrameClock::new(0.0, 0.0);
    assert_eq!(zero.advance(0.0), 1.0);
}

#[test]
fn complete_flip_targets_past_opposite_edge() {
    let cfg = AnimationConfig::default();
    let corner = Point::new(800.0, 600.0);
    let mut tw = Tween::complete_flip(
        Point::new(350.0, 600.0),
        corner,
        FlipDirection::Next,
        page_box(),
        &cfg,
        0.0,
    );
    assert_eq!(tw.kind, AnimationKind::CompleteFlip);

    let mid = tw.step(240.0);
    assert!(!mid.finished);
    // 1 - 0.5^3 = 0.875 of the way from 350 to -280
    assert!((mid.pointer.x - (350.0 + (-280.0 - 350.0) * 0.875)).abs() < 1e-9);

    let end = tw.step(480.0);
    assert!(end.finished);
    assert!(close(end.pointer, Point::new(-280.0, 600.0)));

    let left = Tween::complete_flip(
        Point::new(10.0, 0.0),
        Point::ZERO,
        FlipDirection::Previous,
        page_box(),
        &cfg,
        0.0,
    );
    match left.motion {
        Motion::Eased { to, .. } => assert!(close(to, Point::new(1080.0, 0.0))),
        other => panic!("unexpected motion {other:?}"),
    }
}

#[test]
fn snap_back_returns_to_corner() {
    let cfg = AnimationConfig::default();
    let corner = Point::new(800.0, 600.0);
    let mut tw = Tween::snap_back(Point::new(780.0, 600.0), corner, &cfg, 10.0);
    assert!(!tw.step(100.0).finished);
    let end = tw.step(330.0);
    assert!(end.finished);
    assert!(close(end.pointer, corner));
    assert!(close(tw.current(), corner));
}

#[test]
fn hint_reaches_peak_at_split_and_returns() {
    let cfg = AnimationConfig::default();
    let corner = Point::new(800.0, 600.0);
    let mut tw = Tween::hint_peek(corner, page_box(), &cfg, 0.0);
    let peak = tw.step(900.0 * 0.45);
    assert!(close(peak.pointer, Point::new(624.0, 492.0)));
    let end = tw.step(900.0);
    assert!(end.finished);
    assert!(close(end.pointer, corner));
}

#[test]
fn every_frame_stays_between_endpoints() {
    let cfg = AnimationConfig::default();
    let from = Point::new(350.0, 600.0);
    let mut tw = Tween::complete_flip(
        from,
        Point::new(800.0, 600.0),
        FlipDirection::Next,
        page_box(),
        &cfg,
        0.0,
    );
    let mut prev_x = from.x;
    let mut now = 0.0;
    loop {
        now += 16.0;
        let s = tw.step(now);
        assert!(s.pointer.x <= prev_x + 1e-9);
        assert!(s.pointer.x >= -280.0 - 1e-9);
        prev_x = s.pointer.x;
        if s.finished {
            break;
        }
    }
    assert!(now <= 496.0);
}

#[test]
fn complete_flip_target_follows_direction_not_corner() {
    let cfg = AnimationConfig::default();
    // Corner left inside a larger box still flips toward the left edge.
    let big = PageBox::new(1_312.0, 984.0, 1.0).unwrap();
    let next = Tween::complete_flip(
        Point::new(350.0, 600.0),
        Point::new(800.0, 600.0),
        FlipDirection::Next,
        big,
        &cfg,
        0.0,
    );
    match next.motion {
        Motion::Eased { to, .. } => assert!(to.x < 0.0, "to={to:?}"),
        other => panic!("unexpected motion {other:?}"),
    }
}

#[test]
fn rescaled_tween_keeps_progress() {
    let cfg = AnimationConfig::default();
    let mut tw = Tween::complete_flip(
        Point::new(350.0, 600.0),
        Point::new(800.0, 600.0),
        FlipDirection::Next,
        page_box(),
        &cfg,
        0.0,
    );
    let before = tw.step(240.0);
    let mut scaled = tw.rescaled(2.0, 0.5);
    assert!(close(scaled.current(), Point::new(before.pointer.x * 2.0, 300.0)));
    let end = scaled.step(480.0);
    assert!(end.finished);
    assert!(close(end.pointer, Point::new(-560.0, 300.0)));
}
