use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fold_vectors_are_unit_and_perpendicular() {
    let corner = Point::new(800.0, 600.0);
    for pointer in [
        Point::new(350.0, 600.0),
        Point::new(799.0, 600.0),
        Point::new(-200.0, -40.0),
        Point::new(812.5, 13.25),
        Point::new(0.0, 0.0),
    ] {
        let f = compute_fold(corner, pointer).unwrap();
        assert!(approx(f.direction.hypot(), 1.0));
        assert!(approx(f.normal.hypot(), 1.0));
        assert!(approx(f.direction.dot(f.normal), 0.0));
        assert!(approx(f.distance, (pointer - corner).hypot()));
        assert_eq!(f.midpoint, corner.midpoint(pointer));
    }
}

#[test]
fn normal_points_back_towards_corner() {
    let corner = Point::new(800.0, 600.0);
    let f = compute_fold(corner, Point::new(350.0, 600.0)).unwrap();
    assert!((corner - f.midpoint).dot(f.normal) > 0.0);
    assert_eq!(f.normal, Vec2::new(1.0, 0.0));
    assert_eq!(f.direction, Vec2::new(0.0, -1.0));
}

#[test]
fn degenerate_fold_is_none() {
    let c = Point::new(10.0, 10.0);
    assert!(compute_fold(c, c).is_none());
    assert!(compute_fold(c, Point::new(10.5, 10.5)).is_none());
    assert!(compute_fold(c, Point::new(f64::NAN, 0.0)).is_none());
    assert!(compute_fold(c, Point::new(11.0, 10.0)).is_some());
}

#[test]
fn constrain_keeps_midpoint_within_margin() {
    let (w, h, m) = (800.0, 600.0, 30.0);
    let corners = [
        Point::new(w, h),
        Point::new(w, 0.0),
        Point::new(0.0, h),
        Point::new(0.0, 0.0),
    ];
    let mut pointers = Vec::new();
    for ix in -6..=6 {
        for iy in -6..=6 {
            pointers.push(Point::new(f64::from(ix) * 250.0, f64::from(iy) * 250.0));
        }
    }
    for corner in corners {
        for &pointer in &pointers {
            let out = constrain_pointer(corner, pointer, w, h, m);
            let mid = corner.midpoint(out);
            assert!(mid.x >= -m - 1e-9 && mid.x <= w + m + 1e-9, "{mid:?}");
            assert!(mid.y >= -m - 1e-9 && mid.y <= h + m + 1e-9, "{mid:?}");
        }
    }
}

#[test]
fn constrain_lands_exactly_on_margin() {
    let corner = Point::new(800.0, 600.0);
    let out = constrain_pointer(corner, Point::new(-2000.0, 600.0), 800.0, 600.0, 30.0);
    assert_eq!(out, Point::new(-860.0, 600.0));
    assert_eq!(corner.midpoint(out).x, -30.0);

    let inside = Point::new(400.0, 300.0);
    assert_eq!(constrain_pointer(corner, inside, 800.0, 600.0, 30.0), inside);
}

#[test]
fn curvature_is_zero_at_extremes_and_peaks_mid() {
    let (w, h) = (800.0, 600.0);
    let diag = 1000.0;
    assert_eq!(curvature_for(0.0, w, h, 0.06), 0.0);
    assert_eq!(curvature_for(diag, w, h, 0.06), 0.0);
    assert_eq!(curvature_for(diag * 3.0, w, h, 0.06), 0.0);

    let peak = curvature_for(diag * 0.5, w, h, 0.06);
    assert!(approx(peak, w * 0.06));

    let mut prev = 0.0;
    let mut rising = true;
    for i in 1..100 {
        let c = curvature_for(diag * f64::from(i) / 100.0, w, h, 0.06);
        assert!(c > 0.0);
        if rising && c < prev {
            rising = false;
            assert!(i > 50);
        }
        if !rising {
            assert!(c <= prev);
        }
        prev = c;
    }
}

#[test]
fn progress_clamps() {
    assert_eq!(progress_for(450.0, 800.0, 600.0), 0.45);
    assert_eq!(progress_for(5000.0, 800.0, 600.0), 1.0);
    assert_eq!(progress_for(10.0, 0.0, 0.0), 0.0);
}

#[test]
fn reflection_maps_corner_to_pointer_and_fixes_fold_line() {
    let corner = Point::new(800.0, 600.0);
    let pointer = Point::new(420.0, 380.0);
    let f = compute_fold(corner, pointer).unwrap();
    let r = f.reflection();

    let mapped = r * corner;
    assert!(approx(mapped.x, pointer.x) && approx(mapped.y, pointer.y));

    let on_line = f.midpoint + f.direction * 123.0;
    let fixed = r * on_line;
    assert!(approx(fixed.x, on_line.x) && approx(fixed.y, on_line.y));

    let twice = r * (r * Point::new(17.0, -3.0));
    assert!(approx(twice.x, 17.0) && approx(twice.y, -3.0));
}

#[test]
fn half_planes_split_corner_and_pointer() {
    use kurbo::Shape as _;

    let corner = Point::new(800.0, 600.0);
    let pointer = Point::new(350.0, 600.0);
    let f = compute_fold(corner, pointer).unwrap();
    let ext = fold_extent(800.0, 600.0);

    let corner_side = f.half_plane(FoldSide::Corner, 0.0, ext, 0.5);
    let kept_side = f.half_plane(FoldSide::Kept, 0.0, ext, 0.5);
    assert!(corner_side.contains(Point::new(790.0, 590.0)));
    assert!(!corner_side.contains(Point::new(360.0, 590.0)));
    assert!(kept_side.contains(Point::new(360.0, 590.0)));
    assert!(!kept_side.contains(Point::new(790.0, 590.0)));
}

#[test]
fn boundary_curves_only_above_threshold() {
    use kurbo::PathEl;

    let f = compute_fold(Point::new(800.0, 600.0), Point::new(300.0, 300.0)).unwrap();
    let straight = f.boundary(0.4, 2800.0, 0.5);
    assert!(matches!(straight.elements()[1], PathEl::LineTo(_)));
    let curved = f.boundary(20.0, 2800.0, 0.5);
    match curved.elements()[1] {
        PathEl::QuadTo(c, _) => {
            let expected = f.midpoint - f.normal * 20.0;
            assert!(approx(c.x, expected.x) && approx(c.y, expected.y));
        }
        ref other => panic!("expected quad, got {other:?}"),
    }
}
