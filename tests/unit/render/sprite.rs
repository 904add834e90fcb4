use std::f64::consts::FRAC_PI_2;

use kurbo::{PathEl, Shape as _};

use super::*;

fn vertices(p: &BezPath) -> Vec<Point> {
    p.elements()
        .iter()
        .filter_map(|el| match *el {
            PathEl::MoveTo(v) | PathEl::LineTo(v) => Some(v),
            _ => None,
        })
        .collect()
}

#[test]
fn triangle_points_along_heading() {
    let c = Point::new(10.0, 10.0);
    let right = vertices(&SpriteShape::Triangle.path(c, 4.0, 0.0));
    assert_eq!(right.len(), 3);
    assert!((right[0].x - 12.0).abs() < 1e-9);
    assert!((right[0].y - 10.0).abs() < 1e-9);

    // Heading +y in mask space points up on the surface.
    let up = vertices(&SpriteShape::Triangle.path(c, 4.0, FRAC_PI_2));
    assert!((up[0].x - 10.0).abs() < 1e-9);
    assert!((up[0].y - 8.0).abs() < 1e-9);
}

#[test]
fn disc_bounds_match_size() {
    let b = SpriteShape::Disc
        .path(Point::new(5.0, 5.0), 4.0, 1.0)
        .bounding_box();
    assert!((b.width() - 4.0).abs() < 0.2);
    assert!((b.center().x - 5.0).abs() < 1e-6);
}

#[test]
fn shimmer_stays_in_band() {
    for i in 0..64 {
        let t = i as f32 * 0.37;
        let s = shimmer(t, 1.3, 0.4);
        assert!((0.6 - 1e-6..=1.0 + 1e-6).contains(&s));
    }
    assert_eq!(shimmer(3.0, 0.2, 0.0), 1.0);
}
