//! Per-class geometric regularization of traced polygons

use crate::domain::{
    LabeledContour, Point, Rect, ShapeClass, perimeter, polygon_area, prune_short_edges,
    simplify_polygon, simplify_polyline,
};

/// Window boxes are snapped when width/height falls strictly inside this range
pub const WINDOW_ASPECT_RANGE: (f32, f32) = (0.4, 2.5);
/// and polygon area / bounding box area exceeds this
pub const WINDOW_MIN_FILL: f32 = 0.5;
/// Simplification tolerance for trim and roof, as a fraction of perimeter
pub const COARSE_TOLERANCE: f32 = 0.05;
/// Simplification tolerance for doors and unrecognized classes
pub const FINE_TOLERANCE: f32 = 0.005;
/// Roof vertices closer than this to their successor are dropped
pub const ROOF_MIN_EDGE: f32 = 10.0;

/// Apply the class-specific policy to a traced closed boundary.
///
/// Returns `None` when the result would violate the contour's structural
/// minimum (too few points).
pub fn regularize(label: &str, traced: &[Point]) -> Option<LabeledContour> {
    let class = ShapeClass::of(label);
    let perim = perimeter(traced, true);

    let (points, closed) = match class {
        ShapeClass::Window => match window_rectangle(traced) {
            Some(rect) => (rect.corners().to_vec(), true),
            None => (simplify_polygon(traced, FINE_TOLERANCE * perim), true),
        },
        ShapeClass::Trim => (simplify_polyline(traced, COARSE_TOLERANCE * perim), false),
        ShapeClass::Roof => {
            let simplified = simplify_polygon(traced, COARSE_TOLERANCE * perim);
            (prune_short_edges(&simplified, ROOF_MIN_EDGE, true, 3), true)
        }
        ShapeClass::Other => (simplify_polygon(traced, FINE_TOLERANCE * perim), true),
    };

    let contour = LabeledContour::new(points, label, closed);
    if contour.is_valid() {
        Some(contour)
    } else {
        log::debug!(
            "Dropping degenerate {} contour with {} points",
            label,
            contour.points.len()
        );
        None
    }
}

/// Bounding rectangle of a boxy polygon, `None` if the polygon is not boxy
fn window_rectangle(traced: &[Point]) -> Option<Rect> {
    let rect = Rect::bounding(traced)?;
    let (w, h) = (rect.width(), rect.height());
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let aspect = w / h;
    let fill = polygon_area(traced) / (w * h);
    let (lo, hi) = WINDOW_ASPECT_RANGE;
    (aspect > lo && aspect < hi && fill > WINDOW_MIN_FILL).then_some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f32, f32)], step: f32) -> Vec<Point> {
        // densify the polygon edges so simplification has something to do
        let mut out = Vec::new();
        for i in 0..points.len() {
            let a = Point::from(points[i]);
            let b = Point::from(points[(i + 1) % points.len()]);
            let n = (a.distance(b) / step).ceil().max(1.0) as usize;
            for k in 0..n {
                let t = k as f32 / n as f32;
                out.push(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
            }
        }
        out
    }

    #[test]
    fn test_boxy_window_becomes_bounding_rectangle() {
        let traced = ring(&[(10.0, 10.0), (60.0, 12.0), (58.0, 60.0), (11.0, 58.0)], 1.0);
        let c = regularize("window", &traced).unwrap();
        assert!(c.closed);
        assert_eq!(c.points, Rect::bounding(&traced).unwrap().corners().to_vec());
    }

    #[test]
    fn test_elongated_window_is_not_snapped() {
        // aspect 10:1 falls outside the window range
        let traced = ring(&[(0.0, 0.0), (200.0, 0.0), (200.0, 20.0), (0.0, 20.0)], 1.0);
        let c = regularize("Window", &traced).unwrap();
        assert!(c.closed);
        assert_eq!(c.points.len(), 4);
        assert_eq!(polygon_area(&c.points), 4000.0);
    }

    #[test]
    fn test_sparse_window_is_not_snapped() {
        // a thin L shape: boxy aspect, but fills well under half its bounds
        let traced = ring(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 90.0), (100.0, 90.0), (100.0, 100.0), (0.0, 100.0)],
            1.0,
        );
        let c = regularize("window", &traced).unwrap();
        assert_eq!(c.points.len(), 6);
    }

    #[test]
    fn test_trim_is_open() {
        let traced = ring(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)], 1.0);
        let c = regularize("trim", &traced).unwrap();
        assert!(!c.closed);
        assert!(c.points.len() >= 2);
    }

    #[test]
    fn test_roof_has_no_short_edges() {
        // noisy notch in the base
        let traced = ring(
            &[(0.0, 100.0), (100.0, 0.0), (200.0, 100.0), (104.0, 100.0), (100.0, 103.0), (96.0, 100.0)],
            1.0,
        );
        let c = regularize("roof", &traced).unwrap();
        assert!(c.closed);
        let n = c.points.len();
        assert!(n >= 3);
        for i in 0..n {
            assert!(c.points[i].distance(c.points[(i + 1) % n]) >= ROOF_MIN_EDGE);
        }
    }

    #[test]
    fn test_door_keeps_fine_detail() {
        let traced = ring(&[(0.0, 0.0), (40.0, 0.0), (40.0, 80.0), (22.0, 80.0), (20.0, 77.0), (18.0, 80.0), (0.0, 80.0)], 1.0);
        let c = regularize("door", &traced).unwrap();
        assert!(c.closed);
        // a 3px notch survives 0.5% tolerance (perimeter ~ 242, tolerance ~ 1.2)
        assert!(c.points.contains(&Point::new(20.0, 77.0)));
    }

    #[test]
    fn test_degenerate_polygon_is_dropped() {
        let traced = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0), Point::new(30.0, 0.0)];
        assert!(regularize("door", &traced).is_none());
    }
}
