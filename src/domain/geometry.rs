//! Geometric primitives and polygon utilities
//!
//! All coordinates are image pixel coordinates of the original (working)
//! image, never display coordinates.

/// A point in image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a point set
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Bounding box of the given points, `None` for an empty slice
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let init = Rect {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        Some(points.iter().skip(1).fold(init, |r, p| Rect {
            left: r.left.min(p.x),
            top: r.top.min(p.y),
            right: r.right.max(p.x),
            bottom: r.bottom.max(p.y),
        }))
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }
}

/// Absolute polygon area via the shoelace formula
pub fn polygon_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64
        })
        .sum();
    (twice / 2.0).abs() as f32
}

/// Total length of a polyline, including the closing edge when `closed`
pub fn perimeter(points: &[Point], closed: bool) -> f32 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if closed {
        open + points[points.len() - 1].distance(points[0])
    } else {
        open
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Whether `p` lies inside or on the boundary of the polygon.
///
/// The polygon is treated as closed regardless of how it is rendered.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 2 {
        return false;
    }
    for i in 0..n {
        if distance_to_segment(p, polygon[i], polygon[(i + 1) % n]) <= 1e-3 {
            return true;
        }
    }
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the infinite line through `a` and `b`
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// Douglas-Peucker simplification of an open polyline.
///
/// Both endpoints are always kept.
pub fn simplify_polyline(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dist = 0.0f32;
        let mut max_idx = start;
        for i in start + 1..end {
            let d = perpendicular_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }
        if max_dist > epsilon {
            keep[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Douglas-Peucker simplification of a closed polygon.
///
/// The ring is split at the first point and the point farthest from it, and
/// both halves are simplified as open polylines.
pub fn simplify_polygon(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let anchor = points[0];
    let (far_idx, _) = points
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0f32), |(best_i, best_d), (i, p)| {
            let d = anchor.distance(*p);
            if d > best_d { (i, d) } else { (best_i, best_d) }
        });
    if far_idx == 0 {
        return vec![anchor];
    }

    let first_half = simplify_polyline(&points[..=far_idx], epsilon);
    let mut second: Vec<Point> = points[far_idx..].to_vec();
    second.push(anchor);
    let second_half = simplify_polyline(&second, epsilon);

    let mut out = first_half;
    // second half starts at the far point and ends at the anchor, both already present
    out.extend_from_slice(&second_half[1..second_half.len() - 1]);
    out
}

/// Drop vertices closer than `min_len` to their successor.
///
/// For closed rings the last vertex's successor is the first. Pruning stops
/// once `min_points` vertices remain.
pub fn prune_short_edges(points: &[Point], min_len: f32, closed: bool, min_points: usize) -> Vec<Point> {
    let mut out = points.to_vec();
    let mut i = 0;
    while i < out.len() && out.len() > min_points {
        let next = if i + 1 < out.len() {
            i + 1
        } else if closed {
            0
        } else {
            break;
        };
        if out[i].distance(out[next]) < min_len {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_polygon_area_is_orientation_independent() {
        let mut sq = square(10.0);
        assert_eq!(polygon_area(&sq), 100.0);
        sq.reverse();
        assert_eq!(polygon_area(&sq), 100.0);
        assert_eq!(polygon_area(&sq[..2]), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(10.0);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &sq));
        assert!(point_in_polygon(Point::new(10.0, 5.0), &sq), "boundary counts as inside");
        assert!(point_in_polygon(Point::new(0.0, 0.0), &sq));
        assert!(!point_in_polygon(Point::new(10.5, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(-1.0, -1.0), &sq));
    }

    #[test]
    fn test_bounding_rect() {
        let pts = [Point::new(3.0, 7.0), Point::new(-2.0, 4.0), Point::new(8.0, 1.0)];
        let r = Rect::bounding(&pts).unwrap();
        assert_eq!(r, Rect { left: -2.0, top: 1.0, right: 8.0, bottom: 7.0 });
        assert_eq!(r.width(), 10.0);
        assert_eq!(r.height(), 6.0);
        assert!(Rect::bounding(&[]).is_none());
    }

    #[test]
    fn test_simplify_polyline_removes_collinear_points() {
        let line: Vec<Point> = (0..=10).map(|i| Point::new(i as f32, 0.0)).collect();
        let simplified = simplify_polyline(&line, 0.5);
        assert_eq!(simplified, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn test_simplify_polyline_keeps_corner() {
        let mut pts: Vec<Point> = (0..=10).map(|i| Point::new(i as f32, 0.0)).collect();
        pts.extend((1..=10).map(|i| Point::new(10.0, i as f32)));
        let simplified = simplify_polyline(&pts, 0.5);
        assert_eq!(
            simplified,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
    }

    #[test]
    fn test_simplify_polygon_densely_sampled_square() {
        let mut ring = Vec::new();
        for i in 0..20 {
            ring.push(Point::new(i as f32, 0.0));
        }
        for i in 0..20 {
            ring.push(Point::new(20.0, i as f32));
        }
        for i in 0..20 {
            ring.push(Point::new(20.0 - i as f32, 20.0));
        }
        for i in 0..20 {
            ring.push(Point::new(0.0, 20.0 - i as f32));
        }
        let simplified = simplify_polygon(&ring, 1.0);
        assert_eq!(simplified.len(), 4);
        for corner in square(20.0) {
            assert!(simplified.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn test_prune_short_edges_closed() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ];
        let pruned = prune_short_edges(&pts, 10.0, true, 3);
        assert_eq!(pruned.len(), 4);
        assert!(!pruned.contains(&Point::new(0.0, 0.0)));
        for w in pruned.windows(2) {
            assert!(w[0].distance(w[1]) >= 10.0);
        }
    }

    #[test]
    fn test_prune_short_edges_respects_minimum() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        assert_eq!(prune_short_edges(&pts, 10.0, true, 3), pts);
    }
}
