//! Basic planar geometry on longitude/latitude pairs.

mod bounds;

pub use bounds::Bounds;

/// Representation of a 2D point. `x` is longitude and `y` is latitude, both
/// in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.x
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.y
    }
}

impl From<Point> for geo_types::Coord<f64> {
    fn from(p: Point) -> Self {
        geo_types::Coord { x: p.x, y: p.y }
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point::new(v.0, v.1)
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Angle of `p` around `origin` in radians, in `(-π, π]`.
pub fn polar_angle(p: Point, origin: Point) -> f64 {
    (p.y - origin.y).atan2(p.x - origin.x)
}

/// Returns `true` if the ring has at least two points and its last point
/// equals its first.
pub fn is_closed(ring: &[Point]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first == last,
        _ => false,
    }
}

/// Appends the first point to the ring unless it is already closed.
pub fn close_ring(ring: &mut Vec<Point>) {
    if ring.is_empty() || is_closed(ring) {
        return;
    }
    let first = ring[0];
    ring.push(first);
}

/// Calculates the area of a simple polygon using the shoelace formula.
/// A closing duplicate vertex contributes nothing.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        sum += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    sum.abs() * 0.5
}

/// Applies Chaikin corner cutting to a closed ring. The result is closed
/// again. Rings with fewer than three distinct vertices are returned as is.
pub fn smooth_ring(ring: &[Point], iterations: usize) -> Vec<Point> {
    let mut pts: Vec<Point> = if is_closed(ring) {
        ring[..ring.len() - 1].to_vec()
    } else {
        ring.to_vec()
    };
    if pts.len() < 3 {
        return ring.to_vec();
    }
    for _ in 0..iterations {
        let mut next = Vec::with_capacity(pts.len() * 2);
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            next.push(Point::new(0.75 * a.x + 0.25 * b.x, 0.75 * a.y + 0.25 * b.y));
            next.push(Point::new(0.25 * a.x + 0.75 * b.x, 0.25 * a.y + 0.75 * b.y));
        }
        pts = next;
    }
    close_ring(&mut pts);
    pts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_area_square() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((polygon_area(&pts) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn polar_angle_quadrants() {
        let o = Point::new(1.0, 1.0);
        assert!(polar_angle(Point::new(2.0, 1.0), o).abs() < 1e-12);
        let up = polar_angle(Point::new(1.0, 2.0), o);
        assert!((up - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(polar_angle(Point::new(1.0, 0.0), o) < 0.0);
    }

    #[test]
    fn close_ring_is_idempotent() {
        let mut ring = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        assert!(!is_closed(&ring));
        close_ring(&mut ring);
        close_ring(&mut ring);
        assert_eq!(ring.len(), 4);
        assert!(is_closed(&ring));
    }

    #[test]
    fn single_point_is_not_closed() {
        assert!(!is_closed(&[Point::new(3.0, 4.0)]));
        assert!(!is_closed(&[]));
    }

    #[test]
    fn chaikin_keeps_ring_closed() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
        ];
        let smoothed = smooth_ring(&ring, 2);
        // 4 corners -> 8 -> 16 vertices, plus the closing point
        assert_eq!(smoothed.len(), 17);
        assert!(is_closed(&smoothed));
        assert!(polygon_area(&smoothed) < 1.0);
    }
}
