use super::Point;

/// Axis aligned west/south/east/north rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Square region extending `half_extent` degrees from `center` on each side.
    pub fn around(center: Point, half_extent: f64) -> Self {
        Self::new(
            center.x - half_extent,
            center.y - half_extent,
            center.x + half_extent,
            center.y + half_extent,
        )
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn centroid(&self) -> Point {
        Point::new((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Returns `true` if `p` lies inside or on the edge of the region.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.west && p.x <= self.east && p.y >= self.south && p.y <= self.north
    }

    /// Smallest region containing all `points`, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            b.west = b.west.min(p.x);
            b.east = b.east.max(p.x);
            b.south = b.south.min(p.y);
            b.north = b.north.max(p.y);
        }
        Some(b)
    }

    /// A region is usable for sampling when every edge is finite and it has
    /// positive width and height.
    pub fn is_valid(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }
}
