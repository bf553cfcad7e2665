//! Closed-form elevation model centred on the Matterhorn summit.
//!
//! No raster data is read: elevation falls off linearly with the
//! (latitude-corrected) planar distance from a single peak and a small
//! sinusoidal term adds roughness. The result is always clamped to
//! `[min_elevation, peak_elevation]`.

use crate::geometry::Point;

/// Anything that can answer "how high is the ground at (lon, lat)".
pub trait ElevationSource {
    fn estimate(&self, lon: f64, lat: f64) -> f64;

    fn estimate_at(&self, p: Point) -> f64 {
        self.estimate(p.x, p.y)
    }
}

/// Parameters of the synthetic single-peak surface.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ElevationModel {
    /// Summit position (lon/lat degrees).
    pub peak: Point,
    /// Elevation at the summit in meters.
    pub peak_elevation: f64,
    /// Floor elevation reached at `max_distance` and beyond.
    pub min_elevation: f64,
    /// Distance from the summit, in corrected degrees, at which the floor is reached.
    pub max_distance: f64,
    /// Angular frequency `k` of the roughness term `sin(lon·k)·cos(lat·k)`.
    pub roughness_frequency: f64,
    /// Amplitude of the roughness term in meters.
    pub roughness_amplitude: f64,
}

impl ElevationModel {
    pub const MATTERHORN_SUMMIT: Point = Point {
        x: 7.7462,
        y: 45.9763,
    };

    /// Distance from the summit with the longitude delta scaled by
    /// `cos(latitude)`.
    pub fn distance_from_peak(&self, lon: f64, lat: f64) -> f64 {
        let dx = (lon - self.peak.x) * lat.to_radians().cos();
        let dy = lat - self.peak.y;
        dx.hypot(dy)
    }

    /// Roughness term, bounded by `±roughness_amplitude`.
    pub fn roughness(&self, lon: f64, lat: f64) -> f64 {
        let k = self.roughness_frequency;
        (lon * k).sin() * (lat * k).cos() * self.roughness_amplitude
    }
}

impl Default for ElevationModel {
    fn default() -> Self {
        Self {
            peak: Self::MATTERHORN_SUMMIT,
            peak_elevation: 4478.0,
            min_elevation: 1600.0,
            max_distance: 0.15,
            roughness_frequency: 20.0,
            roughness_amplitude: 50.0,
        }
    }
}

impl ElevationSource for ElevationModel {
    fn estimate(&self, lon: f64, lat: f64) -> f64 {
        let t = if self.max_distance > 0.0 {
            (self.distance_from_peak(lon, lat) / self.max_distance).min(1.0)
        } else {
            1.0
        };
        let base = self.peak_elevation - (self.peak_elevation - self.min_elevation) * t;
        let elevation = base + self.roughness(lon, lat);
        // NaN collapses to the floor
        elevation.max(self.min_elevation).min(self.peak_elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summit_is_peak_elevation() {
        let model = ElevationModel::default();
        let z = model.estimate(7.7462, 45.9763);
        assert_eq!(z, 4478.0);
    }

    #[test]
    fn estimate_is_deterministic() {
        let model = ElevationModel::default();
        for &(lon, lat) in &[(7.70, 45.95), (7.81, 46.02), (-120.0, 10.0)] {
            assert_eq!(model.estimate(lon, lat), model.estimate(lon, lat));
        }
    }

    #[test]
    fn estimate_is_bounded() {
        let model = ElevationModel::default();
        let mut lon = -180.0;
        while lon <= 180.0 {
            let mut lat = -89.5;
            while lat <= 89.5 {
                let z = model.estimate(lon, lat);
                assert!(z >= model.min_elevation && z <= model.peak_elevation);
                lat += 7.3;
            }
            lon += 3.1;
        }
        // dense sweep around the summit where the roughness term matters
        for i in 0..200 {
            for j in 0..200 {
                let lon = 7.6 + i as f64 * 0.0015;
                let lat = 45.83 + j as f64 * 0.0015;
                let z = model.estimate(lon, lat);
                assert!(z >= model.min_elevation && z <= model.peak_elevation);
            }
        }
    }

    #[test]
    fn far_away_is_floor() {
        let model = ElevationModel::default();
        // beyond max_distance only the roughness term can lift the floor
        let z = model.estimate(9.0, 47.0);
        assert!(z >= model.min_elevation);
        assert!(z <= model.min_elevation + model.roughness_amplitude);
    }

    #[test]
    fn roughness_is_bounded_by_amplitude() {
        let model = ElevationModel::default();
        for i in 0..1000 {
            let v = i as f64 * 0.37;
            assert!(model.roughness(v, -v).abs() <= model.roughness_amplitude);
        }
    }

    #[test]
    fn non_finite_input_is_still_bounded() {
        let model = ElevationModel::default();
        let z = model.estimate(f64::NAN, 45.0);
        assert!(z >= model.min_elevation && z <= model.peak_elevation);
    }
}
