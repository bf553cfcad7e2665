//! Approximate contour rings over an [`ElevationSource`].
//!
//! Two strategies are provided. [`GridContourExtractor`] samples a lattice
//! inside a region, keeps the samples close to the target elevation and
//! orders them by angle around the region centre. [`RadialContourGenerator`]
//! ignores elevation entirely and draws a perturbed circle per level.
//!
//! Angle ordering does not produce a simple polygon for concave or
//! multi-part iso-lines; the rings are meant for display only.

use std::f64::consts::TAU;

use log::{debug, warn};

use crate::elevation::ElevationSource;
use crate::error::{Error, Result};
use crate::geometry::{close_ring, polar_angle, polygon_area, smooth_ring, Bounds, Point};

/// Fewest retained samples from which the grid extractor builds a ring.
pub const MIN_RING_SAMPLES: usize = 4;

/// Contour elevation and whether it falls on the emphasised interval.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContourLevel {
    pub elevation: f64,
    pub is_major: bool,
}

impl ContourLevel {
    pub fn new(elevation: f64, major_interval: f64) -> Self {
        Self {
            elevation,
            is_major: is_major(elevation, major_interval),
        }
    }
}

/// `true` when `elevation` is a whole multiple of `major_interval`.
pub fn is_major(elevation: f64, major_interval: f64) -> bool {
    major_interval > 0.0 && elevation % major_interval == 0.0
}

/// A closed ring tagged with its contour level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourFeature {
    pub level: ContourLevel,
    /// Ring vertices; the last point repeats the first.
    pub points: Vec<Point>,
}

impl ContourFeature {
    /// Number of distinct vertices, i.e. the ring without its closing point.
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// `false` for zero, negatives and NaN.
fn is_positive(v: f64) -> bool {
    v > 0.0
}

/// Upper bound on the number of levels a single request may produce.
pub const MAX_LEVELS: usize = 10_000;

/// Levels that are whole multiples of `interval` inside `[min, max]`,
/// highest first. Empty for a non-positive interval or an inverted range;
/// an error when the range holds more than [`MAX_LEVELS`] levels.
pub fn contour_levels(min: f64, max: f64, interval: f64) -> Result<Vec<f64>> {
    if !is_positive(interval) || !min.is_finite() || !max.is_finite() || min > max {
        return Ok(Vec::new());
    }
    let lo = (min / interval).ceil();
    let hi = (max / interval).floor();
    if hi - lo + 1.0 > MAX_LEVELS as f64 {
        return Err(Error::InvalidSettings(format!(
            "more than {MAX_LEVELS} contour levels between {min} and {max} at interval {interval}"
        )));
    }
    Ok((lo as i64..=hi as i64).rev().map(|k| k as f64 * interval).collect())
}

/// Sampling strategy used by [`generate_contours`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourVariant {
    #[default]
    Grid,
    Radial,
}

impl std::str::FromStr for ContourVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(ContourVariant::Grid),
            "radial" => Ok(ContourVariant::Radial),
            other => Err(Error::InvalidSettings(format!("unknown contour variant `{other}`"))),
        }
    }
}

/// Samples an `(N+1)×(N+1)` lattice and keeps points near the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridContourExtractor {
    pub grid_size: usize,
    pub tolerance: f64,
    pub major_interval: f64,
}

impl Default for GridContourExtractor {
    fn default() -> Self {
        Self {
            grid_size: 50,
            tolerance: 50.0,
            major_interval: 500.0,
        }
    }
}

impl GridContourExtractor {
    /// Lattice points whose estimated elevation lies strictly within
    /// `tolerance` of `target_elevation`, in row-major order.
    pub fn matching_samples<S: ElevationSource>(
        &self,
        source: &S,
        target_elevation: f64,
        bounds: Bounds,
    ) -> Vec<Point> {
        let n = self.grid_size.max(1);
        let step_x = bounds.width() / n as f64;
        let step_y = bounds.height() / n as f64;
        let mut kept = Vec::new();
        for i in 0..=n {
            let lon = bounds.west + step_x * i as f64;
            for j in 0..=n {
                let lat = bounds.south + step_y * j as f64;
                let z = source.estimate(lon, lat);
                if (z - target_elevation).abs() < self.tolerance {
                    kept.push(Point::new(lon, lat));
                }
            }
        }
        kept
    }

    /// Builds a ring for `target_elevation` or `None` when fewer than
    /// [`MIN_RING_SAMPLES`] samples match.
    pub fn extract<S: ElevationSource>(
        &self,
        source: &S,
        target_elevation: f64,
        bounds: Bounds,
    ) -> Option<ContourFeature> {
        if !bounds.is_valid() {
            warn!("Skipping {target_elevation} m contour: invalid bounds {bounds:?}");
            return None;
        }
        let samples = self.matching_samples(source, target_elevation, bounds);
        if samples.len() < MIN_RING_SAMPLES {
            warn!(
                "Not enough points for {} m contour ({} found)",
                target_elevation,
                samples.len()
            );
            return None;
        }
        let center = bounds.centroid();
        let mut keyed: Vec<(f64, Point)> = samples
            .into_iter()
            .map(|p| (polar_angle(p, center), p))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut points: Vec<Point> = keyed.into_iter().map(|(_, p)| p).collect();
        close_ring(&mut points);
        debug!(
            "{} m contour built from {} samples, enclosing {:.6} deg²",
            target_elevation,
            points.len() - 1,
            polygon_area(&points)
        );
        Some(ContourFeature {
            level: ContourLevel::new(target_elevation, self.major_interval),
            points,
        })
    }
}

/// Draws one perturbed circle per level without sampling elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialContourGenerator {
    /// Distinct vertices per ring.
    pub samples: usize,
    /// Radius of the first level, in degrees.
    pub base_radius: f64,
    /// Radius added per level index.
    pub radius_step: f64,
    /// Amplitude of the `sin(4θ)` radius wobble.
    pub perturbation: f64,
    pub major_interval: f64,
}

impl Default for RadialContourGenerator {
    fn default() -> Self {
        Self {
            samples: 64,
            base_radius: 0.005,
            radius_step: 0.003,
            perturbation: 0.0005,
            major_interval: 500.0,
        }
    }
}

impl RadialContourGenerator {
    /// Radius assigned to the level at `index`.
    pub fn radius_for(&self, index: usize) -> f64 {
        self.base_radius + index as f64 * self.radius_step
    }

    /// Ring for a single level at position `index` in the level list.
    pub fn ring(&self, index: usize, center: Point) -> Vec<Point> {
        let r = self.radius_for(index);
        let mut points: Vec<Point> = (0..self.samples)
            .map(|k| {
                let angle = TAU * k as f64 / self.samples as f64;
                let radius = r + (angle * 4.0).sin() * self.perturbation;
                Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        close_ring(&mut points);
        points
    }

    /// One feature per level; earlier levels get smaller radii.
    pub fn generate(&self, levels: &[f64], center: Point) -> Vec<ContourFeature> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &elevation)| ContourFeature {
                level: ContourLevel::new(elevation, self.major_interval),
                points: self.ring(i, center),
            })
            .collect()
    }
}

/// Contour generation parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    pub variant: ContourVariant,
    pub min_level: f64,
    pub max_level: f64,
    pub interval: f64,
    pub major_interval: f64,
    pub grid_size: usize,
    pub tolerance: f64,
    pub bounds: Bounds,
    pub center: Point,
    pub samples: usize,
    pub base_radius: f64,
    pub radius_step: f64,
    pub perturbation: f64,
    /// Chaikin iterations applied to every ring, 0 disables smoothing.
    pub smoothing: usize,
    /// Feature property holding the elevation.
    pub elevation_key: String,
    /// Feature property holding 1 for major and 0 for minor lines.
    pub level_key: String,
}

impl Default for ContourSettings {
    fn default() -> Self {
        let summit = crate::elevation::ElevationModel::MATTERHORN_SUMMIT;
        Self {
            variant: ContourVariant::Grid,
            min_level: 2000.0,
            max_level: 4400.0,
            interval: 100.0,
            major_interval: 500.0,
            grid_size: 50,
            tolerance: 50.0,
            bounds: Bounds::around(summit, 0.12),
            center: summit,
            samples: 64,
            base_radius: 0.005,
            radius_step: 0.003,
            perturbation: 0.0005,
            smoothing: 0,
            elevation_key: "ele".to_string(),
            level_key: "level".to_string(),
        }
    }
}

impl ContourSettings {
    /// Rejects settings that cannot produce meaningful rings.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.interval) {
            return Err(Error::InvalidSettings("interval must be positive".into()));
        }
        if !is_positive(self.major_interval) {
            return Err(Error::InvalidSettings("major interval must be positive".into()));
        }
        if self.min_level > self.max_level {
            return Err(Error::InvalidSettings(format!(
                "min level {} is above max level {}",
                self.min_level, self.max_level
            )));
        }
        self.levels()?;
        match self.variant {
            ContourVariant::Grid => {
                if self.grid_size == 0 {
                    return Err(Error::InvalidSettings("grid size must be at least 1".into()));
                }
                if !is_positive(self.tolerance) {
                    return Err(Error::InvalidSettings("tolerance must be positive".into()));
                }
                if !self.bounds.is_valid() {
                    return Err(Error::InvalidSettings(format!(
                        "bounds {:?} are empty",
                        self.bounds
                    )));
                }
            }
            ContourVariant::Radial => {
                if self.samples < 3 {
                    return Err(Error::InvalidSettings("a ring needs at least 3 samples".into()));
                }
                if !is_positive(self.base_radius) || self.radius_step < 0.0 {
                    return Err(Error::InvalidSettings("radii must be positive".into()));
                }
            }
        }
        Ok(())
    }

    pub fn levels(&self) -> Result<Vec<f64>> {
        contour_levels(self.min_level, self.max_level, self.interval)
    }

    pub fn grid_extractor(&self) -> GridContourExtractor {
        GridContourExtractor {
            grid_size: self.grid_size,
            tolerance: self.tolerance,
            major_interval: self.major_interval,
        }
    }

    pub fn radial_generator(&self) -> RadialContourGenerator {
        RadialContourGenerator {
            samples: self.samples,
            base_radius: self.base_radius,
            radius_step: self.radius_step,
            perturbation: self.perturbation,
            major_interval: self.major_interval,
        }
    }
}

/// Rebuilds the full contour set for `settings`. Levels that yield no ring
/// are logged and omitted.
pub fn generate_contours<S: ElevationSource>(
    settings: &ContourSettings,
    source: &S,
) -> Result<Vec<ContourFeature>> {
    settings.validate()?;
    let levels = settings.levels()?;
    let mut features = match settings.variant {
        ContourVariant::Grid => {
            let extractor = settings.grid_extractor();
            levels
                .iter()
                .filter_map(|&level| extractor.extract(source, level, settings.bounds))
                .collect()
        }
        ContourVariant::Radial => settings.radial_generator().generate(&levels, settings.center),
    };
    if settings.smoothing > 0 {
        for f in &mut features {
            f.points = smooth_ring(&f.points, settings.smoothing);
        }
    }
    debug!(
        "Generated {} of {} contour levels ({:?})",
        features.len(),
        levels.len(),
        settings.variant
    );
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevation::ElevationModel;
    use crate::geometry::is_closed;

    /// Flat surface used to check the filtering independently of the model.
    struct Flat(f64);

    impl ElevationSource for Flat {
        fn estimate(&self, _lon: f64, _lat: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn levels_are_descending_multiples() {
        assert_eq!(
            contour_levels(1950.0, 2310.0, 100.0).unwrap(),
            vec![2300.0, 2200.0, 2100.0, 2000.0]
        );
        assert_eq!(contour_levels(0.0, 0.0, 100.0).unwrap(), vec![0.0]);
        assert!(contour_levels(10.0, 5.0, 1.0).unwrap().is_empty());
        assert!(contour_levels(0.0, 10.0, 0.0).unwrap().is_empty());
        assert!(contour_levels(0.0, 10.0, f64::NAN).unwrap().is_empty());
    }

    #[test]
    fn oversized_level_range_is_rejected() {
        assert!(matches!(
            contour_levels(0.0, 1e8, 1.0),
            Err(Error::InvalidSettings(_))
        ));
        assert!(contour_levels(0.0, 1e12, 1.0).is_err());
        assert_eq!(contour_levels(0.0, 9_999.0, 1.0).unwrap().len(), MAX_LEVELS);
        let settings = ContourSettings {
            min_level: 0.0,
            max_level: 1e9,
            interval: 1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn major_flag_follows_interval() {
        assert!(ContourLevel::new(2500.0, 500.0).is_major);
        assert!(ContourLevel::new(0.0, 500.0).is_major);
        assert!(!ContourLevel::new(2600.0, 500.0).is_major);
        assert!(!is_major(1000.0, 0.0));
    }

    #[test]
    fn grid_extract_far_target_is_none() {
        let model = ElevationModel::default();
        let bounds = Bounds::around(model.peak, 0.12);
        let extractor = GridContourExtractor::default();
        assert!(extractor.extract(&model, 100_000.0, bounds).is_none());
    }

    #[test]
    fn grid_extract_at_centroid_is_closed_ring() {
        let model = ElevationModel::default();
        let bounds = Bounds::around(model.peak, 0.05);
        let target = model.estimate_at(bounds.centroid());
        let f = GridContourExtractor::default()
            .extract(&model, target, bounds)
            .expect("centroid elevation should produce a ring");
        assert!(f.points.len() >= MIN_RING_SAMPLES + 1);
        assert_eq!(f.points.first(), f.points.last());
        assert_eq!(f.level.elevation, target);
    }

    #[test]
    fn grid_ring_is_angle_sorted() {
        let model = ElevationModel::default();
        let bounds = Bounds::around(model.peak, 0.12);
        let f = GridContourExtractor::default()
            .extract(&model, 3000.0, bounds)
            .unwrap();
        let c = bounds.centroid();
        let angles: Vec<f64> = f.points[..f.points.len() - 1]
            .iter()
            .map(|p| polar_angle(*p, c))
            .collect();
        assert!(angles.windows(2).all(|w| w[0] <= w[1]));
        assert!(f.points.iter().all(|p| bounds.contains(*p)));
        assert!(polygon_area(&f.points) > 0.0);
        assert!(f.level.is_major);
    }

    #[test]
    fn grid_needs_four_points() {
        // a 1x1 grid has exactly four lattice points
        let extractor = GridContourExtractor {
            grid_size: 1,
            ..Default::default()
        };
        let bounds = Bounds::new(0.0, 0.0, 1.0, 1.0);
        let f = extractor.extract(&Flat(100.0), 100.0, bounds).unwrap();
        assert_eq!(f.vertex_count(), 4);
        assert!(extractor.extract(&Flat(100.0), 150.0, bounds).is_none());
        // tolerance is strict
        assert!(extractor.extract(&Flat(100.0), 50.0, bounds).is_none());
    }

    #[test]
    fn grid_rejects_degenerate_bounds() {
        let extractor = GridContourExtractor::default();
        let bounds = Bounds::new(1.0, 1.0, 1.0, 1.0);
        assert!(extractor.extract(&Flat(0.0), 0.0, bounds).is_none());
    }

    #[test]
    fn radial_rings_have_configured_vertex_count() {
        let gen = RadialContourGenerator::default();
        let center = ElevationModel::MATTERHORN_SUMMIT;
        let levels = contour_levels(2000.0, 4400.0, 100.0).unwrap();
        let features = gen.generate(&levels, center);
        assert_eq!(features.len(), levels.len());
        for f in &features {
            assert_eq!(f.vertex_count(), 64);
            assert!(is_closed(&f.points));
            assert_eq!(f.level.is_major, f.level.elevation % 500.0 == 0.0);
        }
    }

    #[test]
    fn radial_first_level_is_smallest() {
        let gen = RadialContourGenerator {
            perturbation: 0.0,
            ..Default::default()
        };
        let center = Point::new(0.0, 0.0);
        let features = gen.generate(&[3000.0, 2000.0], center);
        let r0 = crate::geometry::distance(features[0].points[0], center);
        let r1 = crate::geometry::distance(features[1].points[0], center);
        assert!((r0 - 0.005).abs() < 1e-12);
        assert!((r1 - 0.008).abs() < 1e-12);
    }

    #[test]
    fn radial_perturbation_is_bounded() {
        let gen = RadialContourGenerator::default();
        let center = Point::new(7.0, 46.0);
        for p in gen.ring(2, center) {
            let d = crate::geometry::distance(p, center);
            assert!((d - gen.radius_for(2)).abs() <= gen.perturbation + 1e-12);
        }
    }

    #[test]
    fn generate_default_grid_set() {
        let settings = ContourSettings::default();
        let features = generate_contours(&settings, &ElevationModel::default()).unwrap();
        assert!(!features.is_empty());
        for f in &features {
            assert!(f.points.len() >= MIN_RING_SAMPLES + 1);
            assert!(is_closed(&f.points));
        }
    }

    #[test]
    fn generate_with_smoothing_keeps_closure() {
        let settings = ContourSettings {
            variant: ContourVariant::Radial,
            smoothing: 1,
            ..Default::default()
        };
        let features = generate_contours(&settings, &ElevationModel::default()).unwrap();
        for f in &features {
            assert_eq!(f.vertex_count(), 128);
            assert!(is_closed(&f.points));
        }
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = ContourSettings {
            interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            generate_contours(&settings, &ElevationModel::default()),
            Err(Error::InvalidSettings(_))
        ));
        let settings = ContourSettings {
            variant: ContourVariant::Radial,
            samples: 2,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn variant_from_str() {
        assert_eq!("Radial".parse::<ContourVariant>().unwrap(), ContourVariant::Radial);
        assert!("marching".parse::<ContourVariant>().is_err());
    }
}
