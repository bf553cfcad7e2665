//! Named camera positions around the Matterhorn.

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::map::MapSurface;

/// Camera target for a `fly_to` animation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    pub center: Point,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration_ms: u32,
}

/// A camera with a human readable name.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    pub key: &'static str,
    pub name: &'static str,
    pub camera: Camera,
}

fn camera(lon: f64, lat: f64, zoom: f64, pitch: f64, bearing: f64) -> Camera {
    Camera {
        center: Point::new(lon, lat),
        zoom,
        pitch,
        bearing,
        duration_ms: 3000,
    }
}

static VIEWPOINTS: Lazy<Vec<Viewpoint>> = Lazy::new(|| {
    vec![
        Viewpoint {
            key: "summit",
            name: "Matterhorn Summit",
            camera: camera(7.7462, 45.9763, 15.0, 75.0, 25.0),
        },
        Viewpoint {
            key: "zermatt",
            name: "Zermatt Valley",
            camera: camera(7.7461, 46.0278, 13.0, 50.0, 180.0),
        },
        Viewpoint {
            key: "overview",
            name: "Regional Overview",
            camera: camera(7.7461, 46.0382, 10.0, 45.0, 0.0),
        },
        Viewpoint {
            key: "glacier",
            name: "Glacier View",
            camera: camera(7.7580, 45.9850, 14.0, 60.0, 90.0),
        },
    ]
});

/// All predefined viewpoints.
pub fn viewpoints() -> &'static [Viewpoint] {
    &VIEWPOINTS
}

pub fn viewpoint(key: &str) -> Result<&'static Viewpoint> {
    VIEWPOINTS
        .iter()
        .find(|v| v.key == key)
        .ok_or_else(|| Error::UnknownViewpoint(key.to_string()))
}

/// Initial camera of the page.
pub fn default_view() -> Camera {
    Camera {
        center: Point::new(7.7461, 46.0382),
        zoom: 12.0,
        pitch: 60.0,
        bearing: 0.0,
        duration_ms: 2000,
    }
}

pub fn fly_to_viewpoint<M: MapSurface + ?Sized>(map: &mut M, key: &str) -> Result<()> {
    let vp = viewpoint(key)?;
    log::info!("Flying to {}", vp.name);
    map.fly_to(&vp.camera);
    Ok(())
}

pub fn reset_view<M: MapSurface + ?Sized>(map: &mut M) {
    map.fly_to(&default_view());
}
