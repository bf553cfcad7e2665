//! Application configuration read from JSON.

use serde::{Deserialize, Serialize};

use crate::contour::ContourSettings;
use crate::controls::TerrainSource;
use crate::elevation::ElevationModel;
use crate::error::{Error, Result};

/// Startup configuration. Every field has a default so partial files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Style document read at startup.
    pub style_path: String,
    /// Buildings to highlight, comma separated.
    pub building: Option<String>,
    pub terrain_source: TerrainSource,
    pub exaggeration: f64,
    pub elevation: ElevationModel,
    pub contours: ContourSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            style_path: "style.json".to_string(),
            building: None,
            terrain_source: TerrainSource::Mapterhorn,
            exaggeration: 1.0,
            elevation: ElevationModel::default(),
            contours: ContourSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &str) -> Result<Self> {
        let contents = crate::io::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::io::write_string(path, &json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.elevation;
        if e.min_elevation > e.peak_elevation {
            return Err(Error::InvalidSettings(format!(
                "min elevation {} is above peak elevation {}",
                e.min_elevation, e.peak_elevation
            )));
        }
        if !e.max_distance.is_finite() || e.max_distance <= 0.0 {
            return Err(Error::InvalidSettings("max distance must be positive".into()));
        }
        if !self.exaggeration.is_finite() || self.exaggeration < 0.0 {
            return Err(Error::InvalidSettings(
                "terrain exaggeration must be a non-negative number".into(),
            ));
        }
        self.contours.validate()
    }
}
