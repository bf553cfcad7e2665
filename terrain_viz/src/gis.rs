//! GeoJSON envelope handed to the renderer's vector data sources.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use crate::contour::{ContourFeature, ContourSettings};

/// Wraps contour rings into a `FeatureCollection`. Each ring becomes a
/// closed `LineString` feature carrying its elevation, a numeric level
/// (1 major, 0 minor) and a `major` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCollectionBuilder {
    pub elevation_key: String,
    pub level_key: String,
}

impl Default for FeatureCollectionBuilder {
    fn default() -> Self {
        Self {
            elevation_key: "ele".to_string(),
            level_key: "level".to_string(),
        }
    }
}

impl FeatureCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder using the property names configured in `settings`.
    pub fn from_settings(settings: &ContourSettings) -> Self {
        Self {
            elevation_key: settings.elevation_key.clone(),
            level_key: settings.level_key.clone(),
        }
    }

    /// Converts a single ring into a GeoJSON feature.
    pub fn feature(&self, contour: &ContourFeature) -> Feature {
        let line: geo_types::LineString<f64> = contour
            .points
            .iter()
            .map(|p| geo_types::Coord::from(*p))
            .collect();
        let mut properties = JsonObject::new();
        properties.insert(
            self.elevation_key.clone(),
            JsonValue::from(contour.level.elevation),
        );
        properties.insert(
            self.level_key.clone(),
            JsonValue::from(u8::from(contour.level.is_major)),
        );
        properties.insert("major".to_string(), JsonValue::from(contour.level.is_major));
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    pub fn build(&self, contours: &[ContourFeature]) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: contours.iter().map(|c| self.feature(c)).collect(),
            foreign_members: None,
        }
    }
}

/// Empty collection, used to clear a source without removing it.
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// Pretty printed GeoJSON text for `collection`.
pub fn to_string_pretty(collection: &FeatureCollection) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}
