//! Render surface capability and an in-memory implementation.
//!
//! [`MapSurface`] is the only way the rest of the crate talks to a renderer.
//! [`HeadlessMap`] keeps sources, layers, terrain and camera in memory and
//! answers feature queries from its GeoJSON sources, which is enough to
//! drive the application logic without a GPU.

use std::collections::BTreeMap;

use geojson::{FeatureCollection, JsonObject};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point};
use crate::layers::{LayerSpec, LayerStack};
use crate::style::StyleDocument;
use crate::viewpoints::Camera;

/// Packing of elevation into raster-dem tile pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemEncoding {
    Terrarium,
    Mapbox,
}

/// Data source definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceSpec {
    Vector {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    RasterDem {
        url: String,
        #[serde(rename = "tileSize", default = "default_tile_size")]
        tile_size: u32,
        encoding: DemEncoding,
    },
    Geojson {
        data: FeatureCollection,
    },
}

fn default_tile_size() -> u32 {
    512
}

impl SourceSpec {
    pub fn geojson(data: FeatureCollection) -> Self {
        SourceSpec::Geojson { data }
    }

    pub fn raster_dem(url: &str, encoding: DemEncoding) -> Self {
        SourceSpec::RasterDem {
            url: url.to_string(),
            tile_size: default_tile_size(),
            encoding,
        }
    }

    pub fn is_raster_dem(&self) -> bool {
        matches!(self, SourceSpec::RasterDem { .. })
    }

    /// Inline features of a GeoJSON source.
    pub fn data(&self) -> Option<&FeatureCollection> {
        match self {
            SourceSpec::Geojson { data } => Some(data),
            _ => None,
        }
    }
}

/// 3D terrain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub source: String,
    pub exaggeration: f64,
}

impl TerrainSpec {
    pub fn new(source: &str, exaggeration: f64) -> Self {
        Self {
            source: source.to_string(),
            exaggeration,
        }
    }
}

/// Feature returned by a point query.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer_id: String,
    pub source_id: String,
    pub source_layer: Option<String>,
    pub geometry_type: &'static str,
    pub properties: JsonObject,
}

/// Capabilities the application needs from a map renderer.
pub trait MapSurface {
    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()>;
    fn get_source(&self, id: &str) -> Option<&SourceSpec>;
    /// Replaces the features of a GeoJSON source.
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;
    fn remove_source(&mut self, id: &str) -> Result<()>;

    /// Adds `layer` below `before_id`, or on top when `None`.
    fn add_layer(&mut self, layer: LayerSpec, before_id: Option<&str>) -> Result<()>;
    fn get_layer(&self, id: &str) -> Option<&LayerSpec>;
    fn remove_layer(&mut self, id: &str) -> Result<()>;
    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;
    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()>;

    /// `None` turns 3D terrain off.
    fn set_terrain(&mut self, terrain: Option<TerrainSpec>);
    fn terrain(&self) -> Option<&TerrainSpec>;

    fn fly_to(&mut self, camera: &Camera);
    fn query_rendered_features(&self, point: Point) -> Vec<RenderedFeature>;

    fn has_source(&self, id: &str) -> bool {
        self.get_source(id).is_some()
    }

    fn has_layer(&self, id: &str) -> bool {
        self.get_layer(id).is_some()
    }
}

/// In-memory [`MapSurface`].
#[derive(Debug, Default, Clone)]
pub struct HeadlessMap {
    sources: BTreeMap<String, SourceSpec>,
    layers: LayerStack,
    terrain: Option<TerrainSpec>,
    camera: Option<Camera>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map initialised with the sources, layers and terrain of `style`.
    pub fn from_style(style: &StyleDocument) -> Self {
        Self {
            sources: style.sources.clone(),
            layers: LayerStack::from_layers(style.layers.clone()),
            terrain: style.terrain.clone(),
            camera: None,
        }
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(|k| k.as_str())
    }

    /// Last camera passed to `fly_to`.
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec> {
        self.layers
            .layer_mut(id)
            .ok_or_else(|| Error::UnknownLayer(id.to_string()))
    }
}

impl MapSurface for HeadlessMap {
    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(Error::DuplicateSource(id.to_string()));
        }
        debug!("Source added: {id}");
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn get_source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        match self.sources.get_mut(id) {
            Some(SourceSpec::Geojson { data: current }) => {
                debug!("Source {id} updated with {} features", data.features.len());
                *current = data;
                Ok(())
            }
            Some(_) => Err(Error::NotGeoJsonSource(id.to_string())),
            None => Err(Error::UnknownSource(id.to_string())),
        }
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        if let Some(layer) = self
            .layers
            .iter()
            .find(|l| l.source.as_deref() == Some(id))
        {
            return Err(Error::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .map(|_| debug!("Source removed: {id}"))
            .ok_or_else(|| Error::UnknownSource(id.to_string()))
    }

    fn add_layer(&mut self, layer: LayerSpec, before_id: Option<&str>) -> Result<()> {
        if let Some(source) = &layer.source {
            if !self.sources.contains_key(source) {
                return Err(Error::UnknownSource(source.clone()));
            }
        }
        let id = layer.id.clone();
        self.layers.insert(layer, before_id)?;
        debug!("Layer added: {id}");
        Ok(())
    }

    fn get_layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.layer(id)
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.layers
            .remove(id)
            .map(|_| debug!("Layer removed: {id}"))
            .ok_or_else(|| Error::UnknownLayer(id.to_string()))
    }

    fn set_layout_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        debug!("Setting {layer_id} {name} to {value}");
        self.layer_mut(layer_id)?.layout.insert(name.to_string(), value);
        Ok(())
    }

    fn set_paint_property(&mut self, layer_id: &str, name: &str, value: Value) -> Result<()> {
        debug!("Setting {layer_id} {name} to {value}");
        self.layer_mut(layer_id)?.paint.insert(name.to_string(), value);
        Ok(())
    }

    fn set_terrain(&mut self, terrain: Option<TerrainSpec>) {
        debug!("Terrain set: {terrain:?}");
        self.terrain = terrain;
    }

    fn terrain(&self) -> Option<&TerrainSpec> {
        self.terrain.as_ref()
    }

    fn fly_to(&mut self, camera: &Camera) {
        self.camera = Some(camera.clone());
    }

    fn query_rendered_features(&self, point: Point) -> Vec<RenderedFeature> {
        let mut hits = Vec::new();
        // topmost layer first
        for layer in self.layers.iter().rev().filter(|l| l.is_visible()) {
            let Some(source_id) = &layer.source else {
                continue;
            };
            let Some(data) = self.sources.get(source_id).and_then(SourceSpec::data) else {
                continue;
            };
            for feature in &data.features {
                let Some(geometry) = &feature.geometry else {
                    continue;
                };
                let hit = geometry_bounds(&geometry.value).is_some_and(|b| b.contains(point));
                if hit && layer_filter_matches(layer, feature) {
                    hits.push(RenderedFeature {
                        layer_id: layer.id.clone(),
                        source_id: source_id.clone(),
                        source_layer: layer.source_layer.clone(),
                        geometry_type: geometry_type(&geometry.value),
                        properties: feature.properties.clone().unwrap_or_default(),
                    });
                }
            }
        }
        hits
    }
}

/// Evaluates the `["==", key, value]` filter form used for contour layers.
/// Other filter forms are treated as matching.
fn layer_filter_matches(layer: &LayerSpec, feature: &geojson::Feature) -> bool {
    let Some(Value::Array(filter)) = &layer.filter else {
        return true;
    };
    match filter.as_slice() {
        [Value::String(op), Value::String(key), expected] if op == "==" && !key.starts_with('$') => {
            feature.property(key) == Some(expected)
        }
        _ => true,
    }
}

fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn positions_bounds<'a>(positions: impl Iterator<Item = &'a Vec<f64>>) -> Option<Bounds> {
    let pts: Vec<Point> = positions
        .filter(|p| p.len() >= 2)
        .map(|p| Point::new(p[0], p[1]))
        .collect();
    Bounds::enclosing(&pts)
}

fn merge(a: Option<Bounds>, b: Option<Bounds>) -> Option<Bounds> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Bounds::new(
            a.west.min(b.west),
            a.south.min(b.south),
            a.east.max(b.east),
            a.north.max(b.north),
        )),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Bounding box of a GeoJSON geometry.
pub fn geometry_bounds(value: &geojson::Value) -> Option<Bounds> {
    use geojson::Value as V;
    match value {
        V::Point(p) => positions_bounds(std::iter::once(p)),
        V::MultiPoint(ps) | V::LineString(ps) => positions_bounds(ps.iter()),
        V::MultiLineString(lines) | V::Polygon(lines) => positions_bounds(lines.iter().flatten()),
        V::MultiPolygon(polys) => positions_bounds(polys.iter().flatten().flatten()),
        V::GeometryCollection(geoms) => geoms
            .iter()
            .map(|g| geometry_bounds(&g.value))
            .fold(None, merge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gis::{empty_collection, FeatureCollectionBuilder};
    use crate::layers::LayerKind;
    use crate::contour::{ContourFeature, ContourLevel};
    use serde_json::json;

    fn ring(level: f64, half: f64) -> ContourFeature {
        ContourFeature {
            level: ContourLevel::new(level, 500.0),
            points: vec![
                Point::new(-half, -half),
                Point::new(half, -half),
                Point::new(half, half),
                Point::new(-half, half),
                Point::new(-half, -half),
            ],
        }
    }

    #[test]
    fn source_lifecycle() {
        let mut map = HeadlessMap::new();
        map.add_source("contours", SourceSpec::geojson(empty_collection()))
            .unwrap();
        assert!(matches!(
            map.add_source("contours", SourceSpec::geojson(empty_collection())),
            Err(Error::DuplicateSource(_))
        ));
        let fc = FeatureCollectionBuilder::new().build(&[ring(2500.0, 1.0)]);
        map.set_source_data("contours", fc).unwrap();
        assert_eq!(map.get_source("contours").unwrap().data().unwrap().features.len(), 1);
        map.remove_source("contours").unwrap();
        assert!(!map.has_source("contours"));
        assert!(matches!(
            map.set_source_data("contours", empty_collection()),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn set_data_on_dem_source_fails() {
        let mut map = HeadlessMap::new();
        map.add_source("dem", SourceSpec::raster_dem("https://x", DemEncoding::Terrarium))
            .unwrap();
        assert!(matches!(
            map.set_source_data("dem", empty_collection()),
            Err(Error::NotGeoJsonSource(_))
        ));
    }

    #[test]
    fn layer_needs_existing_source_and_blocks_removal() {
        let mut map = HeadlessMap::new();
        let layer = LayerSpec::new("lines", LayerKind::Line).with_source("contours");
        assert!(matches!(
            map.add_layer(layer.clone(), None),
            Err(Error::UnknownSource(_))
        ));
        map.add_source("contours", SourceSpec::geojson(empty_collection()))
            .unwrap();
        map.add_layer(layer, None).unwrap();
        assert!(matches!(
            map.remove_source("contours"),
            Err(Error::SourceInUse { .. })
        ));
        map.remove_layer("lines").unwrap();
        map.remove_source("contours").unwrap();
    }

    #[test]
    fn property_mutation_requires_layer() {
        let mut map = HeadlessMap::new();
        assert!(matches!(
            map.set_paint_property("hillshade", "hillshade-shadow-color", json!("#000000")),
            Err(Error::UnknownLayer(_))
        ));
        map.add_layer(LayerSpec::new("bg", LayerKind::Background), None)
            .unwrap();
        map.set_layout_property("bg", "visibility", json!("none"))
            .unwrap();
        assert!(!map.get_layer("bg").unwrap().is_visible());
    }

    #[test]
    fn query_hits_visible_geojson_features() {
        let mut map = HeadlessMap::new();
        let fc = FeatureCollectionBuilder::new().build(&[ring(2500.0, 1.0), ring(2600.0, 0.2)]);
        map.add_source("contours", SourceSpec::geojson(fc)).unwrap();
        map.add_layer(
            LayerSpec::new("contour-lines", LayerKind::Line).with_source("contours"),
            None,
        )
        .unwrap();
        let hits = map.query_rendered_features(Point::new(0.5, 0.5));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].geometry_type, "LineString");
        assert_eq!(hits[0].properties["ele"], 2500.0);
        assert_eq!(map.query_rendered_features(Point::new(0.0, 0.0)).len(), 2);
        assert!(map.query_rendered_features(Point::new(5.0, 5.0)).is_empty());

        map.set_layout_property("contour-lines", "visibility", json!("none"))
            .unwrap();
        assert!(map.query_rendered_features(Point::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn query_respects_equality_filter() {
        let mut map = HeadlessMap::new();
        let fc = FeatureCollectionBuilder::new().build(&[ring(2500.0, 1.0), ring(2600.0, 1.0)]);
        map.add_source("contours", SourceSpec::geojson(fc)).unwrap();
        map.add_layer(
            LayerSpec::new("major", LayerKind::Line)
                .with_source("contours")
                .with_filter(json!(["==", "level", 1])),
            None,
        )
        .unwrap();
        let hits = map.query_rendered_features(Point::new(0.0, 0.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].properties["ele"], 2500.0);
    }

    #[test]
    fn bounds_of_nested_geometries() {
        let v = geojson::Value::GeometryCollection(vec![
            geojson::Geometry::new(geojson::Value::Point(vec![1.0, 2.0])),
            geojson::Geometry::new(geojson::Value::LineString(vec![
                vec![-1.0, 0.0],
                vec![0.0, 5.0],
            ])),
        ]);
        assert_eq!(geometry_bounds(&v), Some(Bounds::new(-1.0, 0.0, 1.0, 5.0)));
    }
}
