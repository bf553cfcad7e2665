//! Map style document: sources, layers and terrain consumed at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::layers::{LayerKind, LayerSpec};
use crate::map::{DemEncoding, SourceSpec, TerrainSpec};

pub const MAPTERHORN_URL: &str = "https://tunnel.optgeo.org/martin/mapterhorn";
pub const GEL_URL: &str = "https://tunnel.optgeo.org/martin/gel";
pub const PROTOMAPS_URL: &str = "https://tunnel.optgeo.org/martin/protomaps-basemap";

/// Style document in the MapLibre style layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    pub version: u8,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceSpec>,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<String>,
}

impl StyleDocument {
    /// Parses and validates a style from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let style: StyleDocument = serde_json::from_str(text)?;
        style.validate()?;
        Ok(style)
    }

    /// Reads and validates a style file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = crate::io::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::io::write_string(path, &json)?;
        Ok(())
    }

    /// Checks that every layer source exists and that terrain and hillshade
    /// layers point at raster-dem sources.
    pub fn validate(&self) -> Result<()> {
        for layer in &self.layers {
            let Some(source_id) = &layer.source else {
                continue;
            };
            let source = self
                .sources
                .get(source_id)
                .ok_or_else(|| Error::MissingLayerSource {
                    layer_id: layer.id.clone(),
                    source_id: source_id.clone(),
                })?;
            if layer.kind == LayerKind::Hillshade && !source.is_raster_dem() {
                return Err(Error::NotDemSource(source_id.clone()));
            }
        }
        if let Some(terrain) = &self.terrain {
            match self.sources.get(&terrain.source) {
                Some(s) if s.is_raster_dem() => {}
                Some(_) => return Err(Error::NotDemSource(terrain.source.clone())),
                None => return Err(Error::UnknownSource(terrain.source.clone())),
            }
        }
        Ok(())
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Built-in style: Protomaps base layers over Mapterhorn terrarium
    /// elevation, with a second (GEL) elevation source for switching.
    pub fn mapterhorn() -> Self {
        let dem = |url: &str| SourceSpec::raster_dem(url, DemEncoding::Terrarium);
        let mut sources = BTreeMap::new();
        sources.insert(
            "protomaps".to_string(),
            SourceSpec::Vector {
                url: Some(PROTOMAPS_URL.to_string()),
                attribution: Some(
                    "<a href=\"https://github.com/protomaps/basemaps\">Protomaps</a> © \
                     <a href=\"https://openstreetmap.org\">OpenStreetMap</a>"
                        .to_string(),
                ),
            },
        );
        sources.insert("mapterhorn-terrain".to_string(), dem(MAPTERHORN_URL));
        sources.insert("mapterhorn-hillshade".to_string(), dem(MAPTERHORN_URL));
        sources.insert("gel-terrain".to_string(), dem(GEL_URL));
        sources.insert("gel-hillshade".to_string(), dem(GEL_URL));

        let polygon_filter = json!(["==", "$type", "Polygon"]);
        let default_building_color = json!([
            "case",
            ["has", "facade_color"],
            ["get", "facade_color"],
            ["has", "roof_color"],
            ["get", "roof_color"],
            "#D2B48C"
        ]);
        let layers = vec![
            LayerSpec::new("background", LayerKind::Background)
                .with_paint("background-color", "#f0f0f0"),
            crate::presets::hillshade_layer("mapterhorn-hillshade")
                .with_paint("hillshade-illumination-anchor", "map"),
            LayerSpec::new("earth", LayerKind::Fill)
                .with_source("protomaps")
                .with_source_layer("earth")
                .with_filter(polygon_filter.clone())
                .with_paint("fill-color", "#e2dfda")
                .with_paint("fill-opacity", 0.8),
            LayerSpec::new("landcover", LayerKind::Fill)
                .with_source("protomaps")
                .with_source_layer("landcover")
                .with_paint(
                    "fill-color",
                    json!([
                        "match",
                        ["get", "kind"],
                        "glacier", "#ffffff",
                        "rock", "#8b7d6b",
                        "scree", "#a0a0a0",
                        "grassland", "#c8d8c8",
                        "forest", "#6b8e3b",
                        "#e2dfda"
                    ]),
                )
                .with_paint(
                    "fill-opacity",
                    json!(["interpolate", ["linear"], ["zoom"], 8, 0.6, 12, 0.8]),
                ),
            LayerSpec::new("water", LayerKind::Fill)
                .with_source("protomaps")
                .with_source_layer("water")
                .with_filter(polygon_filter)
                .with_paint("fill-color", "#4a9eff")
                .with_paint("fill-opacity", 0.8),
            LayerSpec::new("roads_tunnels_other_casing", LayerKind::Line)
                .with_source("protomaps")
                .with_source_layer("roads")
                .with_filter(json!(["all", ["has", "is_tunnel"], ["==", "kind", "other"]]))
                .with_paint("line-color", "#e0e0e0"),
            LayerSpec::new("roads", LayerKind::Line)
                .with_source("protomaps")
                .with_source_layer("roads")
                .with_filter(json!(["==", "kind", "highway"]))
                .with_paint("line-color", "#ffffff")
                .with_paint(
                    "line-width",
                    json!(["interpolate", ["exponential", 1.6], ["zoom"], 6, 0.5, 12, 2, 18, 8]),
                ),
            LayerSpec::new("buildings", LayerKind::Fill)
                .with_source("protomaps")
                .with_source_layer("buildings")
                .with_paint("fill-color", default_building_color.clone()),
            LayerSpec::new("buildings-3d", LayerKind::FillExtrusion)
                .with_source("protomaps")
                .with_source_layer("buildings")
                .with_paint("fill-extrusion-color", default_building_color)
                .with_paint("fill-extrusion-height", json!(["get", "height"])),
            LayerSpec::new("places", LayerKind::Symbol)
                .with_source("protomaps")
                .with_source_layer("places")
                .with_filter(json!(["==", "kind", "locality"]))
                .with_layout("text-field", json!(["get", "name"]))
                .with_layout("text-font", json!(["Noto Sans Regular"]))
                .with_layout(
                    "text-size",
                    json!(["interpolate", ["linear"], ["zoom"], 8, 10, 12, 14]),
                )
                .with_paint("text-color", "#2d2d2d")
                .with_paint("text-halo-color", "#ffffff")
                .with_paint("text-halo-width", 2),
        ];

        Self {
            version: 8,
            sources,
            layers,
            terrain: Some(TerrainSpec::new("mapterhorn-terrain", 1.5)),
            sprite: Some("https://protomaps.github.io/basemaps-assets/sprites/v4/light".to_string()),
            glyphs: Some(
                "https://protomaps.github.io/basemaps-assets/fonts/{fontstack}/{range}.pbf"
                    .to_string(),
            ),
        }
    }
}

impl std::str::FromStr for StyleDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}

impl Default for StyleDocument {
    fn default() -> Self {
        Self::mapterhorn()
    }
}
