use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::layers::{LayerKind, LayerSpec};
use crate::map::MapSurface;

/// Id of the hillshade layer the presets act on.
pub const HILLSHADE_LAYER: &str = "hillshade";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Returns `true` for `#RRGGBB` strings.
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR.is_match(s)
}

/// Shadow, highlight and accent colours of the hillshade layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HillshadePreset {
    pub shadow: String,
    pub highlight: String,
    pub accent: String,
}

impl HillshadePreset {
    /// Creates a preset, rejecting anything that is not `#RRGGBB`.
    pub fn new(shadow: &str, highlight: &str, accent: &str) -> Result<Self> {
        for c in [shadow, highlight, accent] {
            if !is_hex_color(c) {
                return Err(Error::InvalidColor(c.to_string()));
            }
        }
        Ok(Self {
            shadow: shadow.to_string(),
            highlight: highlight.to_string(),
            accent: accent.to_string(),
        })
    }

    /// Paint property name/value pairs for this preset.
    pub fn paint(&self) -> [(&'static str, Value); 3] {
        [
            ("hillshade-shadow-color", Value::from(self.shadow.as_str())),
            ("hillshade-highlight-color", Value::from(self.highlight.as_str())),
            ("hillshade-accent-color", Value::from(self.accent.as_str())),
        ]
    }
}

fn preset(shadow: &str, highlight: &str, accent: &str) -> HillshadePreset {
    HillshadePreset {
        shadow: shadow.to_string(),
        highlight: highlight.to_string(),
        accent: accent.to_string(),
    }
}

fn natural() -> HillshadePreset {
    preset("#473B24", "#F4E8C1", "#8a7f6e")
}

/// Returns the built-in hillshade presets.
pub fn default_presets() -> Vec<(String, HillshadePreset)> {
    vec![
        ("natural".to_string(), natural()),
        ("enhanced".to_string(), preset("#2a2419", "#fff3d4", "#7a6f5e")),
        ("subtle".to_string(), preset("#5a4f3a", "#f0e7d0", "#9a8f7e")),
    ]
}

pub fn find_preset(name: &str) -> Result<HillshadePreset> {
    default_presets()
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, p)| p)
        .ok_or_else(|| Error::UnknownPreset(name.to_string()))
}

/// Applies the named preset to the hillshade layer. Returns `Ok(false)`
/// without touching the map when the layer is not there yet.
pub fn apply_preset<M: MapSurface + ?Sized>(map: &mut M, name: &str) -> Result<bool> {
    let preset = find_preset(name)?;
    if !map.has_layer(HILLSHADE_LAYER) {
        warn!("Map or hillshade layer not ready yet for preset: {name}");
        return Ok(false);
    }
    for (property, value) in preset.paint() {
        map.set_paint_property(HILLSHADE_LAYER, property, value)?;
    }
    info!("Applied preset: {name} {preset:?}");
    Ok(true)
}

/// Hillshade layer on `source` using the natural preset.
pub fn hillshade_layer(source: &str) -> LayerSpec {
    let mut layer = LayerSpec::new(HILLSHADE_LAYER, LayerKind::Hillshade).with_source(source);
    for (property, value) in natural().paint() {
        layer = layer.with_paint(property, value);
    }
    layer
        .with_paint("hillshade-illumination-direction", 315)
        .with_paint("hillshade-exaggeration", 1.0)
}
