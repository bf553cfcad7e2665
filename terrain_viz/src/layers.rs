use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Render type of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Background,
    Fill,
    FillExtrusion,
    Line,
    Symbol,
    Circle,
    Raster,
    Hillshade,
}

/// Representation of a style layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "source-layer", default, skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
}

impl LayerSpec {
    /// Creates a new layer without source, layout or paint.
    pub fn new(id: &str, kind: LayerKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            source: None,
            source_layer: None,
            filter: None,
            layout: Map::new(),
            paint: Map::new(),
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_source_layer(mut self, source_layer: &str) -> Self {
        self.source_layer = Some(source_layer.to_string());
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_string(), value.into());
        self
    }

    pub fn with_paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_string(), value.into());
        self
    }

    /// Layers are visible unless their `visibility` layout property is `none`.
    pub fn is_visible(&self) -> bool {
        self.layout.get("visibility").and_then(Value::as_str) != Some("none")
    }

    pub fn paint_property(&self, name: &str) -> Option<&Value> {
        self.paint.get(name)
    }

    pub fn layout_property(&self, name: &str) -> Option<&Value> {
        self.layout.get(name)
    }
}

/// Ordered layer list, bottom layer first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LayerStack {
    layers: Vec<LayerSpec>,
}

impl LayerStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn from_layers(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Inserts `layer` directly below `before_id`, or on top when `None`.
    pub fn insert(&mut self, layer: LayerSpec, before_id: Option<&str>) -> Result<()> {
        if self.position(&layer.id).is_some() {
            return Err(Error::DuplicateLayer(layer.id));
        }
        match before_id {
            Some(before) => {
                let idx = self
                    .position(before)
                    .ok_or_else(|| Error::UnknownLayer(before.to_string()))?;
                self.layers.insert(idx, layer);
            }
            None => self.layers.push(layer),
        }
        Ok(())
    }

    /// Removes and returns the named layer.
    pub fn remove(&mut self, id: &str) -> Option<LayerSpec> {
        let idx = self.position(id)?;
        Some(self.layers.remove(idx))
    }

    /// Retrieves a layer by id.
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Retrieves a mutable reference to a layer by id.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Returns all layers matching `predicate`, bottom first.
    pub fn filter<F>(&self, predicate: F) -> Vec<&LayerSpec>
    where
        F: Fn(&LayerSpec) -> bool,
    {
        self.layers.iter().filter(|l| predicate(l)).collect()
    }

    /// Iterator over layer ids, bottom first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.id.as_str())
    }

    /// Iterator over all layers, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LayerSpec> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
