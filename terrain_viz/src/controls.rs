//! Terrain, hillshade and contour toggles.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::CONTOUR_LAYERS;
use crate::error::{Error, Result};
use crate::map::{MapSurface, TerrainSpec};
use crate::presets::{hillshade_layer, HILLSHADE_LAYER};

/// Layer the hillshade is inserted beneath when rebuilt.
pub const HILLSHADE_ANCHOR: &str = "roads_tunnels_other_casing";

/// Elevation data set backing terrain and hillshade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainSource {
    #[default]
    Mapterhorn,
    Gel,
}

impl TerrainSource {
    pub fn terrain_source_id(self) -> &'static str {
        match self {
            TerrainSource::Mapterhorn => "mapterhorn-terrain",
            TerrainSource::Gel => "gel-terrain",
        }
    }

    pub fn hillshade_source_id(self) -> &'static str {
        match self {
            TerrainSource::Mapterhorn => "mapterhorn-hillshade",
            TerrainSource::Gel => "gel-hillshade",
        }
    }
}

impl std::str::FromStr for TerrainSource {
    type Err = Error;

    /// Anything other than `gel` selects Mapterhorn.
    fn from_str(s: &str) -> Result<Self> {
        Ok(if s.eq_ignore_ascii_case("gel") {
            TerrainSource::Gel
        } else {
            TerrainSource::Mapterhorn
        })
    }
}

/// Layout `visibility` value for a checkbox state.
pub fn visibility(visible: bool) -> Value {
    Value::from(if visible { "visible" } else { "none" })
}

/// Current state of the terrain control panel.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainControls {
    pub exaggeration: f64,
    pub terrain_enabled: bool,
    pub hillshade_visible: bool,
    pub contours_visible: bool,
    pub source: TerrainSource,
}

impl Default for TerrainControls {
    fn default() -> Self {
        Self {
            exaggeration: 1.0,
            terrain_enabled: true,
            hillshade_visible: true,
            contours_visible: true,
            source: TerrainSource::Mapterhorn,
        }
    }
}

impl TerrainControls {
    pub fn terrain_spec(&self) -> TerrainSpec {
        TerrainSpec::new(self.source.terrain_source_id(), self.exaggeration)
    }

    /// Pushes the terrain state to the map.
    pub fn apply_terrain<M: MapSurface + ?Sized>(&self, map: &mut M) {
        if self.terrain_enabled {
            map.set_terrain(Some(self.terrain_spec()));
        } else {
            map.set_terrain(None);
        }
    }

    pub fn set_exaggeration<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        value: f64,
    ) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidSettings(format!(
                "terrain exaggeration {value} must be a non-negative number"
            )));
        }
        self.exaggeration = value;
        if self.terrain_enabled {
            self.apply_terrain(map);
        }
        Ok(())
    }

    pub fn set_terrain_enabled<M: MapSurface + ?Sized>(&mut self, map: &mut M, enabled: bool) {
        self.terrain_enabled = enabled;
        self.apply_terrain(map);
    }

    pub fn toggle_terrain<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        self.set_terrain_enabled(map, !self.terrain_enabled);
    }

    pub fn set_hillshade_visible<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        visible: bool,
    ) -> Result<()> {
        self.hillshade_visible = visible;
        map.set_layout_property(HILLSHADE_LAYER, "visibility", visibility(visible))
    }

    pub fn toggle_hillshade<M: MapSurface + ?Sized>(&mut self, map: &mut M) -> Result<()> {
        self.set_hillshade_visible(map, !self.hillshade_visible)
    }

    /// Shows or hides every contour layer that exists. Returns how many
    /// layers were changed.
    pub fn set_contours_visible<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        visible: bool,
    ) -> usize {
        self.contours_visible = visible;
        let mut changed = 0;
        for id in CONTOUR_LAYERS {
            if !map.has_layer(id) {
                continue;
            }
            match map.set_layout_property(id, "visibility", visibility(visible)) {
                Ok(()) => changed += 1,
                Err(e) => warn!("Could not change visibility of {id}: {e}"),
            }
        }
        changed
    }

    /// Points terrain and hillshade at another elevation data set.
    pub fn switch_source<M: MapSurface + ?Sized>(
        &mut self,
        map: &mut M,
        source: TerrainSource,
    ) -> Result<()> {
        let terrain_id = source.terrain_source_id();
        if !map.has_source(terrain_id) {
            return Err(Error::UnknownSource(terrain_id.to_string()));
        }
        self.source = source;
        map.set_terrain(Some(self.terrain_spec()));
        self.terrain_enabled = true;
        rebuild_hillshade_layer(map, source.hillshade_source_id(), self.hillshade_visible)?;
        info!("Switched terrain source to {source:?}");
        Ok(())
    }
}

/// Replaces the hillshade layer with one reading from `source_id`, placed
/// beneath [`HILLSHADE_ANCHOR`] when that layer exists.
pub fn rebuild_hillshade_layer<M: MapSurface + ?Sized>(
    map: &mut M,
    source_id: &str,
    visible: bool,
) -> Result<()> {
    if !map.has_source(source_id) {
        return Err(Error::UnknownSource(source_id.to_string()));
    }
    if map.has_layer(HILLSHADE_LAYER) {
        map.remove_layer(HILLSHADE_LAYER)?;
    }
    // a dedicated `hillshade` source from older styles is dropped as well
    if map.has_source(HILLSHADE_LAYER) {
        map.remove_source(HILLSHADE_LAYER)?;
    }
    let mut layer = hillshade_layer(source_id);
    if !visible {
        layer = layer.with_layout("visibility", "none");
    }
    let before = map.has_layer(HILLSHADE_ANCHOR).then_some(HILLSHADE_ANCHOR);
    map.add_layer(layer, before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeadlessMap;
    use crate::style::StyleDocument;

    fn map() -> HeadlessMap {
        HeadlessMap::from_style(&StyleDocument::mapterhorn())
    }

    #[test]
    fn terrain_toggle_round_trip() {
        let mut map = map();
        let mut controls = TerrainControls::default();
        controls.toggle_terrain(&mut map);
        assert!(map.terrain().is_none());
        controls.toggle_terrain(&mut map);
        assert_eq!(map.terrain().unwrap().source, "mapterhorn-terrain");
        assert_eq!(map.terrain().unwrap().exaggeration, 1.0);
    }

    #[test]
    fn exaggeration_only_applies_when_enabled() {
        let mut map = map();
        let mut controls = TerrainControls::default();
        controls.set_terrain_enabled(&mut map, false);
        controls.set_exaggeration(&mut map, 2.0).unwrap();
        assert!(map.terrain().is_none());
        controls.set_terrain_enabled(&mut map, true);
        assert_eq!(map.terrain().unwrap().exaggeration, 2.0);
        assert!(controls.set_exaggeration(&mut map, f64::NAN).is_err());
    }

    #[test]
    fn hillshade_visibility() {
        let mut map = map();
        let mut controls = TerrainControls::default();
        controls.toggle_hillshade(&mut map).unwrap();
        assert!(!map.get_layer(HILLSHADE_LAYER).unwrap().is_visible());
        controls.set_hillshade_visible(&mut map, true).unwrap();
        assert!(map.get_layer(HILLSHADE_LAYER).unwrap().is_visible());
    }

    #[test]
    fn switching_source_rebuilds_hillshade_below_anchor() {
        let mut map = map();
        let mut controls = TerrainControls::default();
        controls.switch_source(&mut map, TerrainSource::Gel).unwrap();
        assert_eq!(map.terrain().unwrap().source, "gel-terrain");
        let hillshade = map.get_layer(HILLSHADE_LAYER).unwrap();
        assert_eq!(hillshade.source.as_deref(), Some("gel-hillshade"));
        let ids: Vec<&str> = map.layers().ids().collect();
        let h = ids.iter().position(|id| *id == HILLSHADE_LAYER).unwrap();
        let a = ids.iter().position(|id| *id == HILLSHADE_ANCHOR).unwrap();
        assert_eq!(h + 1, a);
    }

    #[test]
    fn hidden_hillshade_stays_hidden_after_switch() {
        let mut map = map();
        let mut controls = TerrainControls::default();
        controls.set_hillshade_visible(&mut map, false).unwrap();
        controls.switch_source(&mut map, TerrainSource::Gel).unwrap();
        assert!(!map.get_layer(HILLSHADE_LAYER).unwrap().is_visible());
    }

    #[test]
    fn switching_to_missing_source_fails() {
        let mut map = HeadlessMap::new();
        let mut controls = TerrainControls::default();
        assert!(matches!(
            controls.switch_source(&mut map, TerrainSource::Gel),
            Err(Error::UnknownSource(_))
        ));
    }

    #[test]
    fn source_from_str() {
        assert_eq!("gel".parse::<TerrainSource>().unwrap(), TerrainSource::Gel);
        assert_eq!(
            "anything".parse::<TerrainSource>().unwrap(),
            TerrainSource::Mapterhorn
        );
    }
}
