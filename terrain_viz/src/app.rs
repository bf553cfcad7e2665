//! Application state and event dispatch.
//!
//! [`App`] owns the map surface, the control panel state, the properties
//! panel and the configuration. Every [`UiEvent`] goes through
//! [`App::handle`]; failures are logged and the app keeps running.

use log::{debug, error, info, warn};
use serde_json::json;

use crate::building::update_building_highlight;
use crate::config::AppConfig;
use crate::contour::{generate_contours, ContourSettings};
use crate::controls::{visibility, TerrainControls, TerrainSource};
use crate::elevation::ElevationSource;
use crate::error::Result;
use crate::events::{ControlChange, UiEvent, UiEventReceiver};
use crate::geometry::Point;
use crate::gis::FeatureCollectionBuilder;
use crate::layers::{LayerKind, LayerSpec};
use crate::map::{HeadlessMap, MapSurface, RenderedFeature, SourceSpec};
use crate::presets::apply_preset;
use crate::style::{StyleDocument, MAPTERHORN_URL};
use crate::viewpoints::{fly_to_viewpoint, reset_view};

pub const CONTOUR_SOURCE: &str = "contours";
pub const CONTOUR_LAYER: &str = "contour-lines";
pub const CONTOUR_MAJOR_LAYER: &str = "contour-lines-major";
/// Minor and major contour layers, in that order.
pub const CONTOUR_LAYERS: [&str; 2] = [CONTOUR_LAYER, CONTOUR_MAJOR_LAYER];

/// Contour layers go beneath the place labels when those exist.
const CONTOUR_ANCHOR: &str = "places";

/// Minor and major line layers over the contour source.
pub fn contour_layers(settings: &ContourSettings, visible: bool) -> [LayerSpec; 2] {
    let line = |id: &str, level: u8, color: &str, width: f64, opacity: f64| {
        LayerSpec::new(id, LayerKind::Line)
            .with_source(CONTOUR_SOURCE)
            .with_filter(json!(["==", settings.level_key, level]))
            .with_layout("visibility", visibility(visible))
            .with_paint("line-color", color)
            .with_paint("line-width", width)
            .with_paint("line-opacity", opacity)
    };
    [
        line(CONTOUR_LAYER, 0, "#8b6f47", 0.8, 0.6),
        line(CONTOUR_MAJOR_LAYER, 1, "#5c4a2f", 1.6, 0.9),
    ]
}

/// Regenerates the contour set and pushes it to the map. An existing source
/// gets its data replaced; otherwise the source and both layers are added.
/// Returns the number of contour features.
pub fn refresh_contours<M, S>(
    map: &mut M,
    settings: &ContourSettings,
    source: &S,
    visible: bool,
) -> Result<usize>
where
    M: MapSurface + ?Sized,
    S: ElevationSource,
{
    let features = generate_contours(settings, source)?;
    let collection = FeatureCollectionBuilder::from_settings(settings).build(&features);
    if map.has_source(CONTOUR_SOURCE) {
        map.set_source_data(CONTOUR_SOURCE, collection)?;
    } else {
        map.add_source(CONTOUR_SOURCE, SourceSpec::geojson(collection))?;
    }
    let before = map.has_layer(CONTOUR_ANCHOR).then_some(CONTOUR_ANCHOR);
    for layer in contour_layers(settings, visible) {
        if !map.has_layer(&layer.id) {
            map.add_layer(layer, before)?;
        }
    }
    Ok(features.len())
}

/// One clicked feature in the properties panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry {
    pub header: String,
    pub body: String,
    pub collapsed: bool,
}

impl PanelEntry {
    pub fn from_feature(feature: &RenderedFeature) -> Self {
        let header = format!(
            "{} ({})",
            feature.source_layer.as_deref().unwrap_or("Feature"),
            feature.geometry_type
        );
        let body = if feature.properties.is_empty() {
            "No properties".to_string()
        } else {
            serde_json::to_string_pretty(&feature.properties)
                .unwrap_or_else(|_| "No properties".to_string())
        };
        Self {
            header,
            body,
            collapsed: false,
        }
    }
}

/// Feature properties shown after a click.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesPanel {
    pub visible: bool,
    pub entries: Vec<PanelEntry>,
}

impl PropertiesPanel {
    /// Replaces the content with `features`; hides the panel when empty.
    pub fn show(&mut self, features: &[RenderedFeature]) {
        self.entries = features.iter().map(PanelEntry::from_feature).collect();
        self.visible = !self.entries.is_empty();
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn toggle_entry(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.collapsed = !entry.collapsed;
        }
    }
}

pub struct App<M: MapSurface> {
    map: Option<M>,
    pub config: AppConfig,
    pub controls: TerrainControls,
    pub panel: PropertiesPanel,
    pub menu_open: bool,
}

impl App<HeadlessMap> {
    /// Loads the style named in `config`. A style that cannot be read or
    /// validated leaves the app without a map.
    pub fn initialize(config: AppConfig) -> Self {
        match StyleDocument::load(&config.style_path) {
            Ok(style) => Self::with_map(HeadlessMap::from_style(&style), config),
            Err(e) => {
                error!("Error loading {}: {e}", config.style_path);
                Self::without_map(config)
            }
        }
    }
}

impl<M: MapSurface> App<M> {
    pub fn with_map(map: M, config: AppConfig) -> Self {
        let mut app = Self::without_map(config);
        app.map = Some(map);
        app
    }

    /// Controls only; map events are ignored.
    pub fn without_map(config: AppConfig) -> Self {
        let controls = TerrainControls {
            exaggeration: config.exaggeration,
            source: config.terrain_source,
            ..Default::default()
        };
        Self {
            map: None,
            config,
            controls,
            panel: PropertiesPanel::default(),
            menu_open: false,
        }
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.map.as_mut()
    }

    /// Dispatches one event. Returns `false` when it could not be applied.
    pub fn handle(&mut self, event: UiEvent) -> bool {
        debug!("Handling {event:?}");
        match event {
            UiEvent::MenuToggle => {
                self.menu_open = !self.menu_open;
                true
            }
            UiEvent::ClickOutsideMenu => {
                self.menu_open = false;
                true
            }
            UiEvent::ClosePanel => {
                self.panel.close();
                true
            }
            UiEvent::Load => self.with_map_result("load", Self::on_load),
            UiEvent::Click(point) => self.with_map_result("click", |app| {
                app.on_click(point);
                Ok(())
            }),
            UiEvent::Control(change) => self.with_map_result("control change", |app| {
                app.on_control(change)
            }),
            UiEvent::Preset(name) => self.with_map_result("preset", |app| {
                let Some(map) = app.map.as_mut() else {
                    return Ok(());
                };
                apply_preset(map, &name).map(|_| ())
            }),
            UiEvent::Viewpoint(key) => self.with_map_result("viewpoint", |app| {
                let Some(map) = app.map.as_mut() else {
                    return Ok(());
                };
                fly_to_viewpoint(map, &key)
            }),
            UiEvent::ResetView => self.with_map_result("reset view", |app| {
                if let Some(map) = app.map.as_mut() {
                    reset_view(map);
                }
                Ok(())
            }),
            UiEvent::RefreshContours => self.with_map_result("contours", |app| {
                app.refresh_contours().map(|_| ())
            }),
        }
    }

    /// Handles every queued event in order. Returns how many succeeded.
    pub fn drain(&mut self, receiver: &UiEventReceiver) -> usize {
        receiver
            .0
            .try_iter()
            .map(|event| self.handle(event))
            .filter(|ok| *ok)
            .count()
    }

    fn with_map_result<F>(&mut self, what: &str, f: F) -> bool
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.map.is_none() {
            warn!("Map not available, ignoring {what}");
            return false;
        }
        match f(self) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not apply {what}: {e}");
                false
            }
        }
    }

    fn on_load(&mut self) -> Result<()> {
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };
        if self.controls.source == TerrainSource::Mapterhorn {
            self.controls.apply_terrain(map);
        } else if let Err(e) = self.controls.switch_source(map, self.controls.source) {
            warn!("Falling back to Mapterhorn terrain: {e}");
            self.controls.source = TerrainSource::Mapterhorn;
            self.controls.apply_terrain(map);
        }
        update_building_highlight(map, self.config.building.as_deref());
        match self.refresh_contours() {
            Ok(count) => debug!("{count} contour lines loaded"),
            Err(e) => warn!("Contours unavailable: {e}"),
        }
        info!("Mapterhorn Terrain Visualization initialized");
        info!("Data source: {MAPTERHORN_URL}");
        info!("Encoding: Terrarium format");
        Ok(())
    }

    fn on_click(&mut self, point: Point) {
        let Some(map) = self.map.as_ref() else {
            return;
        };
        let features = map.query_rendered_features(point);
        debug!("{} features at {:?}", features.len(), point);
        self.panel.show(&features);
    }

    fn on_control(&mut self, change: ControlChange) -> Result<()> {
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };
        let controls = &mut self.controls;
        match change {
            ControlChange::Terrain(enabled) => controls.set_terrain_enabled(map, enabled),
            ControlChange::TerrainSource(source) => controls.switch_source(map, source)?,
            ControlChange::Hillshade(visible) => controls.set_hillshade_visible(map, visible)?,
            ControlChange::Contours(visible) => {
                controls.set_contours_visible(map, visible);
            }
            ControlChange::Exaggeration(value) => controls.set_exaggeration(map, value)?,
        }
        Ok(())
    }

    /// Regenerates contours from the configured model and settings.
    pub fn refresh_contours(&mut self) -> Result<usize> {
        let Some(map) = self.map.as_mut() else {
            return Ok(0);
        };
        refresh_contours(
            map,
            &self.config.contours,
            &self.config.elevation,
            self.controls.contours_visible,
        )
    }
}
