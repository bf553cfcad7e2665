use assert_fs::prelude::*;
use terrain_viz::{
    app::{App, CONTOUR_LAYERS, CONTOUR_SOURCE},
    config::AppConfig,
    contour::ContourVariant,
    controls::TerrainSource,
    events::{event_channel, ControlChange, UiEvent},
    map::{HeadlessMap, MapSurface},
    presets::HILLSHADE_LAYER,
    style::StyleDocument,
};

fn config_with_style(dir: &assert_fs::TempDir) -> AppConfig {
    let style = dir.child("style.json");
    StyleDocument::mapterhorn()
        .save(style.path().to_str().unwrap())
        .unwrap();
    let mut config = AppConfig::default();
    config.style_path = style.path().to_str().unwrap().to_string();
    config.contours.variant = ContourVariant::Radial;
    config
}

#[test]
fn initialize_from_style_file_and_load() {
    let dir = assert_fs::TempDir::new().unwrap();
    let mut app = App::initialize(config_with_style(&dir));
    assert!(app.map().is_some());
    assert!(app.handle(UiEvent::Load));
    let map = app.map().unwrap();
    assert!(map.has_source(CONTOUR_SOURCE));
    for id in CONTOUR_LAYERS {
        assert!(map.has_layer(id));
    }
    dir.close().unwrap();
}

#[test]
fn missing_style_leaves_controls_only() {
    let dir = assert_fs::TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.style_path = dir.child("missing.json").path().to_str().unwrap().to_string();
    let mut app = App::initialize(config);
    assert!(app.map().is_none());
    assert!(!app.handle(UiEvent::Load));
    assert!(app.handle(UiEvent::MenuToggle));
    assert!(app.menu_open);
}

#[test]
fn gel_source_from_config() {
    let dir = assert_fs::TempDir::new().unwrap();
    let mut config = config_with_style(&dir);
    config.terrain_source = TerrainSource::Gel;
    let mut app = App::initialize(config);
    app.handle(UiEvent::Load);
    let map = app.map().unwrap();
    assert_eq!(map.terrain().unwrap().source, "gel-terrain");
    assert_eq!(
        map.get_layer(HILLSHADE_LAYER).unwrap().source.as_deref(),
        Some("gel-hillshade")
    );
}

#[test]
fn queued_page_session() {
    let mut app = App::with_map(
        HeadlessMap::from_style(&StyleDocument::mapterhorn()),
        AppConfig {
            building: Some("way/7".into()),
            ..AppConfig::default()
        },
    );
    let (tx, rx) = event_channel();
    tx.send(UiEvent::Load);
    tx.send(UiEvent::Control(
        ControlChange::from_control("exaggeration", "2.5").unwrap(),
    ));
    tx.send(UiEvent::Preset("enhanced".into()));
    tx.send(UiEvent::Viewpoint("zermatt".into()));
    tx.send(UiEvent::Click(terrain_viz::elevation::ElevationModel::MATTERHORN_SUMMIT));
    tx.send(UiEvent::ClosePanel);
    assert_eq!(app.drain(&rx), 6);

    let map = app.map().unwrap();
    assert_eq!(map.terrain().unwrap().exaggeration, 2.5);
    assert_eq!(map.camera().unwrap().bearing, 180.0);
    assert_eq!(
        map.get_layer(HILLSHADE_LAYER).unwrap().paint["hillshade-accent-color"],
        "#7a6f5e"
    );
    assert!(!app.panel.visible);
    assert!(!app.panel.entries.is_empty());
}
