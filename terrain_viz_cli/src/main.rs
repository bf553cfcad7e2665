use clap::{Parser, Subcommand};
use log::LevelFilter;
use terrain_viz::{
    app::{App, CONTOUR_SOURCE},
    building::{building_color_expression, building_param_from_query, parse_building_ids},
    config::AppConfig,
    contour::{contour_levels, generate_contours, is_major, ContourVariant},
    controls::TerrainSource,
    elevation::ElevationSource,
    events::{ControlChange, UiEvent},
    gis::{to_string_pretty, FeatureCollectionBuilder},
    io::write_geojson,
    map::{HeadlessMap, MapSurface},
    presets::{find_preset, HILLSHADE_LAYER},
    style::StyleDocument,
    viewpoints::{viewpoint, viewpoints, Viewpoint},
    Result,
};

#[derive(Parser)]
#[command(author, version, about = "Mapterhorn terrain visualization tools")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<String>,
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the elevation at a longitude/latitude.
    Estimate {
        #[arg(allow_hyphen_values = true)]
        lon: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
    },
    /// Generate contour lines as GeoJSON.
    Contours {
        /// `grid` or `radial`
        #[arg(long)]
        variant: Option<String>,
        /// Chaikin smoothing iterations
        #[arg(long)]
        smoothing: Option<usize>,
        /// Output file, stdout when omitted
        #[arg(long)]
        output: Option<String>,
    },
    /// List the contour levels between two elevations.
    Levels {
        min: f64,
        max: f64,
        interval: f64,
        #[arg(long, default_value_t = 500.0)]
        major: f64,
    },
    /// Show the colour expression for a building id list or query string.
    Highlight { building: String },
    /// Show the colours of a hillshade preset.
    Preset { name: String },
    /// Show a named viewpoint, or all of them with `all`.
    Viewpoint { name: String },
    /// Write the built-in style document.
    StyleExport { output: String },
    /// Validate a style document.
    StyleCheck { path: String },
    /// Run a page session against an in-memory map.
    Simulate {
        /// Style file, the built-in style when omitted
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        building: Option<String>,
        #[arg(long)]
        preset: Option<String>,
        /// `mapterhorn` or `gel`
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        viewpoint: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Estimate { lon, lat } => {
            let z = config.elevation.estimate(lon, lat);
            println!("Elevation at {lon:.4},{lat:.4}: {z:.1} m");
        }
        Commands::Contours {
            variant,
            smoothing,
            output,
        } => {
            if let Some(variant) = variant {
                config.contours.variant = variant.parse::<ContourVariant>()?;
            }
            if let Some(n) = smoothing {
                config.contours.smoothing = n;
            }
            let features = generate_contours(&config.contours, &config.elevation)?;
            let collection =
                FeatureCollectionBuilder::from_settings(&config.contours).build(&features);
            match output {
                Some(path) => {
                    write_geojson(&path, &collection)?;
                    println!("Wrote {} contour lines to {}", features.len(), path);
                }
                None => println!("{}", to_string_pretty(&collection)?),
            }
        }
        Commands::Levels {
            min,
            max,
            interval,
            major,
        } => {
            for level in contour_levels(min, max, interval)? {
                let kind = if is_major(level, major) { "major" } else { "minor" };
                println!("{level} {kind}");
            }
        }
        Commands::Highlight { building } => {
            let param = if building.contains('=') {
                building_param_from_query(&building).unwrap_or_default()
            } else {
                building
            };
            let ids = parse_building_ids(&param);
            println!("Buildings: {}", ids.join(", "));
            println!("{}", serde_json::to_string(&building_color_expression(&ids))?);
        }
        Commands::Preset { name } => {
            let preset = find_preset(&name)?;
            println!("shadow {}", preset.shadow);
            println!("highlight {}", preset.highlight);
            println!("accent {}", preset.accent);
        }
        Commands::Viewpoint { name } => {
            let list: Vec<&Viewpoint> = if name == "all" {
                viewpoints().iter().collect()
            } else {
                vec![viewpoint(&name)?]
            };
            for vp in list {
                let c = &vp.camera;
                println!(
                    "{}: {} center {:.4},{:.4} zoom {} pitch {} bearing {}",
                    vp.key, vp.name, c.center.x, c.center.y, c.zoom, c.pitch, c.bearing
                );
            }
        }
        Commands::StyleExport { output } => {
            StyleDocument::mapterhorn().save(&output)?;
            println!("Style written to {output}");
        }
        Commands::StyleCheck { path } => {
            let style = StyleDocument::load(&path)?;
            println!(
                "Style OK: {} sources, {} layers",
                style.sources.len(),
                style.layers.len()
            );
        }
        Commands::Simulate {
            style,
            building,
            preset,
            source,
            viewpoint,
        } => {
            if building.is_some() {
                config.building = building;
            }
            let style = match style {
                Some(path) => StyleDocument::load(&path)?,
                None => StyleDocument::mapterhorn(),
            };
            let mut app = App::with_map(HeadlessMap::from_style(&style), config);
            let mut events = vec![UiEvent::Load];
            if let Some(name) = preset {
                events.push(UiEvent::Preset(name));
            }
            if let Some(source) = source {
                let source = source.parse::<TerrainSource>()?;
                events.push(UiEvent::Control(ControlChange::TerrainSource(source)));
            }
            if let Some(key) = viewpoint {
                events.push(UiEvent::Viewpoint(key));
            }
            let total = events.len();
            let applied = events
                .into_iter()
                .map(|e| app.handle(e))
                .filter(|ok| *ok)
                .count();
            print_session(&app);
            println!("Events applied: {applied}/{total}");
        }
    }
    Ok(())
}

fn print_session(app: &App<HeadlessMap>) {
    let Some(map) = app.map() else {
        return;
    };
    match map.terrain() {
        Some(t) => println!("Terrain: {} x{}", t.source, t.exaggeration),
        None => println!("Terrain: off"),
    }
    if let Some(layer) = map.get_layer(HILLSHADE_LAYER) {
        println!(
            "Hillshade: {} shadow {}",
            layer.source.as_deref().unwrap_or("-"),
            layer
                .paint_property("hillshade-shadow-color")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
        );
    }
    let contours = map
        .get_source(CONTOUR_SOURCE)
        .and_then(|s| s.data())
        .map_or(0, |d| d.features.len());
    println!("Contour lines: {contours}");
    if let Some(camera) = map.camera() {
        println!(
            "Camera: {:.4},{:.4} zoom {}",
            camera.center.x, camera.center.y, camera.zoom
        );
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
