use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// crate specific Error enum
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
    #[error("source `{0}` does not exist")]
    UnknownSource(String),
    #[error("source `{0}` already exists")]
    DuplicateSource(String),
    #[error("source `{0}` is not a geojson source")]
    NotGeoJsonSource(String),
    #[error("source `{source_id}` is still used by layer `{layer_id}`")]
    SourceInUse { source_id: String, layer_id: String },
    #[error("layer `{0}` does not exist")]
    UnknownLayer(String),
    #[error("layer `{0}` already exists")]
    DuplicateLayer(String),
    #[error("layer `{layer_id}` references missing source `{source_id}`")]
    MissingLayerSource { layer_id: String, source_id: String },
    #[error("source `{0}` is not a raster-dem source")]
    NotDemSource(String),
    #[error("unknown hillshade preset `{0}`")]
    UnknownPreset(String),
    #[error("unknown viewpoint `{0}`")]
    UnknownViewpoint(String),
    #[error("`{0}` is not a #RRGGBB colour")]
    InvalidColor(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
