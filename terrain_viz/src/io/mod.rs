//! File input and output helpers.

use std::fs::File;
use std::io::{self, Read, Write};

use geojson::FeatureCollection;

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes `contents` to `path`, replacing any existing file.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Writes a feature collection as pretty printed GeoJSON.
pub fn write_geojson(path: &str, collection: &FeatureCollection) -> crate::Result<()> {
    let json = crate::gis::to_string_pretty(collection)?;
    write_string(path, &json)?;
    Ok(())
}

/// Reads a GeoJSON feature collection.
pub fn read_geojson(path: &str) -> crate::Result<FeatureCollection> {
    let contents = read_to_string(path)?;
    Ok(contents.parse::<FeatureCollection>()?)
}
