//! Building highlighting driven by the `building` query parameter.

use log::{info, warn};
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::map::MapSurface;

pub const HIGHLIGHT_COLOR: &str = "#FFD700";
pub const DEFAULT_BUILDING_COLOR: &str = "#D2B48C";

/// 2D building layers, coloured through `fill-color`.
pub const FLAT_LAYERS: [&str; 2] = ["buildings", "building-parts"];
/// Extruded building layers, coloured through `fill-extrusion-color`.
pub const EXTRUDED_LAYERS: [&str; 2] = ["buildings-3d", "building-parts-3d"];

/// Splits a comma separated id list, trimming whitespace and dropping
/// empty entries. The page keeps empty entries, so a blank list such as
/// `" , "` would switch on the highlight branch there; here it does not.
pub fn parse_building_ids(param: &str) -> Vec<String> {
    param
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decoded value of the `building` parameter in a URL query string such as
/// `?building=A,B&x=1`. Keys and values are form-urlencoded.
pub fn building_param_from_query(query: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == "building")
        .map(|(_, value)| value.into_owned())
}

/// Colour expression: matching ids in gold, then the feature's facade or
/// roof colour, then tan.
pub fn building_color_expression(ids: &[String]) -> Value {
    let mut expr = vec![json!("case")];
    if !ids.is_empty() {
        expr.push(json!(["in", ["get", "id"], ["literal", ids]]));
        expr.push(json!(HIGHLIGHT_COLOR));
    }
    expr.extend([
        json!(["has", "facade_color"]),
        json!(["get", "facade_color"]),
        json!(["has", "roof_color"]),
        json!(["get", "roof_color"]),
        json!(DEFAULT_BUILDING_COLOR),
    ]);
    Value::Array(expr)
}

/// Applies the highlight expression to every building layer present on the
/// map. Returns the number of layers updated.
pub fn update_building_highlight<M: MapSurface + ?Sized>(
    map: &mut M,
    param: Option<&str>,
) -> usize {
    let ids = param.map(parse_building_ids).unwrap_or_default();
    let expression = building_color_expression(&ids);
    let targets = FLAT_LAYERS
        .iter()
        .map(|id| (*id, "fill-color"))
        .chain(EXTRUDED_LAYERS.iter().map(|id| (*id, "fill-extrusion-color")));
    let mut updated = 0;
    for (layer_id, property) in targets {
        if !map.has_layer(layer_id) {
            continue;
        }
        match map.set_paint_property(layer_id, property, expression.clone()) {
            Ok(()) => updated += 1,
            Err(e) => warn!("Could not update building highlight on {layer_id}: {e}"),
        }
    }
    if !ids.is_empty() {
        info!("Highlighting buildings: {ids:?}");
    }
    updated
}
