/// NHC tropical map server client (ArcGIS REST).
///
/// Serves two feeds:
/// - Feed A: one forecast-cone layer per active storm slot (AT1..AT5).
///   These carry the most complete cone geometry.
/// - Feed D: broad fallback layers (all cones, outlook areas) that catch
///   anything the slot layers missed.
///
/// Layers are queried with `f=geojson`, so each response is a GeoJSON
/// FeatureCollection. Attribute names vary by layer and by season
/// (`STORMNAME` vs `stormname`), so properties are looked up
/// case-insensitively against a list of candidate keys.

use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};

use crate::config::{FeedsConfig, HttpConfig};
use crate::geometry::geojson_to_multipolygon;
use crate::ingest::http::TextFetcher;
use crate::ingest::{normalize_storm_id, storm_type_from_code};
use crate::model::{Cone, ConeOrigin, FetchError, LatLon, WindSpeed};

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Builds a query URL returning every feature of `layer` as GeoJSON.
pub fn build_query_url(map_server_url: &str, layer: u32) -> String {
    format!(
        "{}/{}/query?where={}&outFields=*&returnGeometry=true&f=geojson",
        map_server_url.trim_end_matches('/'),
        layer,
        urlencoding::encode("1=1")
    )
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn prop<'a>(props: &'a JsonObject, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|key| {
        props
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
            .map(|(_, v)| v)
    })
}

/// String property; numbers are rendered, blanks are dropped.
fn prop_str(props: &JsonObject, keys: &[&str]) -> Option<String> {
    let text = match prop(props, keys)? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Numeric property; strings are parsed, non-finite values are dropped.
fn prop_f64(props: &JsonObject, keys: &[&str]) -> Option<f64> {
    let value = match prop(props, keys)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn storm_id_from_props(props: &JsonObject) -> Option<String> {
    if let Some(id) = prop_str(props, &["stormid", "storm_id", "id"]) {
        return normalize_storm_id(&id);
    }
    // Cone layers sometimes carry only basin + number
    let basin = prop_str(props, &["basin"])?;
    let number = prop_f64(props, &["stormnum", "storm_num"])?;
    normalize_storm_id(&format!("{}{:02}", basin, number as u32))
}

fn wind_from_props(props: &JsonObject) -> Option<WindSpeed> {
    match prop(props, &["maxwind", "max_wind", "intensity", "vmax"])? {
        JsonValue::Number(n) => n.as_f64().map(WindSpeed::Knots),
        JsonValue::String(s) => Some(WindSpeed::Text(s.clone())),
        _ => None,
    }
}

fn cone_from_feature(feature: geojson::Feature, origin: ConeOrigin) -> Cone {
    let empty = JsonObject::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    let current_position = match (prop_f64(props, &["lat", "latitude"]), prop_f64(props, &["lon", "longitude"])) {
        (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)),
        _ => None,
    };

    Cone {
        storm_id: storm_id_from_props(props),
        storm_name: prop_str(props, &["stormname", "storm_name", "name"]),
        storm_type: prop_str(props, &["stormtype", "storm_type", "type"]).map(|t| storm_type_from_code(&t)),
        geometry: feature.geometry.and_then(geojson_to_multipolygon),
        current_position,
        movement: prop_str(props, &["movement", "tcdir"]),
        max_winds: wind_from_props(props),
        advisory_num: prop_str(props, &["advisnum", "advisory", "advnum"]),
        origin,
    }
}

/// Parses an ArcGIS GeoJSON query response into cones.
///
/// # Errors
/// - `FetchError::Parse` - body is not a GeoJSON FeatureCollection (the
///   map server reports failures as `{"error": {...}}` with status 200).
pub fn parse_cone_features(json: &str, origin: ConeOrigin) -> Result<Vec<Cone>, FetchError> {
    let geojson: GeoJson = json
        .parse()
        .map_err(|e: geojson::Error| FetchError::Parse(format!("GeoJSON deserialization failed: {}", e)))?;

    let collection = FeatureCollection::try_from(geojson)
        .map_err(|e| FetchError::Parse(format!("expected FeatureCollection: {}", e)))?;

    Ok(collection
        .features
        .into_iter()
        .map(|feature| cone_from_feature(feature, origin))
        .collect())
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// Fetches and parses one layer.
pub fn fetch_layer<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
    layer: u32,
    origin: ConeOrigin,
) -> Result<Vec<Cone>, FetchError> {
    let url = build_query_url(&feeds.map_server_url, layer);
    let body = fetcher.fetch(&url, http.feed_timeout())?.into_body(&url)?;
    parse_cone_features(&body, origin)
}

/// Queries several layers, keeping whatever succeeds.
///
/// Fails only when every layer failed, so a caller can tell "feed down"
/// from "no storms".
fn fetch_layers<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
    layers: impl IntoIterator<Item = (String, u32)>,
    origin: ConeOrigin,
) -> Result<Vec<Cone>, FetchError> {
    let mut cones = Vec::new();
    let mut succeeded = 0;
    let mut last_error = None;

    for (label, layer) in layers {
        match fetch_layer(fetcher, feeds, http, layer, origin) {
            Ok(found) => {
                log::debug!("Layer {} ({}): {} features", layer, label, found.len());
                succeeded += 1;
                cones.extend(found);
            }
            Err(e) => {
                log::debug!("Layer {} ({}) failed: {}", layer, label, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if succeeded == 0 => Err(e),
        _ => Ok(cones),
    }
}

/// Feed A: forecast cones for every configured storm slot.
pub fn fetch_storm_pages<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
) -> Result<Vec<Cone>, FetchError> {
    let layers = feeds
        .storm_page_layers
        .iter()
        .map(|slot| (slot.bin.clone(), slot.cone_layer));
    fetch_layers(fetcher, feeds, http, layers, ConeOrigin::StormPage)
}

/// Feed D: broad fallback layers.
pub fn fetch_fallback_cones<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
) -> Result<Vec<Cone>, FetchError> {
    let layers = feeds
        .fallback_layers
        .iter()
        .map(|layer| (format!("fallback {}", layer), *layer));
    fetch_layers(fetcher, feeds, http, layers, ConeOrigin::MapServer)
}
