/// NHC `CurrentStorms.json` client (feed B).
///
/// The consolidated listing of every named Atlantic/Pacific system with an
/// active advisory package. It has positions, intensity and motion but no
/// cone geometry; cones built from it rely on the point-based distance
/// filter and will only test in-cone when a richer feed supplied the
/// polygon first.

use serde::Deserialize;

use crate::config::{FeedsConfig, HttpConfig};
use crate::ingest::http::TextFetcher;
use crate::ingest::{normalize_storm_id, storm_type_from_code};
use crate::model::{Cone, ConeOrigin, FetchError, LatLon, WindSpeed};

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CurrentStormsResponse {
    #[serde(rename = "activeStorms", default)]
    active_storms: Vec<ActiveStorm>,
}

#[derive(Deserialize)]
struct ActiveStorm {
    id: Option<String>,
    name: Option<String>,
    classification: Option<String>,
    intensity: Option<WindSpeed>,
    #[serde(rename = "latitudeNumeric")]
    latitude_numeric: Option<f64>,
    #[serde(rename = "longitudeNumeric")]
    longitude_numeric: Option<f64>,
    /// Degrees, meteorological (direction of travel)
    #[serde(rename = "movementDir")]
    movement_dir: Option<f64>,
    /// mph
    #[serde(rename = "movementSpeed")]
    movement_speed: Option<f64>,
    #[serde(rename = "publicAdvisory")]
    public_advisory: Option<PublicAdvisory>,
}

#[derive(Deserialize)]
struct PublicAdvisory {
    #[serde(rename = "advNum")]
    adv_num: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// 16-point compass name for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Movement text in advisory style, e.g. "NNW at 7 mph".
///
/// A stationary storm has no usable speed and yields `None` rather than
/// "N at 0 mph".
fn movement_text(dir: Option<f64>, speed_mph: Option<f64>) -> Option<String> {
    let speed = speed_mph.filter(|s| s.is_finite() && *s > 0.0)?;
    let dir = dir.filter(|d| d.is_finite())?;
    Some(format!("{} at {} mph", compass_point(dir), speed.round() as i64))
}

fn cone_from_active_storm(storm: ActiveStorm) -> Cone {
    let current_position = match (storm.latitude_numeric, storm.longitude_numeric) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(LatLon::new(lat, lon)),
        _ => None,
    };

    Cone {
        storm_id: storm.id.as_deref().and_then(normalize_storm_id),
        storm_name: storm.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        storm_type: storm.classification.as_deref().map(storm_type_from_code),
        geometry: None,
        current_position,
        movement: movement_text(storm.movement_dir, storm.movement_speed),
        max_winds: storm.intensity,
        advisory_num: storm.public_advisory.and_then(|a| a.adv_num),
        origin: ConeOrigin::CurrentStorms,
    }
}

/// Parses a `CurrentStorms.json` body into cones.
///
/// # Errors
/// - `FetchError::Parse` - body is not the expected JSON shape
pub fn parse_current_storms(json: &str) -> Result<Vec<Cone>, FetchError> {
    let response: CurrentStormsResponse = serde_json::from_str(json)?;
    Ok(response.active_storms.into_iter().map(cone_from_active_storm).collect())
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

pub fn fetch_current_storms<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
) -> Result<Vec<Cone>, FetchError> {
    let url = &feeds.current_storms_url;
    let body = fetcher.fetch(url, http.feed_timeout())?.into_body(url)?;
    parse_current_storms(&body)
}
