/// Core data types for the storm threat service.
///
/// This module defines the shared domain model imported by all other
/// modules: storm cones, official alerts, storm categories, the ordered
/// alert-level scale, and per-storm threat assessments. It contains no
/// I/O; the only logic is small value coercions and the level ordering.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions and wind
// ---------------------------------------------------------------------------

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Maximum sustained wind as reported upstream.
///
/// Feeds disagree on representation: the ArcGIS layers report a number,
/// `CurrentStorms.json` reports `"intensity": "45"`. Both are kept as
/// received and coerced on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindSpeed {
    Knots(f64),
    Text(String),
}

impl WindSpeed {
    /// Wind in knots. Text that is not a plain integer coerces to 0.
    pub fn knots(&self) -> f64 {
        match self {
            WindSpeed::Knots(kt) if kt.is_finite() => *kt,
            WindSpeed::Knots(_) => 0.0,
            WindSpeed::Text(raw) => raw.trim().parse::<i64>().map(|kt| kt as f64).unwrap_or(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Cones
// ---------------------------------------------------------------------------

/// Which upstream feed produced a cone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConeOrigin {
    /// Per-storm forecast-cone layers (feed A).
    StormPage,
    /// Consolidated `CurrentStorms.json` listing (feed B).
    CurrentStorms,
    /// Synthesized from an ATCF invest position (feed C).
    Atcf,
    /// Map-server fallback query (feed D).
    MapServer,
}

/// A storm or disturbance record with its forecast-uncertainty geometry.
///
/// Created by the source aggregator and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Cone {
    pub storm_id: Option<String>,
    pub storm_name: Option<String>,
    pub storm_type: Option<String>,
    /// Cone polygon(s) in (lon, lat) coordinate order.
    #[serde(skip)]
    pub geometry: Option<MultiPolygon<f64>>,
    pub current_position: Option<LatLon>,
    pub movement: Option<String>,
    pub max_winds: Option<WindSpeed>,
    pub advisory_num: Option<String>,
    pub origin: ConeOrigin,
}

impl Cone {
    /// An otherwise empty cone from the given feed.
    pub fn new(origin: ConeOrigin) -> Self {
        Self {
            storm_id: None,
            storm_name: None,
            storm_type: None,
            geometry: None,
            current_position: None,
            movement: None,
            max_winds: None,
            advisory_num: None,
            origin,
        }
    }

    /// Best human-readable label for log lines.
    pub fn label(&self) -> &str {
        self.storm_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.storm_id.as_deref())
            .unwrap_or("unidentified system")
    }

    /// Wind in knots, 0 when absent or unparseable.
    pub fn wind_knots(&self) -> f64 {
        self.max_winds.as_ref().map(WindSpeed::knots).unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Where an official alert came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSource {
    /// National Weather Service active-alerts API.
    #[serde(rename = "NWS")]
    Nws,
    /// National Hurricane Center text products.
    #[serde(rename = "NHC")]
    Nhc,
}

/// An official watch or warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub event: String,
    pub headline: Option<String>,
    pub description: String,
    pub severity: String,
    pub urgency: String,
    pub source: AlertSource,
    /// Storm the alert was issued for, when the source names one.
    pub storm: Option<String>,
}

// ---------------------------------------------------------------------------
// Categories and levels
// ---------------------------------------------------------------------------

/// Storm classification used for threat scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormCategory {
    /// Category 3-5.
    HurricaneMajor,
    /// Category 1-2.
    HurricaneMinor,
    TropicalStorm,
    TropicalDepression,
    InvestDisturbance,
    DevelopmentArea,
    Unknown,
}

impl StormCategory {
    /// True for the categories with well-defined official advisories.
    pub fn is_well_defined(self) -> bool {
        matches!(
            self,
            StormCategory::HurricaneMajor | StormCategory::HurricaneMinor | StormCategory::TropicalStorm
        )
    }
}

/// Location alert level, ordered by severity.
///
/// Comparison goes through [`AlertLevel::rank`], not declaration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    #[default]
    AllClear,
    TropicalStormThreat,
    TropicalStormWatchHurricaneThreat,
    TropicalStormWarningHurricaneWatchEvacuation,
    HurricaneWarning,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 5] = [
        AlertLevel::AllClear,
        AlertLevel::TropicalStormThreat,
        AlertLevel::TropicalStormWatchHurricaneThreat,
        AlertLevel::TropicalStormWarningHurricaneWatchEvacuation,
        AlertLevel::HurricaneWarning,
    ];

    /// Numeric severity, 1 (all clear) through 5 (hurricane warning).
    pub fn rank(self) -> u8 {
        match self {
            AlertLevel::AllClear => 1,
            AlertLevel::TropicalStormThreat => 2,
            AlertLevel::TropicalStormWatchHurricaneThreat => 3,
            AlertLevel::TropicalStormWarningHurricaneWatchEvacuation => 4,
            AlertLevel::HurricaneWarning => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertLevel::AllClear => "All Clear",
            AlertLevel::TropicalStormThreat => "Tropical Storm Threat",
            AlertLevel::TropicalStormWatchHurricaneThreat => "Tropical Storm Watch / Hurricane Threat",
            AlertLevel::TropicalStormWarningHurricaneWatchEvacuation => {
                "Tropical Storm Warning / Hurricane Watch / Evacuation"
            }
            AlertLevel::HurricaneWarning => "Hurricane Warning",
        }
    }
}

impl Ord for AlertLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for AlertLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Assessment types
// ---------------------------------------------------------------------------

/// Threat assessment for one storm against one location.
#[derive(Debug, Clone, Serialize)]
pub struct StormThreat {
    pub cone: Cone,
    pub category: StormCategory,
    pub in_cone: bool,
    pub distance_km: Option<f64>,
    pub threat_level: AlertLevel,
    /// 0.0 to 1.0
    pub confidence: f64,
    pub official_warnings: Vec<String>,
    pub estimated_arrival_hours: Option<u32>,
}

/// Overall result of analysing one location.
#[derive(Debug, Clone, Serialize)]
pub struct ThreatReport {
    pub location: LatLon,
    pub analyzed_at: DateTime<Utc>,
    pub alert_level: AlertLevel,
    /// In-cone storms only.
    pub storm_threats: Vec<StormThreat>,
    pub is_in_any_cone: bool,
    pub nws_alerts: Vec<Alert>,
    /// Storm count after the relevance filter.
    pub total_storms_analyzed: usize,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or parsing an upstream feed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP response.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The feed answered but had nothing usable.
    #[error("No data available: {0}")]
    NoData(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(format!("JSON deserialization failed: {}", e))
    }
}

/// Errors from geometry loading or evaluation.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    /// Valid GeoJSON that contains no polygon.
    #[error("Unsupported geometry: {0}")]
    Unsupported(String),

    /// Empty polygon or non-finite coordinates.
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
