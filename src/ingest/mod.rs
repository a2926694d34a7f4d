/// Upstream feed clients.
///
/// Each source gets its own file with the same split: URL construction,
/// a pure `parse_*` function over the response body, and a thin `fetch_*`
/// wrapper that goes through [`http::TextFetcher`].
///
/// - `arcgis`         - NHC map server cone layers (feeds A and D)
/// - `current_storms` - NHC `CurrentStorms.json` (feed B)
/// - `atcf`           - ATCF best-track invest positions (feed C)
/// - `nws`            - api.weather.gov active alerts (primary alerts)
/// - `nhc_text`       - NHC outlook/advisory text scanning (secondary alerts)

pub mod arcgis;
pub mod atcf;
pub mod current_storms;
pub mod http;
pub mod nhc_text;
pub mod nws;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::model::{Alert, Cone, FetchError, LatLon};
use self::http::TextFetcher;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// The four storm feeds, in merge-precedence order.
pub trait StormFeeds {
    /// Feed A: per-storm forecast cones.
    fn storm_pages(&self) -> Result<Vec<Cone>, FetchError>;
    /// Feed B: consolidated named-storm listing.
    fn current_storms(&self) -> Result<Vec<Cone>, FetchError>;
    /// Feed C: short-lived disturbance positions, keyed by storm id.
    fn invest_positions(&self) -> Result<Vec<(String, LatLon)>, FetchError>;
    /// Feed D: broad map-server fallback.
    fn map_server(&self) -> Result<Vec<Cone>, FetchError>;
}

/// Primary official-alert service.
pub trait AlertService {
    fn alerts_for_point(&self, latitude: f64, longitude: f64) -> Result<Vec<Alert>, FetchError>;
}

/// Live NHC/ATCF feeds.
pub struct NhcStormFeeds<'a, F: TextFetcher> {
    fetcher: &'a F,
    config: &'a AnalyzerConfig,
}

impl<'a, F: TextFetcher> NhcStormFeeds<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a AnalyzerConfig) -> Self {
        Self { fetcher, config }
    }
}

impl<F: TextFetcher> StormFeeds for NhcStormFeeds<'_, F> {
    fn storm_pages(&self) -> Result<Vec<Cone>, FetchError> {
        arcgis::fetch_storm_pages(self.fetcher, &self.config.feeds, &self.config.http)
    }

    fn current_storms(&self) -> Result<Vec<Cone>, FetchError> {
        current_storms::fetch_current_storms(self.fetcher, &self.config.feeds, &self.config.http)
    }

    fn invest_positions(&self) -> Result<Vec<(String, LatLon)>, FetchError> {
        atcf::fetch_invest_positions(self.fetcher, &self.config.feeds, &self.config.http, chrono::Utc::now())
    }

    fn map_server(&self) -> Result<Vec<Cone>, FetchError> {
        arcgis::fetch_fallback_cones(self.fetcher, &self.config.feeds, &self.config.http)
    }
}

/// Live api.weather.gov alert service.
pub struct NwsAlertService<'a, F: TextFetcher> {
    fetcher: &'a F,
    config: &'a AnalyzerConfig,
}

impl<'a, F: TextFetcher> NwsAlertService<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a AnalyzerConfig) -> Self {
        Self { fetcher, config }
    }
}

impl<F: TextFetcher> AlertService for NwsAlertService<'_, F> {
    fn alerts_for_point(&self, latitude: f64, longitude: f64) -> Result<Vec<Alert>, FetchError> {
        nws::fetch_hurricane_alerts(self.fetcher, &self.config.alerts, &self.config.http, latitude, longitude)
    }
}

// ---------------------------------------------------------------------------
// Shared field normalization
// ---------------------------------------------------------------------------

static ATCF_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2})(\d{2})(\d{4})?$").unwrap_or_else(|_| unreachable!()));

/// Normalizes a storm identifier to the short ATCF form (`AL09`).
///
/// Feeds disagree: `CurrentStorms.json` uses `al092025`, the map server
/// `AL092025`, ATCF `AL, 09`. Anything that does not look like an ATCF id
/// is uppercased and kept. Blank input yields `None`.
pub fn normalize_storm_id(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    match ATCF_ID.captures(&upper) {
        Some(caps) => Some(format!("{}{}", &caps[1], &caps[2])),
        None => Some(upper),
    }
}

/// Expands NHC classification codes to the storm-type text used for
/// categorization. Unrecognized values pass through unchanged.
pub fn storm_type_from_code(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "HU" => "Hurricane".to_string(),
        "MH" => "Major Hurricane".to_string(),
        "TS" => "Tropical Storm".to_string(),
        "TD" => "Tropical Depression".to_string(),
        "STS" | "SS" => "Subtropical Storm".to_string(),
        "STD" | "SD" => "Subtropical Depression".to_string(),
        "PTC" => "Potential Tropical Cyclone".to_string(),
        "PC" | "PTC_POST" => "Post-Tropical Cyclone".to_string(),
        "DB" | "LO" | "WV" => "Tropical Disturbance".to_string(),
        _ => code.trim().to_string(),
    }
}
