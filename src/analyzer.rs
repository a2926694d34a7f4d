/// Location threat analysis: the full pipeline from feeds to report.
///
/// ```text
/// feeds ──► aggregate ──► distance filter ──┐
///                                           ├──► per-storm threat ──► report
/// alerts (primary + NHC text) ──────────────┘          ▲
///                                                      └── alert overrides
/// ```
///
/// [`ThreatAnalyzer`] holds only read-only configuration and borrowed
/// collaborators, so one instance can analyze any number of locations.

use std::path::Path;

use chrono::Utc;

use crate::alerts::{apply_alert_overrides, collect_alerts};
use crate::analysis::merge::aggregate_storm_data;
use crate::analysis::relevance::filter_storms_by_distance;
use crate::analysis::threat::analyze_storm_threat;
use crate::config::{AnalyzerConfig, load_config};
use crate::geometry::load_county_polygon;
use crate::ingest::http::{HttpFetcher, TextFetcher};
use crate::ingest::{AlertService, NhcStormFeeds, NwsAlertService, StormFeeds};
use crate::model::{AlertLevel, LatLon, ThreatReport};

pub struct ThreatAnalyzer<'a, S: StormFeeds, A: AlertService, F: TextFetcher> {
    config: &'a AnalyzerConfig,
    feeds: &'a S,
    alert_service: &'a A,
    fetcher: &'a F,
}

impl<'a, S: StormFeeds, A: AlertService, F: TextFetcher> ThreatAnalyzer<'a, S, A, F> {
    /// `fetcher` serves the NHC text products used as the secondary alert
    /// source.
    pub fn new(config: &'a AnalyzerConfig, feeds: &'a S, alert_service: &'a A, fetcher: &'a F) -> Self {
        Self {
            config,
            feeds,
            alert_service,
            fetcher,
        }
    }

    /// Analyzes one location. Never fails: every upstream problem degrades
    /// to missing data, and with nothing available the result is all clear.
    ///
    /// With `use_county_intersect` and a `county_path`, cones are tested
    /// against the county polygon instead of the point. If the polygon
    /// can't be loaded the point test is used for every storm.
    pub fn analyze_location_threat(
        &self,
        latitude: f64,
        longitude: f64,
        use_county_intersect: bool,
        county_path: Option<&Path>,
    ) -> ThreatReport {
        let target = LatLon::new(latitude, longitude);
        log::info!("Analyzing storm threat for {}", target);

        let county = match county_path.filter(|_| use_county_intersect) {
            Some(path) => match load_county_polygon(path) {
                Ok(polygon) => Some(polygon),
                Err(e) => {
                    log::warn!("County polygon unavailable, using point test: {}", e);
                    None
                }
            },
            None => None,
        };

        let cones = aggregate_storm_data(self.feeds, &self.config.analysis);
        let relevant = filter_storms_by_distance(cones, target, self.config.analysis.max_distance_km);
        let total_storms_analyzed = relevant.len();
        log::info!("{} storms within {:.0} km", total_storms_analyzed, self.config.analysis.max_distance_km);

        let alerts = collect_alerts(
            self.alert_service,
            self.fetcher,
            &self.config.alerts,
            &self.config.http,
            latitude,
            longitude,
        );

        let storm_threats: Vec<_> = relevant
            .into_iter()
            .map(|cone| analyze_storm_threat(cone, target, county.as_ref(), &alerts, &self.config.analysis))
            .filter(|threat| threat.in_cone)
            .collect();

        let is_in_any_cone = !storm_threats.is_empty();
        let from_storms = storm_threats
            .iter()
            .map(|t| t.threat_level)
            .max()
            .unwrap_or(AlertLevel::AllClear);
        let alert_level = apply_alert_overrides(from_storms, &alerts);

        if alert_level > from_storms {
            log::info!("Official alerts raised level from {} to {}", from_storms.label(), alert_level.label());
        }
        log::info!(
            "Analysis complete: {} (in cone of {} storm(s))",
            alert_level.label(),
            storm_threats.len()
        );

        ThreatReport {
            location: target,
            analyzed_at: Utc::now(),
            alert_level,
            storm_threats,
            is_in_any_cone,
            nws_alerts: alerts,
            total_storms_analyzed,
        }
    }
}

/// Analyzes a location against the live NHC, ATCF and NWS feeds.
///
/// Configuration comes from [`load_config`]; a config file that fails to
/// load is reported and the defaults are used. If the HTTP client itself
/// can't be built, no feed is reachable and the result is all clear.
pub fn analyze_location_threat(
    latitude: f64,
    longitude: f64,
    use_county_intersect: bool,
    county_path: Option<&Path>,
) -> ThreatReport {
    let config = load_config().unwrap_or_else(|e| {
        log::warn!("{}; using default configuration", e);
        AnalyzerConfig::default()
    });

    let fetcher = match HttpFetcher::new(&config.http) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            log::error!("HTTP client unavailable: {}", e);
            return ThreatReport {
                location: LatLon::new(latitude, longitude),
                analyzed_at: Utc::now(),
                alert_level: AlertLevel::AllClear,
                storm_threats: Vec::new(),
                is_in_any_cone: false,
                nws_alerts: Vec::new(),
                total_storms_analyzed: 0,
            };
        }
    };

    let feeds = NhcStormFeeds::new(&fetcher, &config);
    let alert_service = NwsAlertService::new(&fetcher, &config);

    ThreatAnalyzer::new(&config, &feeds, &alert_service, &fetcher).analyze_location_threat(
        latitude,
        longitude,
        use_county_intersect,
        county_path,
    )
}
