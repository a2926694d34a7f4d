/// api.weather.gov active-alerts client (primary official alerts).
///
/// Queried by point, so the response already contains only the alerts whose
/// zones cover the target. The endpoint returns every hazard type; only
/// tropical ones are kept.

use serde::Deserialize;

use crate::config::{AlertsConfig, HttpConfig};
use crate::ingest::http::TextFetcher;
use crate::model::{Alert, AlertSource, FetchError};

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Deserialize)]
struct AlertProperties {
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    severity: Option<String>,
    urgency: Option<String>,
}

// ---------------------------------------------------------------------------
// URL construction and filtering
// ---------------------------------------------------------------------------

pub fn build_alerts_url(base_url: &str, latitude: f64, longitude: f64) -> String {
    format!(
        "{}/alerts/active?point={:.4},{:.4}",
        base_url.trim_end_matches('/'),
        latitude,
        longitude
    )
}

const TROPICAL_EVENT_MARKERS: [&str; 4] = ["hurricane", "tropical storm", "storm surge", "extreme wind"];

/// True for tropical-cyclone hazard products.
pub fn is_tropical_event(event: &str) -> bool {
    let event = event.to_lowercase();
    TROPICAL_EVENT_MARKERS.iter().any(|marker| event.contains(marker))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses an alerts response, keeping tropical hazards only.
pub fn parse_alerts(json: &str) -> Result<Vec<Alert>, FetchError> {
    let response: AlertsResponse = serde_json::from_str(json)?;

    Ok(response
        .features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties;
            let event = props.event?;
            if !is_tropical_event(&event) {
                return None;
            }
            Some(Alert {
                event,
                headline: props.headline,
                description: props.description.unwrap_or_default(),
                severity: props.severity.unwrap_or_else(|| "Unknown".to_string()),
                urgency: props.urgency.unwrap_or_else(|| "Unknown".to_string()),
                source: AlertSource::Nws,
                storm: None,
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

pub fn fetch_hurricane_alerts<F: TextFetcher>(
    fetcher: &F,
    alerts: &AlertsConfig,
    http: &HttpConfig,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<Alert>, FetchError> {
    let url = build_alerts_url(&alerts.nws_base_url, latitude, longitude);
    let body = fetcher.fetch(&url, http.feed_timeout())?.into_body(&url)?;
    parse_alerts(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    #[test]
    fn test_build_alerts_url() {
        assert_eq!(
            build_alerts_url("https://api.weather.gov/", 25.774, -80.19),
            "https://api.weather.gov/alerts/active?point=25.7740,-80.1900"
        );
    }

    #[test]
    fn test_tropical_event_filter() {
        assert!(is_tropical_event("Hurricane Warning"));
        assert!(is_tropical_event("Tropical Storm Watch"));
        assert!(is_tropical_event("Storm Surge Warning"));
        assert!(is_tropical_event("Extreme Wind Warning"));
        assert!(!is_tropical_event("Rip Current Statement"));
        assert!(!is_tropical_event("Flood Watch"));
    }

    #[test]
    fn test_parse_alerts_keeps_tropical_only() {
        let alerts = parse_alerts(fixture_nws_alerts_json()).unwrap();
        assert_eq!(alerts.len(), 2);

        assert_eq!(alerts[0].event, "Hurricane Warning");
        assert_eq!(alerts[0].severity, "Extreme");
        assert!(alerts[0].headline.is_some());
        assert!(alerts[0].description.contains("Imelda"));
        assert_eq!(alerts[0].source, AlertSource::Nws);

        assert_eq!(alerts[1].event, "Tropical Storm Watch");
        assert_eq!(alerts[1].headline, None);
    }

    #[test]
    fn test_parse_alerts_empty_collection() {
        let json = r#"{ "type": "FeatureCollection", "features": [] }"#;
        assert!(parse_alerts(json).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_outside_coverage_is_status_error() {
        // api.weather.gov answers 404 for points outside US forecast zones
        let fetcher = CannedFetcher::new().status("/alerts/active", 404);
        let err = fetch_hurricane_alerts(&fetcher, &AlertsConfig::default(), &HttpConfig::default(), 25.05, -77.35)
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
    }
}
