/// Official alert collection and alert-driven level overrides.
///
/// Two independent sources feed the alert list: the primary
/// [`AlertService`] (api.weather.gov by default) and NHC text products for
/// the Bahamas. Either may fail without affecting the other.

use crate::analysis::threat::alert_level_for_event;
use crate::config::{AlertsConfig, HttpConfig};
use crate::ingest::http::TextFetcher;
use crate::ingest::{AlertService, nhc_text};
use crate::model::{Alert, AlertLevel};

/// All alerts for the location: primary first, then secondary.
pub fn collect_alerts<A: AlertService, F: TextFetcher>(
    service: &A,
    fetcher: &F,
    alerts: &AlertsConfig,
    http: &HttpConfig,
    latitude: f64,
    longitude: f64,
) -> Vec<Alert> {
    let mut collected = match service.alerts_for_point(latitude, longitude) {
        Ok(primary) => primary,
        Err(e) => {
            log::warn!("Primary alert source failed: {}", e);
            Vec::new()
        }
    };
    let primary_count = collected.len();

    collected.extend(nhc_text::fetch_regional_alerts(fetcher, alerts, http, latitude, longitude));

    log::info!(
        "Alerts: {} primary, {} from NHC text products",
        primary_count,
        collected.len() - primary_count
    );
    collected
}

/// Raises `current` to the highest level implied by any alert. Never
/// lowers it.
pub fn apply_alert_overrides(current: AlertLevel, alerts: &[Alert]) -> AlertLevel {
    alerts
        .iter()
        .filter_map(|a| alert_level_for_event(&a.event))
        .fold(current, AlertLevel::max)
}
