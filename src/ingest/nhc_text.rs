/// NHC text products as a secondary alert source for the Bahamas.
///
/// api.weather.gov covers US forecast zones only. Watches and warnings
/// that the Bahamas government issues appear solely in NHC prose: the
/// Tropical Weather Outlook and the per-storm public advisories
/// (`MIATCPAT1`..`MIATCPAT5`). This module scans those documents.
///
/// Scanning is pure: [`scan_outlook`] and [`scan_advisory`] take raw text
/// and a location and return alerts. [`fetch_regional_alerts`] is the only
/// function that touches the network.
///
/// Advisories list watches and warnings in sections like:
///
/// ```text
/// A Tropical Storm Warning is in effect for...
/// * Central Bahamas
///
/// A Tropical Storm Watch is in effect for...
/// * Northwestern Bahamas excluding Andros Island
/// ```
///
/// For locations in a recognised sub-region the section a region line falls
/// under decides the alert, so a warning for the central islands does not
/// leak onto Nassau.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{AlertsConfig, HttpConfig};
use crate::ingest::http::TextFetcher;
use crate::model::{Alert, AlertSource};

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// Latitude/longitude bounding box, inclusive on every edge.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Region {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude) && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

/// Whole area in which NHC text products are consulted.
pub const BAHAMAS: Region = Region { min_lat: 23.0, max_lat: 27.0, min_lon: -80.0, max_lon: -72.0 };

/// Nassau / New Providence and the northwestern islands.
pub const NORTHWESTERN_BAHAMAS: Region = Region { min_lat: 24.5, max_lat: 26.5, min_lon: -78.5, max_lon: -76.5 };

/// Exuma and the central islands.
pub const CENTRAL_BAHAMAS: Region = Region { min_lat: 23.0, max_lat: 25.0, min_lon: -77.0, max_lon: -75.0 };

/// Sub-region used to pick the advisory scanning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BahamasZone {
    Northwestern,
    Central,
    Other,
}

impl BahamasZone {
    /// Zone for a location already inside [`BAHAMAS`]. The sub-boxes
    /// overlap; northwestern wins.
    pub fn for_location(latitude: f64, longitude: f64) -> Self {
        if NORTHWESTERN_BAHAMAS.contains(latitude, longitude) {
            BahamasZone::Northwestern
        } else if CENTRAL_BAHAMAS.contains(latitude, longitude) {
            BahamasZone::Central
        } else {
            BahamasZone::Other
        }
    }

    /// Lowercase phrases that place an advisory line in this zone.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            BahamasZone::Northwestern => &["northwestern bahamas", "new providence"],
            BahamasZone::Central => &["central bahamas", "exuma", "exumas"],
            BahamasZone::Other => &[],
        }
    }

    fn area_text(self) -> &'static str {
        match self {
            BahamasZone::Northwestern => "northwestern Bahamas including New Providence",
            BahamasZone::Central => "central Bahamas including Exuma",
            BahamasZone::Other => "portions of the Bahamas",
        }
    }
}

pub fn in_bahamas_region(latitude: f64, longitude: f64) -> bool {
    BAHAMAS.contains(latitude, longitude)
}

// ---------------------------------------------------------------------------
// Alert construction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Product {
    TropicalStormWatch,
    TropicalStormWarning,
    HurricaneWatch,
    HurricaneWarning,
}

impl Product {
    fn event(self) -> &'static str {
        match self {
            Product::TropicalStormWatch => "Tropical Storm Watch",
            Product::TropicalStormWarning => "Tropical Storm Warning",
            Product::HurricaneWatch => "Hurricane Watch",
            Product::HurricaneWarning => "Hurricane Warning",
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Product::TropicalStormWatch => "tropical storm watch",
            Product::TropicalStormWarning => "tropical storm warning",
            Product::HurricaneWatch => "hurricane watch",
            Product::HurricaneWarning => "hurricane warning",
        }
    }

    fn severity(self) -> &'static str {
        match self {
            Product::TropicalStormWatch | Product::TropicalStormWarning => "Moderate",
            Product::HurricaneWatch => "Severe",
            Product::HurricaneWarning => "Extreme",
        }
    }

    fn urgency(self) -> &'static str {
        match self {
            Product::TropicalStormWatch | Product::HurricaneWatch => "Expected",
            Product::TropicalStormWarning | Product::HurricaneWarning => "Immediate",
        }
    }

    fn alert(self, area: &str, storm: Option<&str>) -> Alert {
        Alert {
            event: self.event().to_string(),
            headline: None,
            description: format!("{} in effect for {}", self.event(), area),
            severity: self.severity().to_string(),
            urgency: self.urgency().to_string(),
            source: AlertSource::Nhc,
            storm: storm.map(str::to_string),
        }
    }
}

const ALL_PRODUCTS: [Product; 4] = [
    Product::TropicalStormWatch,
    Product::TropicalStormWarning,
    Product::HurricaneWatch,
    Product::HurricaneWarning,
];

fn mentions_bahamas(lower: &str) -> bool {
    lower.contains("bahamas") || lower.contains("nassau")
}

// ---------------------------------------------------------------------------
// Outlook
// ---------------------------------------------------------------------------

/// Scans a Tropical Weather Outlook. One alert per watch/warning phrase
/// present, provided the outlook mentions the Bahamas at all.
pub fn scan_outlook(text: &str) -> Vec<Alert> {
    let lower = text.to_lowercase();
    if !mentions_bahamas(&lower) {
        return Vec::new();
    }

    ALL_PRODUCTS
        .into_iter()
        .filter(|product| lower.contains(product.phrase()))
        .map(|product| product.alert(BahamasZone::Other.area_text(), None))
        .collect()
}

// ---------------------------------------------------------------------------
// Advisories
// ---------------------------------------------------------------------------

static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"hurricane\s+(\w+)",
        r"tropical storm\s+(\w+)",
        r"potential tropical cyclone\s+(\w+)",
        r"(\w+)\s+advisory",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|_| unreachable!()))
    .collect()
});

/// Words that follow "hurricane"/"tropical storm" in boilerplate rather
/// than naming a storm ("National Hurricane Center", "Tropical Storm Watch").
const NOT_A_NAME: &[&str] = &[
    "a", "advisory", "and", "are", "center", "conditions", "force", "forecast", "hunter", "hunters",
    "information", "intermediate", "is", "local", "of", "public", "season", "statement", "the", "to",
    "warning", "warnings", "watch", "watches", "wind", "winds",
];

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Storm name from advisory text: first pattern, in order, with a
/// capture that is not boilerplate. "Unknown Storm" when none match.
pub fn extract_storm_name(text: &str) -> String {
    let lower = text.to_lowercase();
    NAME_PATTERNS
        .iter()
        .find_map(|re| {
            re.captures_iter(&lower)
                .map(|caps| caps[1].to_string())
                .find(|word| !NOT_A_NAME.contains(&word.as_str()))
        })
        .map(|word| title_case(&word))
        .unwrap_or_else(|| "Unknown Storm".to_string())
}

/// Line-scoped scan: the first region line that sits under an open
/// tropical storm watch or warning section decides the product.
fn scan_sections(lower: &str, keywords: &[&str]) -> Option<Product> {
    let mut section: Option<Product> = None;

    for line in lower.lines() {
        let line = line.trim();

        if line.contains("tropical storm watch is in effect for") {
            section = Some(Product::TropicalStormWatch);
            continue;
        }
        if line.contains("tropical storm warning is in effect for") {
            section = Some(Product::TropicalStormWarning);
            continue;
        }
        if line.starts_with("a ") && (line.contains("watch") || line.contains("warning")) {
            section = None;
            continue;
        }

        if let Some(product) = section {
            if keywords.iter().any(|k| line.contains(k)) {
                return Some(product);
            }
        }
    }

    None
}

/// Scans one public advisory for alerts affecting the location.
pub fn scan_advisory(text: &str, latitude: f64, longitude: f64) -> Vec<Alert> {
    let lower = text.to_lowercase();
    if !mentions_bahamas(&lower) {
        return Vec::new();
    }

    let storm = extract_storm_name(&lower);
    let zone = BahamasZone::for_location(latitude, longitude);
    let mut alerts = Vec::new();

    match zone {
        BahamasZone::Northwestern | BahamasZone::Central => {
            if let Some(product) = scan_sections(&lower, zone.keywords()) {
                alerts.push(product.alert(zone.area_text(), Some(storm.as_str())));
            }
        }
        BahamasZone::Other => {
            for product in [Product::TropicalStormWatch, Product::TropicalStormWarning] {
                if lower.contains(product.phrase()) && lower.contains("bahamas") {
                    alerts.push(product.alert(zone.area_text(), Some(storm.as_str())));
                }
            }
        }
    }

    for product in [Product::HurricaneWatch, Product::HurricaneWarning] {
        if lower.contains(product.phrase()) {
            alerts.push(product.alert(BahamasZone::Other.area_text(), Some(storm.as_str())));
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

fn fetch_text<F: TextFetcher>(fetcher: &F, url: &str, timeout: std::time::Duration) -> Option<String> {
    match fetcher.fetch(url, timeout) {
        Ok(doc) if doc.is_ok() => Some(doc.body),
        Ok(doc) => {
            log::debug!("Skipping {} (HTTP {})", url, doc.status);
            None
        }
        Err(e) => {
            log::debug!("Could not fetch {}: {}", url, e);
            None
        }
    }
}

/// Secondary alerts for a location. Outside the Bahamas region this
/// returns immediately without fetching anything. Individual document
/// failures are skipped; whatever was found is returned.
pub fn fetch_regional_alerts<F: TextFetcher>(
    fetcher: &F,
    alerts: &AlertsConfig,
    http: &HttpConfig,
    latitude: f64,
    longitude: f64,
) -> Vec<Alert> {
    if !in_bahamas_region(latitude, longitude) {
        return Vec::new();
    }

    let mut found = Vec::new();

    if let Some(text) = fetch_text(fetcher, &alerts.outlook_url, http.outlook_timeout()) {
        found.extend(scan_outlook(&text));
    }

    for url in &alerts.advisory_urls {
        if let Some(text) = fetch_text(fetcher, url, http.advisory_timeout()) {
            let scanned = scan_advisory(&text, latitude, longitude);
            if !scanned.is_empty() {
                log::debug!("{} alert(s) from {}", scanned.len(), url);
            }
            found.extend(scanned);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;

    const NASSAU: (f64, f64) = (25.05, -77.35);
    const EXUMA: (f64, f64) = (23.5, -75.9);
    const INAGUA: (f64, f64) = (23.9, -73.5);

    fn events(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.event.as_str()).collect()
    }

    #[test]
    fn test_region_boundaries_inclusive() {
        assert!(in_bahamas_region(23.0, -80.0));
        assert!(in_bahamas_region(27.0, -72.0));
        assert!(!in_bahamas_region(30.0, -80.0));
        assert!(!in_bahamas_region(25.0, -71.9));
    }

    #[test]
    fn test_zone_selection() {
        assert_eq!(BahamasZone::for_location(NASSAU.0, NASSAU.1), BahamasZone::Northwestern);
        assert_eq!(BahamasZone::for_location(EXUMA.0, EXUMA.1), BahamasZone::Central);
        assert_eq!(BahamasZone::for_location(INAGUA.0, INAGUA.1), BahamasZone::Other);
        // In both sub-boxes: northwestern is checked first
        assert_eq!(BahamasZone::for_location(25.0, -77.0), BahamasZone::Northwestern);
    }

    #[test]
    fn test_split_advisory_nassau_gets_watch_only() {
        let alerts = scan_advisory(fixture_advisory_bahamas_split(), NASSAU.0, NASSAU.1);
        assert_eq!(events(&alerts), vec!["Tropical Storm Watch"]);
        assert_eq!(
            alerts[0].description,
            "Tropical Storm Watch in effect for northwestern Bahamas including New Providence"
        );
        assert_eq!(alerts[0].severity, "Moderate");
        assert_eq!(alerts[0].urgency, "Expected");
        assert_eq!(alerts[0].source, AlertSource::Nhc);
        assert_eq!(alerts[0].storm.as_deref(), Some("Nine"));
    }

    #[test]
    fn test_split_advisory_line_scan_at_overlap_point() {
        let alerts = scan_advisory(fixture_advisory_bahamas_split(), 25.0, -77.0);
        assert_eq!(events(&alerts), vec!["Tropical Storm Watch"]);
    }

    #[test]
    fn test_split_advisory_exuma_gets_warning() {
        let alerts = scan_advisory(fixture_advisory_bahamas_split(), EXUMA.0, EXUMA.1);
        assert_eq!(events(&alerts), vec!["Tropical Storm Warning"]);
        assert_eq!(alerts[0].urgency, "Immediate");
        assert!(alerts[0].description.contains("central Bahamas including Exuma"));
    }

    #[test]
    fn test_split_advisory_elsewhere_uses_document_phrases() {
        let alerts = scan_advisory(fixture_advisory_bahamas_split(), INAGUA.0, INAGUA.1);
        assert_eq!(events(&alerts), vec!["Tropical Storm Watch", "Tropical Storm Warning"]);
        assert!(alerts.iter().all(|a| a.description.ends_with("portions of the Bahamas")));
    }

    #[test]
    fn test_hurricane_watch_applies_in_every_zone() {
        let alerts = scan_advisory(fixture_advisory_hurricane_watch(), NASSAU.0, NASSAU.1);
        assert_eq!(events(&alerts), vec!["Tropical Storm Warning", "Hurricane Watch"]);
        assert_eq!(alerts[1].severity, "Severe");
        assert_eq!(alerts[0].storm.as_deref(), Some("Imelda"));

        let alerts = scan_advisory(fixture_advisory_hurricane_watch(), EXUMA.0, EXUMA.1);
        assert_eq!(events(&alerts), vec!["Hurricane Watch"]);
    }

    #[test]
    fn test_advisory_without_bahamas_is_ignored() {
        assert!(scan_advisory(fixture_advisory_unrelated(), NASSAU.0, NASSAU.1).is_empty());
    }

    #[test]
    fn test_section_closes_on_explanatory_line() {
        // The region line after the closing "A ... warning means" line is
        // outside any section.
        let text = "A Tropical Storm Warning is in effect for...\n\
                    * Bimini\n\
                    A Tropical Storm Warning means conditions are expected.\n\
                    * Northwestern Bahamas mentioned again\n";
        assert!(scan_advisory(text, NASSAU.0, NASSAU.1).is_empty());
    }

    #[test]
    fn test_outlook_scan() {
        let alerts = scan_outlook(fixture_outlook_bahamas());
        assert_eq!(events(&alerts), vec!["Tropical Storm Watch"]);
        assert_eq!(alerts[0].description, "Tropical Storm Watch in effect for portions of the Bahamas");
        assert_eq!(alerts[0].storm, None);

        assert!(scan_outlook(fixture_outlook_quiet()).is_empty());
    }

    #[test]
    fn test_extract_storm_name_skips_boilerplate() {
        assert_eq!(extract_storm_name(fixture_advisory_bahamas_split()), "Nine");
        assert_eq!(extract_storm_name(fixture_advisory_hurricane_watch()), "Imelda");
        assert_eq!(extract_storm_name(fixture_advisory_unrelated()), "Humberto");
        assert_eq!(extract_storm_name("no names here"), "Unknown Storm");
    }

    #[test]
    fn test_fetch_outside_region_makes_no_requests() {
        let fetcher = CannedFetcher::new();
        let alerts = fetch_regional_alerts(&fetcher, &AlertsConfig::default(), &HttpConfig::default(), 30.0, -80.0);
        assert!(alerts.is_empty());
        assert_eq!(fetcher.call_count(), 0);
    }

    #[test]
    fn test_fetch_skips_failed_documents() {
        let http = HttpConfig::default();
        let fetcher = CannedFetcher::new()
            .route("MIATWOAT", fixture_outlook_quiet())
            .route("MIATCPAT4", fixture_advisory_bahamas_split())
            .route("MIATCPAT3", fixture_advisory_unrelated())
            .fail("MIATCPAT1")
            .status("MIATCPAT2", 500);

        let alerts = fetch_regional_alerts(&fetcher, &AlertsConfig::default(), &http, NASSAU.0, NASSAU.1);
        assert_eq!(events(&alerts), vec!["Tropical Storm Watch"]);
        assert_eq!(fetcher.call_count(), 6);
        assert_eq!(fetcher.timeouts_for("MIATWOAT"), vec![http.outlook_timeout()]);
        assert!(fetcher.timeouts_for("MIATCPAT").iter().all(|t| *t == http.advisory_timeout()));
    }
}
