/// stormmon_service: tropical cyclone threat assessment for a single location.
///
/// # Module structure
///
/// ```text
/// stormmon_service
/// ├── model       - shared data types (Cone, Alert, AlertLevel, ThreatReport, FetchError, …)
/// ├── config      - analyzer configuration loader (stormmon.toml)
/// ├── geometry    - haversine distance, point buffers, polygon tests, county GeoJSON
/// ├── ingest
/// │   ├── http           - TextFetcher seam + blocking reqwest implementation
/// │   ├── arcgis         - NHC map server cone layers (storm pages, fallback)
/// │   ├── current_storms - NHC CurrentStorms.json
/// │   ├── atcf           - ATCF best-track invest positions
/// │   ├── nws            - api.weather.gov active alerts
/// │   ├── nhc_text       - NHC outlook/advisory scanning for the Bahamas
/// │   └── fixtures (test only) - representative feed payloads
/// ├── analysis
/// │   ├── merge     - keyed merge of the four storm feeds
/// │   ├── relevance - distance pre-filter
/// │   └── threat    - per-storm intersection, category, level, confidence
/// ├── alerts      - primary + secondary alert collection, level overrides
/// └── analyzer    - ThreatAnalyzer pipeline and the live entry point
/// ```

/// Public modules
pub mod alerts;
pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod geometry;
pub mod ingest;
pub mod model;

pub use analyzer::{ThreatAnalyzer, analyze_location_threat};
