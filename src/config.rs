/// Analyzer configuration loader - parses stormmon.toml
///
/// Separates feed endpoints, timeouts and scoring thresholds from code so
/// an operator can repoint a feed (the NHC map server renumbers layers
/// between seasons) without recompiling. Every field has a default, so a
/// missing file or a partial file is fine.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "stormmon.toml";

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "STORMMON_CONFIG";

/// Environment variable overriding `http.user_agent`.
pub const USER_AGENT_ENV: &str = "STORMMON_USER_AGENT";

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub analysis: AnalysisConfig,
    pub http: HttpConfig,
    pub feeds: FeedsConfig,
    pub alerts: AlertsConfig,
}

/// Scoring thresholds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Storms farther than this from the target are dropped
    pub max_distance_km: f64,
    /// Cones larger than this are treated as broad development areas
    pub large_area_threshold_sq_deg: f64,
    /// Radius of the synthetic cone drawn around an ATCF invest position
    pub invest_buffer_degrees: f64,
    /// Forward speed assumed when movement text carries none
    pub default_speed_kph: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 2000.0,
            large_area_threshold_sq_deg: 50.0,
            invest_buffer_degrees: 2.0,
            default_speed_kph: 15.0,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// api.weather.gov rejects requests without a descriptive agent
    pub user_agent: String,
    pub feed_timeout_secs: u64,
    pub outlook_timeout_secs: u64,
    pub advisory_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "stormmon_service (alerts@example.com)".to_string(),
            feed_timeout_secs: 15,
            outlook_timeout_secs: 15,
            advisory_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn outlook_timeout(&self) -> Duration {
        Duration::from_secs(self.outlook_timeout_secs)
    }

    pub fn advisory_timeout(&self) -> Duration {
        Duration::from_secs(self.advisory_timeout_secs)
    }
}

/// One active-storm slot on the NHC map server and its cone layer.
#[derive(Debug, Clone, Deserialize)]
pub struct StormSlotLayer {
    /// Slot bin number, e.g. "AT1"
    pub bin: String,
    pub cone_layer: u32,
}

/// Storm feed endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub current_storms_url: String,
    pub map_server_url: String,
    /// Feed A: per-storm cone layers, one per active slot
    pub storm_page_layers: Vec<StormSlotLayer>,
    /// Feed D: broad layers queried as a fallback
    pub fallback_layers: Vec<u32>,
    /// Directory listing of ATCF best-track files
    pub atcf_btk_url: String,
    /// Two-letter basin prefix used for invest files, lowercase
    pub atcf_basin: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            current_storms_url: "https://www.nhc.noaa.gov/CurrentStorms.json".to_string(),
            map_server_url:
                "https://mapservices.weather.noaa.gov/tropical/rest/services/tropical/NHC_tropical_weather/MapServer"
                    .to_string(),
            storm_page_layers: (1..=5)
                .map(|slot| StormSlotLayer {
                    bin: format!("AT{}", slot),
                    cone_layer: 7 + (slot - 1) * 26,
                })
                .collect(),
            fallback_layers: vec![2, 3],
            atcf_btk_url: "https://ftp.nhc.noaa.gov/atcf/btk/".to_string(),
            atcf_basin: "al".to_string(),
        }
    }
}

/// Alert endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub nws_base_url: String,
    pub outlook_url: String,
    pub advisory_urls: Vec<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            nws_base_url: "https://api.weather.gov".to_string(),
            outlook_url: "https://www.nhc.noaa.gov/text/refresh/MIATWOAT+shtml/latest.shtml".to_string(),
            advisory_urls: (1..=5)
                .map(|slot| {
                    format!(
                        "https://www.nhc.noaa.gov/text/refresh/MIATCPAT{}+shtml/latest.shtml",
                        slot
                    )
                })
                .collect(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AnalyzerConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Loads configuration from an explicit path.
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<AnalyzerConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads configuration from `$STORMMON_CONFIG` or `./stormmon.toml`.
///
/// A missing default file is not an error: defaults are used. A file that
/// exists but does not parse is reported, since silently ignoring an
/// operator's edits would be worse. `$STORMMON_USER_AGENT` is applied last.
pub fn load_config() -> Result<AnalyzerConfig, ConfigError> {
    let explicit = env::var(CONFIG_PATH_ENV).ok();

    let mut config = match explicit.as_deref() {
        Some(path) => load_config_from(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config_from(DEFAULT_CONFIG_PATH)?,
        None => {
            log::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
            AnalyzerConfig::default()
        }
    };

    if let Ok(agent) = env::var(USER_AGENT_ENV) {
        if !agent.trim().is_empty() {
            config.http.user_agent = agent;
        }
    }

    Ok(config)
}
