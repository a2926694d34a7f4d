/// Storm Threat Monitor - command line front end
///
/// Runs one threat analysis for a location against the live NHC, ATCF and
/// NWS feeds and prints the result.
///
/// Usage:
///   cargo run --release -- --lat 25.05 --lon -77.35
///   cargo run --release -- --lat 26.12 --lon -80.14 --county broward.geojson
///   cargo run --release -- --lat 25.05 --lon -77.35 --json
///
/// Environment:
///   RUST_LOG            - log filter (default: info)
///   STORMMON_CONFIG     - path to an alternate stormmon.toml
///   STORMMON_USER_AGENT - User-Agent sent to api.weather.gov

use std::env;
use std::error::Error;
use std::path::PathBuf;

use stormmon_service::analyze_location_threat;
use stormmon_service::model::{AlertLevel, ThreatReport};

struct Args {
    latitude: f64,
    longitude: f64,
    county: Option<PathBuf>,
    json: bool,
}

fn usage(program: &str) -> String {
    format!("Usage: {} --lat LAT --lon LON [--county GEOJSON] [--json]", program)
}

fn parse_args(args: &[String]) -> Result<Args, Box<dyn Error>> {
    let program = args.first().map(String::as_str).unwrap_or("stormmon");
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut county: Option<PathBuf> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--lat" | "--lon" | "--county") => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a value\n{}", flag, usage(program)))?;
                match flag {
                    "--lat" => latitude = Some(value.parse::<f64>().map_err(|e| format!("invalid --lat {:?}: {}", value, e))?),
                    "--lon" => longitude = Some(value.parse::<f64>().map_err(|e| format!("invalid --lon {:?}: {}", value, e))?),
                    _ => county = Some(PathBuf::from(value)),
                }
                i += 2;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            other => return Err(format!("Unknown argument: {}\n{}", other, usage(program)).into()),
        }
    }

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(usage(program).into());
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("coordinates out of range: {}, {}", latitude, longitude).into());
    }

    Ok(Args { latitude, longitude, county, json })
}

fn level_icon(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::AllClear => "🟢",
        AlertLevel::TropicalStormThreat => "🟡",
        AlertLevel::TropicalStormWatchHurricaneThreat => "🟠",
        AlertLevel::TropicalStormWarningHurricaneWatchEvacuation => "🔴",
        AlertLevel::HurricaneWarning => "🚨",
    }
}

fn print_report(report: &ThreatReport) {
    println!(
        "{} Level {}: {}",
        level_icon(report.alert_level),
        report.alert_level.rank(),
        report.alert_level.label()
    );
    println!("   Location: {}", report.location);
    println!("   Storms analyzed: {}", report.total_storms_analyzed);
    println!("   In any cone: {}\n", if report.is_in_any_cone { "yes" } else { "no" });

    if !report.storm_threats.is_empty() {
        println!("🌀 Storms threatening this location:");
        for threat in &report.storm_threats {
            println!(
                "   {} ({:?}) - {} [confidence {:.0}%]",
                threat.cone.label(),
                threat.category,
                threat.threat_level.label(),
                threat.confidence * 100.0
            );
            if let Some(km) = threat.distance_km {
                println!("      Distance: {:.0} km", km);
            }
            if let Some(hours) = threat.estimated_arrival_hours {
                println!("      Estimated arrival: ~{} h", hours);
            }
            for warning in &threat.official_warnings {
                println!("      ⚠ {}", warning);
            }
        }
        println!();
    }

    if !report.nws_alerts.is_empty() {
        println!("📢 Official alerts:");
        for alert in &report.nws_alerts {
            println!("   [{:?}] {} - {}", alert.source, alert.event, alert.severity);
        }
        println!();
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args)?;

    let report = analyze_location_threat(
        args.latitude,
        args.longitude,
        args.county.is_some(),
        args.county.as_deref(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Log filter directives: `RUST_LOG` when set, otherwise info.
fn log_filter(rust_log: Option<String>) -> String {
    rust_log
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .parse_filters(&log_filter(env::var("RUST_LOG").ok()))
        .init();

    if let Err(e) = run() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None), "info");
        assert_eq!(log_filter(Some("  ".to_string())), "info");
        assert_eq!(
            log_filter(Some("stormmon_service=debug".to_string())),
            "stormmon_service=debug"
        );
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["stormmon", "--lat", "25.05", "--lon", "-77.35", "--json"])).unwrap();
        assert_eq!(parsed.latitude, 25.05);
        assert_eq!(parsed.longitude, -77.35);
        assert!(parsed.county.is_none());
        assert!(parsed.json);

        assert!(parse_args(&args(&["stormmon", "--lat", "25.05"])).is_err());
        assert!(parse_args(&args(&["stormmon", "--lat", "95", "--lon", "0"])).is_err());
        assert!(parse_args(&args(&["stormmon", "--lat", "25", "--lon", "-77", "--verbose"])).is_err());
    }
}
