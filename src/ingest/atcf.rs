/// ATCF best-track client (feed C).
///
/// Invests (numbers 90-99) exist for days before they get a cone, and only
/// show up reliably in the ATCF best-track ("b-deck") directory. Each file
/// `b{basin}{num}{year}.dat` is a CSV of six-hourly fixes:
///
/// ```text
/// AL, 94, 2025092818,   , BEST,   0, 156N,  534W,  30, 1009, DB, ...
/// ```
///
/// Fields used: basin, number, fix time (YYYYMMDDHH, UTC), latitude and
/// longitude in tenths of a degree with a hemisphere suffix. Only the last
/// fix of each file matters.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

use crate::config::{FeedsConfig, HttpConfig};
use crate::ingest::http::TextFetcher;
use crate::ingest::normalize_storm_id;
use crate::model::{FetchError, LatLon};

/// Invest numbers are recycled through a season; a file whose last fix is
/// older than this describes a deactivated system.
pub const INVEST_MAX_AGE_HOURS: i64 = 48;

/// One parsed b-deck fix.
#[derive(Debug, Clone, PartialEq)]
pub struct BestTrackFix {
    pub storm_id: String,
    pub time: DateTime<Utc>,
    pub position: LatLon,
}

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// Invest file names in a btk directory listing, restricted to the most
/// recent year present.
pub fn parse_invest_listing(html: &str, basin: &str) -> Result<Vec<String>, FetchError> {
    let pattern = format!(r"b{}(9\d)(\d{{4}})\.dat", regex::escape(&basin.to_lowercase()));
    let re = Regex::new(&pattern).map_err(|e| FetchError::Parse(format!("bad basin {:?}: {}", basin, e)))?;

    // Each file appears twice in an index page (href and link text)
    let found: BTreeSet<(u32, String)> = re
        .captures_iter(html)
        .filter_map(|caps| {
            let year = caps[2].parse::<u32>().ok()?;
            Some((year, caps[0].to_string()))
        })
        .collect();

    let Some(latest) = found.iter().map(|(year, _)| *year).max() else {
        return Ok(Vec::new());
    };

    Ok(found
        .into_iter()
        .filter(|(year, _)| *year == latest)
        .map(|(_, name)| name)
        .collect())
}

// ---------------------------------------------------------------------------
// B-deck records
// ---------------------------------------------------------------------------

/// Parses "156N" / "534W" style coordinates (tenths of a degree).
fn parse_tenths(field: &str, positive: char, negative: char) -> Option<f64> {
    let field = field.trim();
    let (split, hemisphere) = field.char_indices().last()?;
    let hemisphere = hemisphere.to_ascii_uppercase();
    let tenths: f64 = field[..split].trim().parse().ok()?;
    let value = tenths / 10.0;
    if hemisphere == positive {
        Some(value)
    } else if hemisphere == negative {
        Some(-value)
    } else {
        None
    }
}

fn parse_fix_time(field: &str) -> Option<DateTime<Utc>> {
    let field = field.trim();
    if field.len() != 10 || !field.is_ascii() {
        return None;
    }
    let date = NaiveDate::parse_from_str(&field[..8], "%Y%m%d").ok()?;
    let hour: u32 = field[8..].parse().ok()?;
    Some(date.and_hms_opt(hour, 0, 0)?.and_utc())
}

/// Parses one b-deck line. Malformed lines yield `None`.
pub fn parse_bdeck_line(line: &str) -> Option<BestTrackFix> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 8 {
        return None;
    }

    let storm_id = normalize_storm_id(&format!("{}{}", fields[0], fields[1]))?;
    let time = parse_fix_time(fields[2])?;
    let lat = parse_tenths(fields[6], 'N', 'S')?;
    let lon = parse_tenths(fields[7], 'E', 'W')?;

    Some(BestTrackFix {
        storm_id,
        time,
        position: LatLon::new(lat, lon),
    })
}

/// Last well-formed fix in a b-deck file.
pub fn parse_latest_fix(bdeck: &str) -> Option<BestTrackFix> {
    bdeck.lines().filter_map(parse_bdeck_line).last()
}

/// True when the fix is recent enough to describe an active system.
pub fn is_active(fix: &BestTrackFix, now: DateTime<Utc>) -> bool {
    now - fix.time <= Duration::hours(INVEST_MAX_AGE_HOURS)
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// Current invest positions keyed by storm id, e.g. `("AL94", 15.6N 53.4W)`.
///
/// The directory listing must load; individual files that fail are logged
/// and skipped.
pub fn fetch_invest_positions<F: TextFetcher>(
    fetcher: &F,
    feeds: &FeedsConfig,
    http: &HttpConfig,
    now: DateTime<Utc>,
) -> Result<Vec<(String, LatLon)>, FetchError> {
    let base = feeds.atcf_btk_url.trim_end_matches('/');
    let listing_url = format!("{}/", base);
    let listing = fetcher.fetch(&listing_url, http.feed_timeout())?.into_body(&listing_url)?;

    let mut positions = Vec::new();
    for file in parse_invest_listing(&listing, &feeds.atcf_basin)? {
        let url = format!("{}/{}", base, file);
        let body = match fetcher.fetch(&url, http.feed_timeout()).and_then(|doc| doc.into_body(&url)) {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Skipping {}: {}", file, e);
                continue;
            }
        };

        match parse_latest_fix(&body) {
            Some(fix) if is_active(&fix, now) => {
                log::debug!("ATCF {} last fix {} at {}", fix.storm_id, fix.time, fix.position);
                positions.push((fix.storm_id, fix.position));
            }
            Some(fix) => log::debug!("ATCF {} inactive since {}", fix.storm_id, fix.time),
            None => log::debug!("No usable fixes in {}", file),
        }
    }

    Ok(positions)
}
