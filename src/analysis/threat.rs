/// Per-storm threat assessment.
///
/// Each sub-step is a small pure function over a cone, the target and the
/// alert list. [`analyze_storm_threat`] runs them all and assembles the
/// [`StormThreat`].

use std::sync::LazyLock;

use geo::MultiPolygon;
use regex::Regex;

use crate::config::AnalysisConfig;
use crate::geometry::{area_sq_deg, haversine_km, point_in_any, polygon_intersects_any, validate};
use crate::model::{Alert, AlertLevel, Cone, LatLon, StormCategory, StormThreat};

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

/// Whether a cone looks like an identified system rather than a broad
/// outlook area. Used to let oversized cones through the area filter.
pub fn is_named_system(cone: &Cone) -> bool {
    let name = cone.storm_name.as_deref().unwrap_or("").to_lowercase();
    let storm_type = cone.storm_type.as_deref().unwrap_or("").to_lowercase();
    let id = cone.storm_id.as_deref().unwrap_or("").to_lowercase();

    ["named storm", "hurricane", "tropical storm", "potential tropical cyclone"]
        .iter()
        .any(|t| storm_type.contains(t))
        || name.contains("cyclone")
        || (!name.is_empty() && name != "unknown" && name != "invest")
        || (id.chars().any(|c| c.is_ascii_digit()) && id.contains("al"))
}

/// Whether the target (or county polygon) lies inside the cone.
///
/// Oversized geometry (more than `large_area_threshold` square degrees)
/// counts only for named systems. With a county polygon the test is
/// polygon-polygon, otherwise point-in-polygon. Geometry that fails
/// validation is tested by point only.
pub fn check_intersection(
    cone: &Cone,
    target: LatLon,
    county: Option<&MultiPolygon<f64>>,
    large_area_threshold: f64,
) -> bool {
    let Some(geometry) = cone.geometry.as_ref() else {
        return false;
    };

    if let Err(e) = validate(geometry) {
        log::debug!("Intersection check for {} fell back to point test: {}", cone.label(), e);
        return point_in_any([geometry], target);
    }

    let area = area_sq_deg(geometry);
    if area > large_area_threshold {
        if !is_named_system(cone) {
            log::debug!("Skipping large development area {} ({:.2} sq deg)", cone.label(), area);
            return false;
        }
        log::debug!("Allowing large named storm cone {} ({:.2} sq deg)", cone.label(), area);
    }

    match county {
        Some(county) => polygon_intersects_any([geometry], county),
        None => point_in_any([geometry], target),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Hurricane threshold, knots.
const HURRICANE_WIND: f64 = 74.0;
/// Category 3+, knots.
const MAJOR_HURRICANE_WIND: f64 = 111.0;
const TROPICAL_STORM_WIND: f64 = 39.0;

/// Classifies a storm. Rules are checked in priority order.
pub fn categorize_storm(cone: &Cone) -> StormCategory {
    let storm_type = cone.storm_type.as_deref().unwrap_or("").to_lowercase();
    let name = cone.storm_name.as_deref().unwrap_or("").to_lowercase();
    let wind = cone.wind_knots();

    if storm_type.contains("hurricane") || wind >= HURRICANE_WIND {
        return if wind >= MAJOR_HURRICANE_WIND {
            StormCategory::HurricaneMajor
        } else {
            StormCategory::HurricaneMinor
        };
    }

    if storm_type.contains("tropical storm")
        || storm_type.contains("storm")
        || (TROPICAL_STORM_WIND..HURRICANE_WIND).contains(&wind)
    {
        return StormCategory::TropicalStorm;
    }

    if storm_type.contains("depression") || (wind > 0.0 && wind < TROPICAL_STORM_WIND) {
        return StormCategory::TropicalDepression;
    }

    if name.contains("invest")
        || storm_type.contains("disturbance")
        || storm_type.contains("development")
        || cone.storm_id.as_deref().is_some_and(|id| id.contains('9'))
    {
        return StormCategory::InvestDisturbance;
    }

    if name.contains("development") || name.contains("area") {
        return StormCategory::DevelopmentArea;
    }

    StormCategory::Unknown
}

/// Alert level implied by an official product name, if any.
pub fn alert_level_for_event(event: &str) -> Option<AlertLevel> {
    let event = event.to_lowercase();
    if event.contains("hurricane warning") {
        Some(AlertLevel::HurricaneWarning)
    } else if event.contains("hurricane watch") || event.contains("tropical storm warning") {
        Some(AlertLevel::TropicalStormWarningHurricaneWatchEvacuation)
    } else if event.contains("tropical storm watch") {
        Some(AlertLevel::TropicalStormWatchHurricaneThreat)
    } else {
        None
    }
}

/// Threat level for one storm.
///
/// Outside the cone this is always all clear. Inside, the first alert (in
/// list order) naming a watch or warning decides; failing that the storm
/// category does.
pub fn determine_threat_level(category: StormCategory, in_cone: bool, alerts: &[Alert]) -> AlertLevel {
    if !in_cone {
        return AlertLevel::AllClear;
    }

    if let Some(level) = alerts.iter().find_map(|a| alert_level_for_event(&a.event)) {
        return level;
    }

    match category {
        StormCategory::HurricaneMajor => AlertLevel::TropicalStormWarningHurricaneWatchEvacuation,
        StormCategory::HurricaneMinor => AlertLevel::TropicalStormWatchHurricaneThreat,
        StormCategory::TropicalStorm | StormCategory::TropicalDepression | StormCategory::InvestDisturbance => {
            AlertLevel::TropicalStormThreat
        }
        StormCategory::DevelopmentArea | StormCategory::Unknown => AlertLevel::AllClear,
    }
}

// ---------------------------------------------------------------------------
// Distance, confidence, warnings, arrival
// ---------------------------------------------------------------------------

pub fn calculate_distance(cone: &Cone, target: LatLon) -> Option<f64> {
    cone.current_position.map(|position| haversine_km(target, position))
}

/// Confidence in the assessment, 0.0 to 1.0.
pub fn calculate_confidence(cone: &Cone, category: StormCategory) -> f64 {
    let mut confidence: f64 = 0.5;

    if cone
        .storm_name
        .as_deref()
        .is_some_and(|name| !name.is_empty() && !name.to_lowercase().contains("unknown"))
    {
        confidence += 0.2;
    }
    if cone.advisory_num.as_deref().is_some_and(|adv| adv != "Unknown") {
        confidence += 0.1;
    }
    if cone.current_position.is_some() {
        confidence += 0.1;
    }
    if category.is_well_defined() {
        confidence += 0.1;
    }

    confidence.min(1.0)
}

/// Events of the alerts whose description mentions this storm by name.
pub fn relevant_warnings(cone: &Cone, alerts: &[Alert]) -> Vec<String> {
    let name = cone.storm_name.as_deref().unwrap_or("").to_lowercase();
    if name.is_empty() {
        return Vec::new();
    }

    alerts
        .iter()
        .filter(|a| a.description.to_lowercase().contains(&name))
        .map(|a| a.event.clone())
        .collect()
}

static SPEED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(mph|kph|km/h|knots)").unwrap_or_else(|_| unreachable!()));

/// Forward speed from movement text ("NNW at 7 mph"), in km/h.
pub fn movement_speed_kph(movement: &str) -> Option<f64> {
    let lower = movement.to_lowercase();
    let caps = SPEED.captures(&lower)?;
    let speed: f64 = caps[1].parse().ok()?;
    Some(match &caps[2] {
        "mph" | "knots" => speed * 1.6,
        _ => speed,
    })
}

/// Hours until the storm reaches the target at its current forward speed.
pub fn estimate_arrival_hours(cone: &Cone, target: LatLon, default_speed_kph: f64) -> Option<u32> {
    let movement = cone.movement.as_deref()?;
    let distance_km = calculate_distance(cone, target)?;

    let speed_kph = movement_speed_kph(movement).unwrap_or(default_speed_kph);
    if speed_kph <= 0.0 || !distance_km.is_finite() {
        return None;
    }

    Some((distance_km / speed_kph).floor() as u32)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Full assessment of one storm against the target.
pub fn analyze_storm_threat(
    cone: Cone,
    target: LatLon,
    county: Option<&MultiPolygon<f64>>,
    alerts: &[Alert],
    analysis: &AnalysisConfig,
) -> StormThreat {
    let in_cone = check_intersection(&cone, target, county, analysis.large_area_threshold_sq_deg);
    let category = categorize_storm(&cone);
    let threat_level = determine_threat_level(category, in_cone, alerts);

    log::debug!(
        "{}: {:?}, in cone: {}, level: {}",
        cone.label(),
        category,
        in_cone,
        threat_level.label()
    );

    StormThreat {
        distance_km: calculate_distance(&cone, target),
        confidence: calculate_confidence(&cone, category),
        official_warnings: relevant_warnings(&cone, alerts),
        estimated_arrival_hours: estimate_arrival_hours(&cone, target, analysis.default_speed_kph),
        category,
        in_cone,
        threat_level,
        cone,
    }
}
