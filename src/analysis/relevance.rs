/// Distance pre-filter: drops storms too far away to matter before the
/// per-storm threat analysis runs.

use crate::geometry::{centroid, haversine_km};
use crate::model::{Cone, LatLon};

/// Keeps cones within `max_distance_km` of `target`.
///
/// Distance is measured to the storm's current position, else to its
/// geometry centroid. A cone with neither, or whose centroid can't be
/// computed, is kept: without a position it cannot be ruled out.
pub fn filter_storms_by_distance(cones: Vec<Cone>, target: LatLon, max_distance_km: f64) -> Vec<Cone> {
    cones
        .into_iter()
        .filter(|cone| {
            let (reference, basis) = match (cone.current_position, cone.geometry.as_ref()) {
                (Some(position), _) => (Some(position), "position"),
                (None, Some(geometry)) => (centroid(geometry), "centroid"),
                (None, None) => (None, "none"),
            };

            let Some(reference) = reference else {
                log::debug!("Including {}: no usable position ({})", cone.label(), basis);
                return true;
            };

            let distance = haversine_km(target, reference);
            let keep = distance <= max_distance_km;
            log::debug!(
                "{} {}: {:.0} km away (from {})",
                if keep { "Including" } else { "Excluding" },
                cone.label(),
                distance,
                basis
            );
            keep
        })
        .collect()
}
