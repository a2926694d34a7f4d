/// Storm source aggregation.
///
/// Four feeds describe overlapping sets of storms at different levels of
/// detail. They are merged in a fixed order so the richest record for a
/// storm wins:
///
/// 1. Storm pages (feed A): all cones added.
/// 2. `CurrentStorms.json` (feed B): only ids not yet present.
/// 3. ATCF invests (feed C): update the position of a matching cone, or
///    synthesize a buffered cone around the fix.
/// 4. Map-server fallback (feed D): only ids not yet present.
///
/// Cones without an id can't be matched and are always added. Any feed may
/// fail; its batch is then treated as empty.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::geometry::buffer_point;
use crate::ingest::StormFeeds;
use crate::model::{Cone, ConeOrigin, FetchError, LatLon};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Insertion-ordered cones with a case-insensitive id index.
#[derive(Debug, Default)]
pub struct StormRegistry {
    cones: Vec<Cone>,
    by_id: HashMap<String, usize>,
}

fn id_key(id: &str) -> String {
    id.trim().to_uppercase()
}

impl StormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(&id_key(id))
    }

    /// Adds a cone unconditionally. The first cone seen for an id owns
    /// the index entry.
    pub fn insert(&mut self, cone: Cone) {
        if let Some(id) = cone.storm_id.as_deref() {
            self.by_id.entry(id_key(id)).or_insert(self.cones.len());
        }
        self.cones.push(cone);
    }

    /// Adds a cone unless its id is already present. Returns whether it
    /// was added.
    pub fn insert_if_new(&mut self, cone: Cone) -> bool {
        let duplicate = cone.storm_id.as_deref().is_some_and(|id| self.contains_id(id));
        if duplicate {
            return false;
        }
        self.insert(cone);
        true
    }

    /// Applies an invest position: overwrite the position of the first
    /// cone whose id equals `invest_id` or whose name contains it, else
    /// add a synthesized cone buffered `buffer_degrees` around the fix.
    ///
    /// Returns `true` when an existing cone was updated.
    pub fn apply_invest_position(&mut self, invest_id: &str, position: LatLon, buffer_degrees: f64) -> bool {
        let wanted = id_key(invest_id);
        let wanted_lower = wanted.to_lowercase();

        let existing = self.cones.iter_mut().find(|cone| {
            let id_matches = cone.storm_id.as_deref().is_some_and(|id| id_key(id) == wanted);
            let name_matches = cone
                .storm_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&wanted_lower));
            id_matches || name_matches
        });

        if let Some(cone) = existing {
            log::debug!("ATCF position {} applied to {}", position, cone.label());
            cone.current_position = Some(position);
            return true;
        }

        self.insert(invest_cone(invest_id, position, buffer_degrees));
        false
    }

    pub fn into_cones(self) -> Vec<Cone> {
        self.cones
    }
}

/// Cone synthesized around an ATCF invest fix.
pub fn invest_cone(invest_id: &str, position: LatLon, buffer_degrees: f64) -> Cone {
    Cone {
        storm_id: Some(invest_id.to_string()),
        storm_name: Some(format!("Invest {}", invest_id)),
        storm_type: Some("Tropical Disturbance".to_string()),
        geometry: Some(buffer_point(position, buffer_degrees)),
        current_position: Some(position),
        movement: None,
        max_winds: None,
        advisory_num: Some("ATCF".to_string()),
        origin: ConeOrigin::Atcf,
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn or_empty<T>(feed: &str, result: Result<Vec<T>, FetchError>) -> Vec<T> {
    match result {
        Ok(batch) => batch,
        Err(e) => {
            log::warn!("{} feed failed: {}", feed, e);
            Vec::new()
        }
    }
}

/// Merges all four feeds into one de-duplicated cone list. Never fails.
pub fn aggregate_storm_data<S: StormFeeds>(feeds: &S, analysis: &AnalysisConfig) -> Vec<Cone> {
    let mut registry = StormRegistry::new();

    let pages = or_empty("Storm page", feeds.storm_pages());
    log::info!("Storm pages: {} cones", pages.len());
    for cone in pages {
        registry.insert(cone);
    }

    let listed = or_empty("CurrentStorms", feeds.current_storms());
    let listed_total = listed.len();
    let listed_added = listed
        .into_iter()
        .fold(0, |added, cone| added + usize::from(registry.insert_if_new(cone)));
    log::info!("CurrentStorms: {} new of {} listed", listed_added, listed_total);

    let invests = or_empty("ATCF", feeds.invest_positions());
    for (invest_id, position) in &invests {
        if !registry.apply_invest_position(invest_id, *position, analysis.invest_buffer_degrees) {
            log::info!("Added ATCF invest {} at {}", invest_id, position);
        }
    }
    log::info!("ATCF: {} invest positions", invests.len());

    let fallback = or_empty("Map server", feeds.map_server());
    let fallback_total = fallback.len();
    let fallback_added = fallback
        .into_iter()
        .fold(0, |added, cone| added + usize::from(registry.insert_if_new(cone)));
    log::info!("Map server: {} new of {} features", fallback_added, fallback_total);

    log::info!("Aggregated {} storms", registry.len());
    registry.into_cones()
}
