/// Geometry primitives for cone analysis.
///
/// All polygons are `geo::MultiPolygon<f64>` in (lon, lat) coordinate
/// order, matching GeoJSON. Areas are in square degrees: the cone filter
/// only needs a coarse size signal, not a projected area.

use std::fs;
use std::path::Path;

use geo::{Area, Centroid, Coord, CoordsIter, Intersects, LineString, MultiPolygon, Point, Polygon};
use geojson::GeoJson;

use crate::model::{GeometryError, LatLon};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Vertices used to approximate a circle when buffering a point.
const BUFFER_SEGMENTS: usize = 64;

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Great-circle distance in kilometres (spherical earth, haversine).
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lon.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lon.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

// ---------------------------------------------------------------------------
// Construction and measurement
// ---------------------------------------------------------------------------

/// Circular polygon of `radius_deg` degrees around `center`.
pub fn buffer_point(center: LatLon, radius_deg: f64) -> MultiPolygon<f64> {
    let mut ring: Vec<Coord<f64>> = (0..BUFFER_SEGMENTS)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (BUFFER_SEGMENTS as f64);
            Coord {
                x: center.lon + radius_deg * theta.cos(),
                y: center.lat + radius_deg * theta.sin(),
            }
        })
        .collect();
    ring.push(ring[0]);

    MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])])
}

/// Planar area in square degrees.
pub fn area_sq_deg(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.unsigned_area()
}

/// Centroid as a position, `None` for empty geometry.
pub fn centroid(geometry: &MultiPolygon<f64>) -> Option<LatLon> {
    geometry
        .centroid()
        .filter(|p| p.x().is_finite() && p.y().is_finite())
        .map(|p| LatLon::new(p.y(), p.x()))
}

/// Rejects empty polygons and non-finite coordinates.
pub fn validate(geometry: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if geometry.0.is_empty() {
        return Err(GeometryError::Degenerate("empty multipolygon".to_string()));
    }
    if geometry.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::Degenerate("non-finite coordinate".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Intersection
// ---------------------------------------------------------------------------

/// True when the point lies inside or on the boundary of any geometry.
pub fn point_in_any<'a, I>(geometries: I, point: LatLon) -> bool
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    // GeoJSON order: x = longitude, y = latitude
    let point = Point::new(point.lon, point.lat);
    geometries.into_iter().any(|g| g.intersects(&point))
}

/// True when `polygon` shares any point with any geometry.
pub fn polygon_intersects_any<'a, I>(geometries: I, polygon: &MultiPolygon<f64>) -> bool
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    geometries.into_iter().any(|g| g.intersects(polygon))
}

// ---------------------------------------------------------------------------
// GeoJSON
// ---------------------------------------------------------------------------

/// Converts a GeoJSON geometry to a multipolygon, `None` for anything
/// that is not a Polygon or MultiPolygon.
pub fn geojson_to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}

/// Parses a county boundary from GeoJSON text.
///
/// Accepts a bare geometry, a single feature, or a feature collection; all
/// polygons found are combined into one multipolygon.
pub fn parse_county_polygon(text: &str) -> Result<MultiPolygon<f64>, GeometryError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| GeometryError::GeoJson(e.to_string()))?;

    let geometries: Vec<geojson::Geometry> = match geojson {
        GeoJson::Geometry(g) => vec![g],
        GeoJson::Feature(f) => f.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
    };

    let polygons: Vec<Polygon<f64>> = geometries
        .into_iter()
        .filter_map(geojson_to_multipolygon)
        .flat_map(|mp| mp.0)
        .collect();

    if polygons.is_empty() {
        return Err(GeometryError::Unsupported("no Polygon or MultiPolygon found".to_string()));
    }

    let county = MultiPolygon::new(polygons);
    validate(&county)?;
    Ok(county)
}

/// Loads a county boundary from a GeoJSON file.
pub fn load_county_polygon<P: AsRef<Path>>(path: P) -> Result<MultiPolygon<f64>, GeometryError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| GeometryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_county_polygon(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn square(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> MultiPolygon<f64> {
    let ring = LineString::from(vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
        (min_lon, min_lat),
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}
