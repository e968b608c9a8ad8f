//! Park boundary helpers: map encoding, acreage and GeoJSON parsing.
//!
//! Boundaries arrive from the store as WGS84 GeoJSON. Only the exterior ring
//! of the first polygon is ever drawn; interior rings and further polygons are
//! ignored for display.

use geo::{Centroid, LineString, MultiPolygon, Polygon};
use geojson::GeoJson;

use crate::error::ParksError;
use crate::types::Park;

/// Store area units (square metres) to acres.
pub const AREA_TO_ACRES: f64 = 0.000247;

/// Encoded polyline precision: coordinates are scaled by 1e5.
pub const POLYLINE_PRECISION: u32 = 5;

/// Exterior ring of the first polygon, if the boundary has one.
pub fn outer_ring(boundary: &MultiPolygon<f64>) -> Option<&LineString<f64>> {
    boundary.0.first().map(Polygon::exterior)
}

/// Encode a park's outline as a Google encoded polyline for the map widget.
///
/// A park without any polygon encodes to an empty string.
pub fn encode_park_boundary(park: &Park) -> Result<String, ParksError> {
    let Some(ring) = outer_ring(&park.boundary) else {
        return Ok(String::new());
    };

    polyline::encode_coordinates(ring.coords().copied(), POLYLINE_PRECISION)
        .map_err(|e| ParksError::Geometry(format!("park {}: {e}", park.slug)))
}

/// Approximate acreage from the raw store area. Not geodesic.
pub fn approximate_area_acres(park: &Park) -> f64 {
    park.area * AREA_TO_ACRES
}

/// Centroid of the boundary as `(lat, lon)`, for centring the map.
pub fn map_center(park: &Park) -> Option<(f64, f64)> {
    park.boundary.centroid().map(|p| (p.y(), p.x()))
}

/// Parse a GeoJSON geometry (Polygon or MultiPolygon) into a boundary.
pub fn parse_boundary(json: &str) -> Result<MultiPolygon<f64>, ParksError> {
    let geojson: GeoJson = json
        .parse()
        .map_err(|e: geojson::Error| ParksError::Geometry(e.to_string()))?;

    let value = match geojson {
        GeoJson::Geometry(geometry) => geometry.value,
        _ => {
            return Err(ParksError::Geometry(
                "expected a bare GeoJSON geometry".to_string(),
            ))
        }
    };

    let polygon: Result<Polygon<f64>, _> = value.clone().try_into();
    if let Ok(polygon) = polygon {
        return Ok(MultiPolygon::new(vec![polygon]));
    }

    let multi: Result<MultiPolygon<f64>, _> = value.try_into();
    multi.map_err(|_| {
        ParksError::Geometry("unsupported geometry (expected Polygon or MultiPolygon)".to_string())
    })
}
