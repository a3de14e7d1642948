//! Minimal GeoJSON geometry handling for request validation.
//!
//! Only what the endpoints need: parse a Polygon, compute its bounding box,
//! and build a square area around a point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Half-width, in degrees, of the square built around a bare coordinate (~1 km).
pub const POINT_AREA_HALF_WIDTH: f64 = 0.01;

/// A GeoJSON Polygon geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<Vec<f64>>>,
}

/// A `{lat, lng}` pair as sent by the map UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Polygon {
    /// Parse and validate a GeoJSON Polygon.
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let polygon = Polygon::deserialize(value)
            .map_err(|e| ApiError::bad_request(format!("Invalid polygon: {}", e)))?;
        polygon.validate()?;
        Ok(polygon)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.kind != "Polygon" {
            return Err(ApiError::bad_request(format!(
                "Unsupported geometry type: {}",
                self.kind
            )));
        }

        if self.coordinates.is_empty() {
            return Err(ApiError::bad_request("Polygon has no rings"));
        }

        for ring in &self.coordinates {
            if ring.len() < 4 {
                return Err(ApiError::bad_request(
                    "Polygon rings need at least 4 positions",
                ));
            }
            let valid = ring
                .iter()
                .all(|p| p.len() >= 2 && p[0].is_finite() && p[1].is_finite());
            if !valid {
                return Err(ApiError::bad_request("Polygon contains an invalid position"));
            }
        }

        Ok(())
    }

    /// A closed square of `half_width` degrees around the point.
    pub fn square_around(center: Coordinates, half_width: f64) -> Self {
        let (x, y) = (center.lng, center.lat);
        let ring = vec![
            vec![x - half_width, y - half_width],
            vec![x + half_width, y - half_width],
            vec![x + half_width, y + half_width],
            vec![x - half_width, y + half_width],
            vec![x - half_width, y - half_width],
        ];
        Self {
            kind: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }

    /// Bounding box of the exterior ring.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for position in self.coordinates.iter().take(1).flatten() {
            bounds.min_x = bounds.min_x.min(position[0]);
            bounds.min_y = bounds.min_y.min(position[1]);
            bounds.max_x = bounds.max_x.max(position[0]);
            bounds.max_y = bounds.max_y.max(position[1]);
        }
        bounds
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.kind,
            "coordinates": self.coordinates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [73.856, 18.516],
                [73.858, 18.516],
                [73.858, 18.518],
                [73.856, 18.518],
                [73.856, 18.516]
            ]]
        })
    }

    #[test]
    fn test_bounds_of_field() {
        let polygon = Polygon::from_value(&field()).unwrap();
        let bounds = polygon.bounds();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(bounds.min_x, 73.856));
        assert!(close(bounds.max_x, 73.858));
        assert!(close(bounds.min_y, 18.516));
        assert!(close(bounds.max_y, 18.518));
    }

    #[test]
    fn test_rejects_other_geometry_types() {
        let point = json!({ "type": "Point", "coordinates": [[[1.0, 2.0]]] });
        assert!(matches!(Polygon::from_value(&point), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_short_rings_and_bad_positions() {
        let short = json!({ "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]] });
        assert!(Polygon::from_value(&short).is_err());

        let bad = json!({ "type": "Polygon", "coordinates": [[[0.0], [1.0, 0.0], [1.0, 1.0], [0.0]]] });
        assert!(Polygon::from_value(&bad).is_err());

        let empty = json!({ "type": "Polygon", "coordinates": [] });
        assert!(Polygon::from_value(&empty).is_err());

        assert!(Polygon::from_value(&json!("nope")).is_err());
    }

    #[test]
    fn test_square_around_point_is_closed() {
        let square = Polygon::square_around(Coordinates { lat: 18.5, lng: 73.8 }, 0.01);
        let ring = &square.coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert!(Polygon::from_value(&square.to_value()).is_ok());

        let bounds = square.bounds();
        assert!((bounds.width() - 0.02).abs() < 1e-9);
        assert!((bounds.height() - 0.02).abs() < 1e-9);
    }
}
