//! Vector (GeoJSON) endpoints.

use axum::{
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::geometry::{Coordinates, Polygon, POINT_AREA_HALF_WIDTH};
use crate::api::ApiJson;
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router {
    Router::new()
        .route("/upload", post(upload_vector_data))
        .route("/user-data", get(get_user_vector_data))
        .route("/get_vector_data", post(get_vector_data))
}

fn feature(properties: Value, geometry: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": geometry,
    })
}

fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Accept a GeoJSON FeatureCollection. Nothing is persisted.
pub async fn upload_vector_data(ApiJson(geojson): ApiJson<Value>) -> ApiResult<Json<Value>> {
    let features = geojson
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::bad_request("GeoJSON must contain a 'features' array"))?;

    tracing::info!(feature_count = features.len(), "Vector data uploaded");

    Ok(Json(json!({
        "status": "success",
        "message": "Vector data uploaded successfully",
        "feature_count": features.len(),
        "upload_date": Utc::now().to_rfc3339(),
    })))
}

pub async fn get_user_vector_data() -> Json<Value> {
    let field = Polygon {
        kind: "Polygon".to_string(),
        coordinates: vec![vec![
            vec![73.856, 18.516],
            vec![73.858, 18.516],
            vec![73.858, 18.518],
            vec![73.856, 18.518],
            vec![73.856, 18.516],
        ]],
    };

    Json(feature_collection(vec![feature(
        json!({
            "name": "Sample Field",
            "area": "10 hectares",
            "crop": "Wheat",
        }),
        field.to_value(),
    )]))
}

#[derive(Debug, Deserialize)]
pub struct VectorQuery {
    pub polygon: Option<Value>,
    pub coordinates: Option<Coordinates>,
}

impl VectorQuery {
    /// The area of interest: the polygon if given, else a square around the point.
    pub fn area(&self) -> ApiResult<Polygon> {
        match (&self.polygon, self.coordinates) {
            (Some(polygon), _) => Polygon::from_value(polygon),
            (None, Some(point)) => Ok(Polygon::square_around(point, POINT_AREA_HALF_WIDTH)),
            (None, None) => Err(ApiError::bad_request(
                "Either polygon or coordinates must be provided",
            )),
        }
    }
}

/// Soil, rainfall and crop suitability layers intersecting an area.
pub async fn get_vector_data(ApiJson(query): ApiJson<VectorQuery>) -> ApiResult<Json<Value>> {
    let area = query.area()?.to_value();

    let soil = feature_collection(vec![feature(
        json!({
            "soil_type": "Alluvial",
            "ph_level": 6.8,
            "organic_matter": "2.3%",
            "nitrogen": "Medium",
            "phosphorus": "Low",
            "potassium": "High",
        }),
        area.clone(),
    )]);

    let rainfall = feature_collection(vec![feature(
        json!({
            "zone_name": "High Rainfall Zone",
            "annual_avg": "1200mm",
            "monsoon_avg": "850mm",
            "dry_season_avg": "120mm",
        }),
        area.clone(),
    )]);

    let crops = feature_collection(vec![
        feature(
            json!({
                "crop_name": "Rice",
                "suitability_score": 0.85,
                "growing_season": "June - November",
            }),
            area.clone(),
        ),
        feature(
            json!({
                "crop_name": "Wheat",
                "suitability_score": 0.75,
                "growing_season": "November - March",
            }),
            area,
        ),
    ]);

    Ok(Json(json!({
        "soil": soil,
        "rainfall": rainfall,
        "crop_suitability": crops,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
