//! Root, health and location search.

use axum::{extract::Query, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Agro Geospatial API" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationResult {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<LocationResult>,
}

/// Geocoding placeholder: always one result at the centre of India.
pub async fn search_location(Query(params): Query<SearchParams>) -> ApiResult<Json<SearchResponse>> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'q' is required"))?;

    Ok(Json(SearchResponse {
        results: vec![LocationResult {
            name: format!("Sample location for {}", query),
            lat: 20.5937,
            lng: 78.9629,
            address: format!("Sample address for {}, India", query),
        }],
        query,
    }))
}
