//! Raster (NDVI) endpoints.

use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::geometry::Polygon;
use crate::api::ndvi::{self, NdviStats, VegetationHealth};
use crate::api::{require_file_name, ApiJson, FileMessage, FileQuery};
use crate::error::{ApiError, ApiResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

pub fn router() -> Router {
    Router::new()
        .route("/get_raster_data", post(get_raster_data))
        .route("/get_raster_file", get(get_raster_file))
}

#[derive(Debug, Deserialize)]
pub struct RasterRequest {
    pub polygon: Option<Value>,
    pub raster_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RasterResponse {
    pub raster_type: String,
    pub start_date: String,
    pub end_date: String,
    pub ndvi_min: f64,
    pub ndvi_max: f64,
    pub ndvi_mean: f64,
    pub width: usize,
    pub height: usize,
    pub crs: &'static str,
    #[serde(rename = "ndviUrl")]
    pub ndvi_url: String,
    pub health_status: VegetationHealth,
    pub description: &'static str,
    pub timestamp: String,
}

/// Resolve the requested date range, defaulting to the last 30 days.
fn date_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> ApiResult<(NaiveDate, NaiveDate)> {
    let parse = |label: &str, raw: &str| {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
            ApiError::bad_request(format!("{} must be in YYYY-MM-DD format, got {:?}", label, raw))
        })
    };

    let end = match end {
        Some(raw) => parse("end_date", raw)?,
        None => today,
    };
    let start = match start {
        Some(raw) => parse("start_date", raw)?,
        None => today - TimeDelta::days(DEFAULT_LOOKBACK_DAYS),
    };

    if start > end {
        return Err(ApiError::bad_request("start_date must not be after end_date"));
    }
    Ok((start, end))
}

/// Generate a synthetic NDVI raster for the polygon and return its metadata.
pub async fn get_raster_data(ApiJson(request): ApiJson<RasterRequest>) -> ApiResult<Json<RasterResponse>> {
    let polygon = request
        .polygon
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("Polygon must be provided"))?;
    let polygon = Polygon::from_value(polygon)?;

    let raster_type = request.raster_type.unwrap_or_else(|| "ndvi".to_string());
    if !raster_type.eq_ignore_ascii_case("ndvi") {
        return Err(ApiError::bad_request(format!(
            "Unsupported raster type: {}",
            raster_type
        )));
    }

    let now = Utc::now();
    let (start, end) = date_range(
        request.start_date.as_deref(),
        request.end_date.as_deref(),
        now.date_naive(),
    )?;

    let (width, height) = ndvi::grid_dimensions(&polygon.bounds());
    let stats: NdviStats = tokio::task::spawn_blocking(move || {
        ndvi::synthesize(width, height, &mut rand::thread_rng())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Error generating raster data: {}", e)))?;

    let health = VegetationHealth::from_ndvi_mean(stats.mean);
    let filename = format!("ndvi_{}.tif", uuid::Uuid::new_v4().simple());

    tracing::debug!(width, height, mean = stats.mean, "Synthesized NDVI raster");

    Ok(Json(RasterResponse {
        raster_type,
        start_date: start.format(DATE_FORMAT).to_string(),
        end_date: end.format(DATE_FORMAT).to_string(),
        ndvi_min: stats.min,
        ndvi_max: stats.max,
        ndvi_mean: stats.mean,
        width,
        height,
        crs: "EPSG:4326",
        ndvi_url: format!("/raster/get_raster_file?filename={}", filename),
        health_status: health,
        description: health.description(),
        timestamp: now.to_rfc3339(),
    }))
}

pub async fn get_raster_file(Query(query): Query<FileQuery>) -> ApiResult<Json<FileMessage>> {
    let filename = require_file_name(query.filename)?;
    Ok(Json(FileMessage {
        message: format!("This endpoint would return the raster file: {}", filename),
    }))
}
