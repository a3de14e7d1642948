//! Domain endpoints.
//!
//! # Routes
//! ```text
//! GET  /                          welcome message
//! GET  /health                    liveness
//! GET  /search_location?q=        location lookup (mock)
//! POST /vector/upload             accept a GeoJSON FeatureCollection
//! GET  /vector/user-data          the caller's saved fields (mock)
//! POST /vector/get_vector_data    soil / rainfall / crop layers for an area
//! POST /raster/get_raster_data    synthetic NDVI raster metadata
//! GET  /raster/get_raster_file    raster download placeholder
//! POST /report/generate_report    report assembly
//! GET  /report/download_report    report download placeholder
//! ```
//!
//! All data is mock or synthetic; no GIS backend is queried.

pub mod geometry;
pub mod ndvi;
pub mod raster;
pub mod report;
pub mod root;
pub mod vector;

use axum::{extract::FromRequest, routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Build the API router.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .route("/search_location", get(root::search_location))
        .nest("/vector", vector::router())
        .nest("/raster", raster::router())
        .nest("/report", report::router())
}

/// JSON body extractor whose rejections render as `{"detail": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `?filename=` query of the download placeholders.
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileMessage {
    pub message: String,
}

/// A bare file name: present, non-empty, no path components.
pub(crate) fn require_file_name(filename: Option<String>) -> ApiResult<String> {
    let filename = filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'filename' is required"))?;

    if filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(ApiError::bad_request("Invalid filename"));
    }
    Ok(filename)
}
