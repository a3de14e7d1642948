//! Agricultural report assembly.
//!
//! The report content (area, soil, rainfall, crops, NDVI with its health
//! classification and chart series) is assembled here and returned as JSON.
//! No document is rendered: `report_url` is a placeholder pointing at
//! `download_report`, which only names the file.

use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::geometry::{Bounds, Polygon};
use crate::api::ndvi::VegetationHealth;
use crate::api::{require_file_name, ApiJson, FileMessage, FileQuery};
use crate::error::{ApiError, ApiResult};

pub const REPORT_TITLE: &str = "Agricultural Intelligence Report";

pub fn router() -> Router {
    Router::new()
        .route("/generate_report", post(generate_report))
        .route("/download_report", get(download_report))
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub polygon: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AreaInfo {
    pub area_type: &'static str,
    pub approximate_size: &'static str,
    pub bounds: Bounds,
}

#[derive(Debug, Serialize)]
pub struct SoilProfile {
    pub soil_type: &'static str,
    pub ph_level: f64,
    pub organic_matter: &'static str,
    pub nitrogen: &'static str,
    pub phosphorus: &'static str,
    pub potassium: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MonthlyRainfall {
    pub month: &'static str,
    pub rainfall_mm: u32,
}

#[derive(Debug, Serialize)]
pub struct RainfallProfile {
    pub rainfall_zone: &'static str,
    pub annual_average: &'static str,
    pub monsoon_average: &'static str,
    pub dry_season_average: &'static str,
    pub monthly: Vec<MonthlyRainfall>,
}

#[derive(Debug, Serialize)]
pub struct CropSuitability {
    pub suitable_crops: Vec<&'static str>,
    pub recommended_crop: &'static str,
    pub growing_season: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NdviSample {
    pub date: &'static str,
    pub ndvi: f64,
}

#[derive(Debug, Serialize)]
pub struct NdviSummary {
    pub ndvi_min: f64,
    pub ndvi_max: f64,
    pub ndvi_mean: f64,
    pub ndvi_std_dev: f64,
    pub health_status: VegetationHealth,
    pub description: &'static str,
    pub time_series: Vec<NdviSample>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub title: &'static str,
    pub generated_on: String,
    pub area: AreaInfo,
    pub soil: SoilProfile,
    pub rainfall: RainfallProfile,
    pub crop_suitability: CropSuitability,
    pub ndvi: NdviSummary,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report_id: String,
    pub report_url: String,
    pub summary: ReportSummary,
    pub timestamp: String,
}

fn soil_profile() -> SoilProfile {
    SoilProfile {
        soil_type: "Alluvial",
        ph_level: 6.8,
        organic_matter: "2.3%",
        nitrogen: "Medium",
        phosphorus: "Low",
        potassium: "High",
    }
}

fn rainfall_profile() -> RainfallProfile {
    const MONTHLY: [(&str, u32); 12] = [
        ("Jan", 10),
        ("Feb", 5),
        ("Mar", 8),
        ("Apr", 12),
        ("May", 25),
        ("Jun", 180),
        ("Jul", 350),
        ("Aug", 320),
        ("Sep", 180),
        ("Oct", 80),
        ("Nov", 20),
        ("Dec", 10),
    ];

    RainfallProfile {
        rainfall_zone: "High Rainfall Zone",
        annual_average: "1200mm",
        monsoon_average: "850mm",
        dry_season_average: "120mm",
        monthly: MONTHLY
            .iter()
            .map(|&(month, rainfall_mm)| MonthlyRainfall { month, rainfall_mm })
            .collect(),
    }
}

fn ndvi_summary() -> NdviSummary {
    const SERIES: [(&str, f64); 12] = [
        ("2023-01-15", 0.25),
        ("2023-02-15", 0.30),
        ("2023-03-15", 0.45),
        ("2023-04-15", 0.60),
        ("2023-05-15", 0.75),
        ("2023-06-15", 0.85),
        ("2023-07-15", 0.80),
        ("2023-08-15", 0.70),
        ("2023-09-15", 0.65),
        ("2023-10-15", 0.55),
        ("2023-11-15", 0.40),
        ("2023-12-15", 0.30),
    ];
    let mean = 0.65;
    let health = VegetationHealth::from_ndvi_mean(mean);

    NdviSummary {
        ndvi_min: 0.15,
        ndvi_max: 0.85,
        ndvi_mean: mean,
        ndvi_std_dev: 0.12,
        health_status: health,
        description: health.description(),
        time_series: SERIES
            .iter()
            .map(|&(date, ndvi)| NdviSample { date, ndvi })
            .collect(),
    }
}

/// Assemble the report content for an area.
pub fn build_summary(polygon: &Polygon, generated_on: String) -> ReportSummary {
    ReportSummary {
        title: REPORT_TITLE,
        generated_on,
        area: AreaInfo {
            area_type: "Polygon",
            approximate_size: "25 hectares",
            bounds: polygon.bounds(),
        },
        soil: soil_profile(),
        rainfall: rainfall_profile(),
        crop_suitability: CropSuitability {
            suitable_crops: vec!["Rice", "Wheat", "Sugarcane", "Vegetables"],
            recommended_crop: "Rice",
            growing_season: "June - November",
        },
        ndvi: ndvi_summary(),
    }
}

pub async fn generate_report(ApiJson(request): ApiJson<ReportRequest>) -> ApiResult<Json<ReportResponse>> {
    let polygon = request
        .polygon
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("Polygon must be provided"))?;
    let polygon = Polygon::from_value(polygon)?;

    let now = Utc::now();
    let report_id = Uuid::new_v4().simple().to_string();
    let summary = build_summary(&polygon, now.format("%Y-%m-%d %H:%M:%S").to_string());

    tracing::info!(report_id = %report_id, "Report generated");

    Ok(Json(ReportResponse {
        report_url: format!("/report/download_report?filename=report_{}.pdf", report_id),
        report_id,
        summary,
        timestamp: now.to_rfc3339(),
    }))
}

pub async fn download_report(Query(query): Query<FileQuery>) -> ApiResult<Json<FileMessage>> {
    let filename = require_file_name(query.filename)?;
    Ok(Json(FileMessage {
        message: format!("This endpoint would return the report file: {}", filename),
    }))
}
