//! Synthetic NDVI rasters and vegetation health classification.
//!
//! No satellite imagery is fetched. A raster covering the requested bounds
//! is synthesized: uniform noise in `[-0.2, 0.9)`, lifted by 0.3 inside the
//! ellipse inscribed in the grid, clamped to the valid NDVI range.

use rand::Rng;
use serde::Serialize;

use crate::api::geometry::Bounds;

/// Raster resolution.
pub const PIXELS_PER_DEGREE: f64 = 1000.0;
pub const MIN_DIMENSION: usize = 100;
/// Keeps a continent-sized polygon from allocating a continent-sized raster.
pub const MAX_DIMENSION: usize = 2048;

const CENTER_BOOST: f64 = 0.3;

/// Raster width and height for the given bounds.
pub fn grid_dimensions(bounds: &Bounds) -> (usize, usize) {
    let to_pixels = |degrees: f64| {
        let pixels = (degrees * PIXELS_PER_DEGREE).floor();
        if pixels.is_finite() && pixels > 0.0 {
            (pixels as usize).clamp(MIN_DIMENSION, MAX_DIMENSION)
        } else {
            MIN_DIMENSION
        }
    };
    (to_pixels(bounds.width()), to_pixels(bounds.height()))
}

/// Summary statistics of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NdviStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Evenly spaced sample `i` of `n` over `[-1, 1]`, endpoints included.
fn unit_coordinate(i: usize, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    -1.0 + 2.0 * i as f64 / (n - 1) as f64
}

/// Generate a `width` x `height` synthetic raster and summarize it.
///
/// Pixels are streamed into the statistics rather than kept in memory.
pub fn synthesize<R: Rng>(width: usize, height: usize, rng: &mut R) -> NdviStats {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for row in 0..height {
        let y = unit_coordinate(row, height);
        for col in 0..width {
            let x = unit_coordinate(col, width);
            let mut value = rng.gen::<f64>() * 1.1 - 0.2;
            if x * x + y * y <= 1.0 {
                value += CENTER_BOOST;
            }
            let value = value.clamp(-1.0, 1.0);
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }
    }

    let count = (width * height).max(1) as f64;
    NdviStats {
        min,
        max,
        mean: sum / count,
    }
}

/// Vegetation health derived from mean NDVI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VegetationHealth {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl VegetationHealth {
    pub fn from_ndvi_mean(mean: f64) -> Self {
        if mean < 0.2 {
            Self::Poor
        } else if mean < 0.4 {
            Self::Fair
        } else if mean < 0.6 {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Poor => "Vegetation is sparse or unhealthy. This may indicate bare soil, drought stress, or crop failure.",
            Self::Fair => "Moderate vegetation health. This may indicate early growth stages or moderate stress conditions.",
            Self::Good => "Good vegetation health. Crops are likely in active growth phase with adequate water and nutrients.",
            Self::Excellent => "Excellent vegetation health. Crops are likely at peak growth with optimal conditions.",
        }
    }
}
