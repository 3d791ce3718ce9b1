use serde::{Deserialize, Serialize};

use crate::calibration::ScaleFactor;
use crate::error::EstimationError;

pub const MPS_TO_KPH: f64 = 3.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedEstimate {
    pub mps: f64,
    pub kph: f64,
}

impl SpeedEstimate {
    pub fn from_mps(mps: f64) -> SpeedEstimate {
        SpeedEstimate {
            mps,
            kph: mps * MPS_TO_KPH,
        }
    }
}

/// Speed of a feature that moved `pixel_diff` pixels in `delta_t` seconds.
pub fn estimate(
    pixel_diff: f64,
    scale: &ScaleFactor,
    delta_t: f64,
) -> Result<SpeedEstimate, EstimationError> {
    estimate_meters_per_pixel(pixel_diff, scale.meters_per_pixel(), delta_t)
}

/// Same as [`estimate`] for a raw meters-per-pixel value.
pub fn estimate_meters_per_pixel(
    pixel_diff: f64,
    meters_per_pixel: f64,
    delta_t: f64,
) -> Result<SpeedEstimate, EstimationError> {
    if !pixel_diff.is_finite() || pixel_diff < 0.0 {
        return Err(EstimationError::InvalidDisplacement(pixel_diff));
    }
    if !meters_per_pixel.is_finite() || meters_per_pixel <= 0.0 {
        return Err(EstimationError::NonPositiveScale(meters_per_pixel));
    }
    if !delta_t.is_finite() || delta_t <= 0.0 {
        return Err(EstimationError::NonPositiveDeltaT(delta_t));
    }
    let speed = SpeedEstimate::from_mps(meters_per_pixel * pixel_diff / delta_t);
    log::debug!(
        "{:.5} m/px * {:.2} px / {:.3} s = {:.3} m/s",
        meters_per_pixel,
        pixel_diff,
        delta_t,
        speed.mps
    );
    Ok(speed)
}

/// Same as [`estimate`] for a raw pixels-per-meter value; it is inverted first.
pub fn estimate_pixels_per_meter(
    pixel_diff: f64,
    pixels_per_meter: f64,
    delta_t: f64,
) -> Result<SpeedEstimate, EstimationError> {
    let scale = ScaleFactor::from_pixels_per_meter(pixels_per_meter)?;
    estimate(pixel_diff, &scale, delta_t)
}
