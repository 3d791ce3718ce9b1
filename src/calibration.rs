use serde::{Deserialize, Serialize};

use crate::clicked_points::{mean, ClickBatch};
use crate::error::{CalibrationError, EstimationError};

/// Real-world spacing between the two points of a reference-marking pair.
pub const MARKING_SPACING_METER: f64 = 1.0;

/// Pixel-to-meter conversion, stored as meters per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactor {
    meters_per_pixel: f64,
}

impl ScaleFactor {
    pub fn from_meters_per_pixel(meters_per_pixel: f64) -> Result<ScaleFactor, EstimationError> {
        if !meters_per_pixel.is_finite() || meters_per_pixel <= 0.0 {
            return Err(EstimationError::NonPositiveScale(meters_per_pixel));
        }
        Ok(ScaleFactor { meters_per_pixel })
    }

    pub fn from_pixels_per_meter(pixels_per_meter: f64) -> Result<ScaleFactor, EstimationError> {
        if !pixels_per_meter.is_finite() || pixels_per_meter <= 0.0 {
            return Err(EstimationError::NonPositiveScale(pixels_per_meter));
        }
        Self::from_meters_per_pixel(1.0 / pixels_per_meter)
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    pub fn pixels_per_meter(&self) -> f64 {
        1.0 / self.meters_per_pixel
    }
}

/// The two ways of turning clicks into a scale.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationMethod {
    /// `2·K` clicks, each consecutive pair straddling one meter of road marking.
    ReferenceMarkings { markings: ClickBatch },
    /// Head and tail of an object whose real length is known.
    KnownLength {
        head: ClickBatch,
        tail: ClickBatch,
        real_length_m: f64,
    },
}

impl CalibrationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationMethod::ReferenceMarkings { .. } => "reference markings",
            CalibrationMethod::KnownLength { .. } => "known length",
        }
    }

    pub fn calibrate(&self) -> Result<ScaleFactor, CalibrationError> {
        match self {
            CalibrationMethod::ReferenceMarkings { markings } => {
                let pixels_per_meter = reference_markings(markings)?;
                let pixels_per_meter = pixels_per_meter / MARKING_SPACING_METER;
                ScaleFactor::from_pixels_per_meter(pixels_per_meter)
                    .map_err(|_| CalibrationError::InvalidScale(1.0 / pixels_per_meter))
            }
            CalibrationMethod::KnownLength {
                head,
                tail,
                real_length_m,
            } => {
                let meters_per_pixel = known_length(head, tail, *real_length_m)?;
                ScaleFactor::from_meters_per_pixel(meters_per_pixel)
                    .map_err(|_| CalibrationError::InvalidScale(meters_per_pixel))
            }
        }
    }
}

/// Checks that `batch` holds exactly `expected` clicks.
pub fn expect_clicks(batch: &ClickBatch, expected: usize) -> Result<(), CalibrationError> {
    if batch.len() != expected {
        return Err(CalibrationError::ClickCount {
            label: batch.label.clone(),
            expected,
            actual: batch.len(),
        });
    }
    Ok(())
}

fn check_requested(batch: &ClickBatch) -> Result<(), CalibrationError> {
    expect_clicks(batch, batch.requested())
}

/// Mean pixel distance of consecutive marking pairs, i.e. pixels per meter.
///
/// Pairs are `(p[0], p[1]), (p[2], p[3]), ...`; only the vertical distance counts.
pub fn reference_markings(markings: &ClickBatch) -> Result<f64, CalibrationError> {
    let n = markings.len();
    if n == 0 || n % 2 != 0 {
        return Err(CalibrationError::OddOrEmptyMarkings(n));
    }
    check_requested(markings)?;

    let distances: Vec<f64> = markings
        .points()
        .chunks_exact(2)
        .map(|pair| (pair[1].as_dvec2() - pair[0].as_dvec2()).y.abs())
        .collect();
    log::debug!("{}: pair distances {:?} px", markings.label, distances);

    let pixels_per_meter = mean(distances.iter().copied()).unwrap_or(0.0);
    if pixels_per_meter == 0.0 {
        return Err(CalibrationError::ZeroPixelLength);
    }
    log::info!("1 m ≈ {:.2} px (mean of {} pairs)", pixels_per_meter, distances.len());
    Ok(pixels_per_meter)
}

/// Meters per pixel from the clicked head and tail of an object `real_length_m` long.
pub fn known_length(
    head: &ClickBatch,
    tail: &ClickBatch,
    real_length_m: f64,
) -> Result<f64, CalibrationError> {
    if !real_length_m.is_finite() || real_length_m <= 0.0 {
        return Err(CalibrationError::NonPositiveLength(real_length_m));
    }
    check_requested(head)?;
    check_requested(tail)?;
    if head.len() != tail.len() {
        return Err(CalibrationError::UnequalBatches {
            head: head.len(),
            tail: tail.len(),
        });
    }
    // equal sizes, so either both are empty or neither
    let (Some(head_y), Some(tail_y)) = (head.mean_y(), tail.mean_y()) else {
        return Err(CalibrationError::EmptyBatch(head.label.clone()));
    };

    let pixel_length = (head_y - tail_y).abs();
    if pixel_length == 0.0 {
        return Err(CalibrationError::ZeroPixelLength);
    }
    let meters_per_pixel = real_length_m / pixel_length;
    if !meters_per_pixel.is_finite() {
        return Err(CalibrationError::InvalidScale(meters_per_pixel));
    }
    log::info!(
        "object spans {:.2} px ({:.2} m), {:.5} m/px",
        pixel_length,
        real_length_m,
        meters_per_pixel
    );
    Ok(meters_per_pixel)
}
