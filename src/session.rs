use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::calibration::{expect_clicks, CalibrationMethod, ScaleFactor};
use crate::capture::{CaptureSource, PointCapture};
use crate::clicked_points::ClickBatch;
use crate::config::SessionConfig;
use crate::displacement::measure;
use crate::error::{CaptureError, Result};
use crate::frames::{FrameId, FramePair};
use crate::speed::{estimate, SpeedEstimate};

pub const LABEL_MARKINGS: &str = "reference markings";
pub const LABEL_VEHICLE_HEAD: &str = "vehicle head";
pub const LABEL_VEHICLE_TAIL: &str = "vehicle tail";
pub const LABEL_FRAME_A_HEAD: &str = "frame A head";
pub const LABEL_FRAME_B_HEAD: &str = "frame B head";

/// Which calibration to run and on which frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CalibrationPlan {
    ReferenceMarkings { reference: FrameId },
    KnownLength { reference: FrameId, real_length_m: f64 },
}

impl CalibrationPlan {
    pub fn reference(&self) -> &FrameId {
        match self {
            CalibrationPlan::ReferenceMarkings { reference } => reference,
            CalibrationPlan::KnownLength { reference, .. } => reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedReport {
    pub timestamp: String,
    pub method: String,
    pub reference: FrameId,
    pub frames: FramePair,
    pub pixels_per_meter: f64,
    pub meters_per_pixel: f64,
    pub pixel_diff: f64,
    pub delta_t: f64,
    pub speed: SpeedEstimate,
}

impl SpeedReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: {:.2} m/s ≈ {:.2} km/h",
            self.method, self.speed.mps, self.speed.kph
        )
    }
}

/// Captures `count` clicks and rejects batches of any other size.
fn capture_exact<C: PointCapture>(
    capture: &mut C,
    source: &CaptureSource,
    count: usize,
    label: &str,
) -> std::result::Result<ClickBatch, CaptureError> {
    let batch = capture.capture(source, count, label)?;
    if batch.len() != count {
        return Err(CaptureError::ClickCount {
            label: label.to_string(),
            expected: count,
            actual: batch.len(),
        });
    }
    Ok(batch)
}

fn now_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&Rfc3339).unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// One estimation run: capture, calibrate, measure, estimate.
pub struct Session<'a> {
    config: &'a SessionConfig,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a SessionConfig) -> Result<Session<'a>> {
        config.validate()?;
        Ok(Session { config })
    }

    fn source(&self, frame: &FrameId) -> CaptureSource {
        CaptureSource::new(frame.clone(), frame.resolve(self.config))
    }

    /// Collects the calibration clicks for `plan`.
    pub fn capture_calibration<C: PointCapture>(
        &self,
        plan: &CalibrationPlan,
        capture: &mut C,
    ) -> Result<CalibrationMethod> {
        let source = self.source(plan.reference());
        let method = match plan {
            CalibrationPlan::ReferenceMarkings { .. } => {
                let n = self.config.marking_clicks();
                let markings = capture.capture(&source, n, LABEL_MARKINGS)?;
                expect_clicks(&markings, n)?;
                CalibrationMethod::ReferenceMarkings { markings }
            }
            CalibrationPlan::KnownLength { real_length_m, .. } => {
                let n = self.config.length_clicks;
                let head = capture.capture(&source, n, LABEL_VEHICLE_HEAD)?;
                expect_clicks(&head, n)?;
                let tail = capture.capture(&source, n, LABEL_VEHICLE_TAIL)?;
                expect_clicks(&tail, n)?;
                CalibrationMethod::KnownLength {
                    head,
                    tail,
                    real_length_m: *real_length_m,
                }
            }
        };
        Ok(method)
    }

    pub fn calibrate<C: PointCapture>(
        &self,
        plan: &CalibrationPlan,
        capture: &mut C,
    ) -> Result<(CalibrationMethod, ScaleFactor)> {
        let method = self.capture_calibration(plan, capture)?;
        let scale = method.calibrate()?;
        log::info!(
            "{} on {}: {:.3} px/m, {:.5} m/px",
            method.name(),
            plan.reference(),
            scale.pixels_per_meter(),
            scale.meters_per_pixel()
        );
        Ok((method, scale))
    }

    /// Vehicle-head displacement in pixels between the two frames.
    pub fn displacement<C: PointCapture>(&self, frames: &FramePair, capture: &mut C) -> Result<f64> {
        let n = self.config.head_clicks;
        let a = capture_exact(capture, &self.source(&frames.first), n, LABEL_FRAME_A_HEAD)?;
        let b = capture_exact(capture, &self.source(&frames.second), n, LABEL_FRAME_B_HEAD)?;
        Ok(measure(&a, &b)?)
    }

    pub fn run<C: PointCapture>(
        &self,
        plan: &CalibrationPlan,
        frames: &FramePair,
        capture: &mut C,
    ) -> Result<SpeedReport> {
        let (method, scale) = self.calibrate(plan, capture)?;
        let pixel_diff = self.displacement(frames, capture)?;
        let speed = estimate(pixel_diff, &scale, self.config.delta_t)?;

        let report = SpeedReport {
            timestamp: now_timestamp(),
            method: method.name().to_string(),
            reference: plan.reference().clone(),
            frames: frames.clone(),
            pixels_per_meter: scale.pixels_per_meter(),
            meters_per_pixel: scale.meters_per_pixel(),
            pixel_diff,
            delta_t: self.config.delta_t,
            speed,
        };
        log::info!("{}", report.summary());
        Ok(report)
    }
}
