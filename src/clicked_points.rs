use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// A single operator click in pixel coordinates.
///
/// Only `y` feeds the calculations; `x` is kept so the capture record is complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Point(DVec2);

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point(DVec2::new(x, y))
    }
    pub fn x(&self) -> f64 {
        self.0.x
    }
    pub fn y(&self) -> f64 {
        self.0.y
    }
    pub fn as_dvec2(&self) -> DVec2 {
        self.0
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Clicks captured for one purpose, together with how many were asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickBatch {
    pub label: String,
    requested: usize,
    points: Vec<Point>,
}

impl ClickBatch {
    /// Builds a batch whose requested count is the number of points given.
    pub fn new(label: &str, points: Vec<Point>) -> ClickBatch {
        ClickBatch {
            label: label.to_string(),
            requested: points.len(),
            points,
        }
    }

    /// Builds a batch that was asked for `requested` clicks.
    ///
    /// The point count is not checked here; see [`ClickBatch::check_count`].
    pub fn with_requested(label: &str, requested: usize, points: Vec<Point>) -> ClickBatch {
        ClickBatch {
            label: label.to_string(),
            requested,
            points,
        }
    }

    pub fn from_ys(label: &str, ys: &[f64]) -> ClickBatch {
        Self::new(label, ys.iter().map(|&y| Point::new(0.0, y)).collect())
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn check_count(&self) -> Result<(), CaptureError> {
        if self.points.len() != self.requested {
            return Err(CaptureError::ClickCount {
                label: self.label.clone(),
                expected: self.requested,
                actual: self.points.len(),
            });
        }
        Ok(())
    }

    /// Centroid of the clicks, `None` for an empty batch.
    pub fn mean_position(&self) -> Option<DVec2> {
        if self.points.is_empty() {
            return None;
        }
        let sum: DVec2 = self.points.iter().map(|p| p.as_dvec2()).sum();
        Some(sum / self.points.len() as f64)
    }

    /// Representative vertical position, `None` for an empty batch.
    pub fn mean_y(&self) -> Option<f64> {
        self.mean_position().map(|c| c.y)
    }
}

/// Arithmetic mean, `None` when the iterator is empty.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
