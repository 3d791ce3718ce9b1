use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::PathBuf;

use crate::clicked_points::{ClickBatch, Point};
use crate::error::CaptureError;
use crate::frames::{frame_dimensions, FrameId};

/// Where the operator is clicking.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSource {
    pub frame: FrameId,
    pub path: PathBuf,
}

impl CaptureSource {
    pub fn new(frame: FrameId, path: PathBuf) -> CaptureSource {
        CaptureSource { frame, path }
    }
}

/// Anything that can hand back operator clicks.
///
/// Implementations return exactly `required_count` points or an error.
pub trait PointCapture {
    fn capture(
        &mut self,
        source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError>;
}

impl<T: PointCapture + ?Sized> PointCapture for &mut T {
    fn capture(
        &mut self,
        source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError> {
        (**self).capture(source, required_count, label)
    }
}

/// Parses `x y` or `x,y`.
pub fn parse_point(line: &str) -> Result<Point, CaptureError> {
    let unparsable = || CaptureError::Unparsable(line.trim().to_string());
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let x: f64 = fields.next().ok_or_else(unparsable)?.parse().map_err(|_| unparsable())?;
    let y: f64 = fields.next().ok_or_else(unparsable)?.parse().map_err(|_| unparsable())?;
    if fields.next().is_some() || !x.is_finite() || !y.is_finite() {
        return Err(unparsable());
    }
    Ok(Point::new(x, y))
}

pub fn check_bounds(point: &Point, width: u32, height: u32) -> Result<(), CaptureError> {
    let inside = point.x() >= 0.0
        && point.y() >= 0.0
        && point.x() < width as f64
        && point.y() < height as f64;
    if inside {
        Ok(())
    } else {
        Err(CaptureError::OutOfBounds {
            x: point.x(),
            y: point.y(),
            width,
            height,
        })
    }
}

/// Reads clicks typed as coordinates, one per line.
///
/// Bad lines are reported and skipped; running out of input is an error.
pub struct TerminalCapture<R: BufRead> {
    reader: R,
    check_frame_bounds: bool,
}

impl<R: BufRead> TerminalCapture<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            check_frame_bounds: true,
        }
    }

    pub fn without_bounds_check(reader: R) -> Self {
        Self {
            reader,
            check_frame_bounds: false,
        }
    }

    fn bounds(&self, source: &CaptureSource) -> Option<(u32, u32)> {
        if !self.check_frame_bounds {
            return None;
        }
        match frame_dimensions(&source.path) {
            Ok(dims) => Some(dims),
            Err(e) => {
                log::warn!("cannot read size of {}: {}", source.path.display(), e);
                None
            }
        }
    }
}

impl<R: BufRead> PointCapture for TerminalCapture<R> {
    fn capture(
        &mut self,
        source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError> {
        if required_count == 0 {
            return Err(CaptureError::ZeroClicks);
        }
        let bounds = self.bounds(source);
        log::info!(
            "{}: enter {} point(s) on {} as `x y`",
            label,
            required_count,
            source.frame
        );

        let mut points = Vec::with_capacity(required_count);
        let mut line = String::new();
        while points.len() < required_count {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| CaptureError::Read {
                    label: label.to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                })?;
            if read == 0 {
                return Err(CaptureError::Exhausted {
                    label: label.to_string(),
                    expected: required_count,
                    got: points.len(),
                });
            }
            if line.trim().is_empty() {
                continue;
            }
            let accepted = parse_point(&line).and_then(|p| match bounds {
                Some((w, h)) => check_bounds(&p, w, h).map(|_| p),
                None => Ok(p),
            });
            match accepted {
                Ok(p) => {
                    log::info!("{} click: ({}, {})", label, p.x(), p.y());
                    points.push(p);
                }
                Err(e) => log::warn!("{}: {}", label, e),
            }
        }
        Ok(ClickBatch::with_requested(label, required_count, points))
    }
}

/// One recorded batch of clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub label: String,
    pub points: Vec<Point>,
}

/// Ordered clicks of a whole session, replayable with [`ScriptedCapture`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureScript {
    pub batches: Vec<ScriptEntry>,
}

impl CaptureScript {
    pub fn push(&mut self, label: &str, points: &[Point]) {
        self.batches.push(ScriptEntry {
            label: label.to_string(),
            points: points.to_vec(),
        });
    }
}

/// Replays recorded clicks in order.
pub struct ScriptedCapture {
    pending: VecDeque<ScriptEntry>,
}

impl ScriptedCapture {
    pub fn new(script: CaptureScript) -> Self {
        Self {
            pending: script.batches.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl PointCapture for ScriptedCapture {
    fn capture(
        &mut self,
        source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError> {
        if required_count == 0 {
            return Err(CaptureError::ZeroClicks);
        }
        let entry = self
            .pending
            .pop_front()
            .ok_or_else(|| CaptureError::ScriptExhausted {
                label: label.to_string(),
            })?;
        if entry.label != label {
            return Err(CaptureError::LabelMismatch {
                label: label.to_string(),
                recorded: entry.label,
            });
        }
        log::debug!("replaying {} on {}: {:?}", label, source.frame, entry.points);
        let batch = ClickBatch::with_requested(label, required_count, entry.points);
        batch.check_count()?;
        Ok(batch)
    }
}

/// Passes clicks through from another capture and keeps a copy of each batch.
pub struct RecordingCapture<C: PointCapture> {
    inner: C,
    script: CaptureScript,
}

impl<C: PointCapture> RecordingCapture<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            script: CaptureScript::default(),
        }
    }

    pub fn script(&self) -> &CaptureScript {
        &self.script
    }

    pub fn into_script(self) -> CaptureScript {
        self.script
    }
}

impl<C: PointCapture> PointCapture for RecordingCapture<C> {
    fn capture(
        &mut self,
        source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError> {
        let batch = self.inner.capture(source, required_count, label)?;
        self.script.push(label, batch.points());
        Ok(batch)
    }
}
