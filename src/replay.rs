use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::{CaptureScript, ScriptedCapture};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::frames::FramePair;
use crate::io::object_from_json;
use crate::session::{CalibrationPlan, Session, SpeedReport};

/// Everything needed to recompute a session without an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    #[serde(default)]
    pub config: SessionConfig,
    pub plan: CalibrationPlan,
    pub frames: FramePair,
    pub script: CaptureScript,
}

impl RecordedSession {
    pub fn replay(&self) -> Result<SpeedReport> {
        let session = Session::new(&self.config)?;
        let mut capture = ScriptedCapture::new(self.script.clone());
        let report = session.run(&self.plan, &self.frames, &mut capture)?;
        if capture.remaining() > 0 {
            log::warn!("{} recorded batch(es) were not used", capture.remaining());
        }
        Ok(report)
    }
}

pub fn replay_file(path: &Path) -> Result<SpeedReport> {
    let recorded: RecordedSession = object_from_json(path)?;
    recorded.replay()
}

/// Recorded session files matching `pattern`, sorted.
pub fn find_sessions(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob(pattern)?
        .filter_map(|p| p.ok())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Replays every session in parallel; results keep the order of `paths`.
pub fn replay_all(paths: &[PathBuf]) -> Vec<(PathBuf, Result<SpeedReport>)> {
    paths
        .par_iter()
        .progress_count(paths.len() as u64)
        .map(|path| {
            log::trace!("replaying {}", path.display());
            (path.clone(), replay_file(path))
        })
        .collect()
}
