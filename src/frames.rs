use glob::glob;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SessionConfig;
use crate::error::Result;

/// A frame, either by its index in the capture folder or by an explicit path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameId {
    Index(u32),
    Path(PathBuf),
}

impl FrameId {
    pub fn resolve(&self, config: &SessionConfig) -> PathBuf {
        match self {
            FrameId::Index(i) => config.frame_path(*i),
            FrameId::Path(p) => p.clone(),
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameId::Index(i) => write!(f, "frame {}", i),
            FrameId::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// The two frames a displacement is measured between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePair {
    pub first: FrameId,
    pub second: FrameId,
}

impl FramePair {
    pub fn new(first: FrameId, second: FrameId) -> FramePair {
        FramePair { first, second }
    }
}

/// Parses the frame index out of a file stem such as `P00020`.
fn path_to_index(path: &Path, config: &SessionConfig) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(config.frame_prefix.as_str())?.parse().ok()
}

/// Indices of the frames present in the data folder, sorted.
pub fn list_frames(config: &SessionConfig) -> Result<Vec<u32>> {
    let pattern = format!(
        "{}/{}*.{}",
        config.data_folder.display(),
        config.frame_prefix,
        config.frame_extension
    );
    log::trace!("listing frames with {}", pattern);
    let mut indices: Vec<u32> = glob(&pattern)?
        .filter_map(|p| p.ok())
        .filter_map(|p| path_to_index(&p, config))
        .collect();
    indices.sort_unstable();
    Ok(indices)
}

/// Width and height of an image, read from its header only.
pub fn frame_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}
