use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_DELTA_T: f64 = 0.054;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds between the two analyzed frames.
    pub delta_t: f64,
    /// Number of one-meter marking pairs clicked for calibration.
    pub marking_pairs: usize,
    /// Clicks per frame on the vehicle head.
    pub head_clicks: usize,
    /// Clicks on each end of the known-length object.
    pub length_clicks: usize,
    pub data_folder: PathBuf,
    pub frame_prefix: String,
    pub frame_digits: usize,
    pub frame_extension: String,
    /// Frame showing the road markings.
    pub reference_frame: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delta_t: DEFAULT_DELTA_T,
            marking_pairs: 3,
            head_clicks: 3,
            length_clicks: 3,
            data_folder: PathBuf::from("./data/"),
            frame_prefix: "P".to_string(),
            frame_digits: 5,
            frame_extension: "bmp".to_string(),
            reference_frame: 75,
        }
    }
}

impl SessionConfig {
    /// Settings of the single-click variant: one marking pair, one click per point.
    pub fn single_click() -> Self {
        Self {
            marking_pairs: 1,
            head_clicks: 1,
            length_clicks: 1,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.delta_t.is_finite() || self.delta_t <= 0.0 {
            return Err(Error::Config(format!(
                "delta_t must be positive, got {}",
                self.delta_t
            )));
        }
        for (name, count) in [
            ("marking_pairs", self.marking_pairs),
            ("head_clicks", self.head_clicks),
            ("length_clicks", self.length_clicks),
        ] {
            if count == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    pub fn marking_clicks(&self) -> usize {
        self.marking_pairs * 2
    }

    pub fn frame_file_name(&self, index: u32) -> String {
        format!(
            "{}{:0width$}.{}",
            self.frame_prefix,
            index,
            self.frame_extension,
            width = self.frame_digits
        )
    }

    /// e.g. `./data/P00020.bmp`
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.data_folder.join(self.frame_file_name(index))
    }
}
