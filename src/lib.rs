pub mod calibration;
pub mod capture;
pub mod clicked_points;
pub mod config;
pub mod displacement;
pub mod error;
pub mod frames;
pub mod io;
pub mod replay;
pub mod session;
pub mod speed;

pub use calibration::{CalibrationMethod, ScaleFactor};
pub use clicked_points::{ClickBatch, Point};
pub use error::{Error, Result};
pub use speed::SpeedEstimate;
