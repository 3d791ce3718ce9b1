use thiserror::Error;

/// Malformed or degenerate calibration input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("reference markings need an even, non-zero number of clicks, got {0}")]
    OddOrEmptyMarkings(usize),
    #[error("{label}: expected {expected} clicks, got {actual}")]
    ClickCount {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("head and tail batches differ in size ({head} vs {tail})")]
    UnequalBatches { head: usize, tail: usize },
    #[error("real length must be positive, got {0} m")]
    NonPositiveLength(f64),
    #[error("reference points coincide, pixel length is zero")]
    ZeroPixelLength,
    #[error("{0}: click batch is empty")]
    EmptyBatch(String),
    #[error("calibration gives an unusable scale of {0} m/px")]
    InvalidScale(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("{0}: click batch is empty")]
    EmptyBatch(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    #[error("scale must be positive and finite, got {0}")]
    NonPositiveScale(f64),
    #[error("time interval must be positive and finite, got {0} s")]
    NonPositiveDeltaT(f64),
    #[error("pixel displacement must be non-negative and finite, got {0}")]
    InvalidDisplacement(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("{label}: expected {expected} clicks, got {actual}")]
    ClickCount {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("{label}: input ended after {got} of {expected} clicks")]
    Exhausted {
        label: String,
        expected: usize,
        got: usize,
    },
    #[error("{label}: reading clicks failed ({kind:?}): {message}")]
    Read {
        label: String,
        kind: std::io::ErrorKind,
        message: String,
    },
    #[error("{label}: no recorded batch left to replay")]
    ScriptExhausted { label: String },
    #[error("{label}: next recorded batch is `{recorded}`")]
    LabelMismatch { label: String, recorded: String },
    #[error("cannot parse `{0}` as a pixel coordinate")]
    Unparsable(String),
    #[error("click ({x}, {y}) lies outside the {width}x{height} frame")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
    #[error("click count must be at least 1")]
    ZeroClicks,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error(transparent)]
    Estimation(#[from] EstimationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, Error>;
