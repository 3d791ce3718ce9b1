use std::io::Cursor;
use vehicle_speed::capture::{
    CaptureScript, CaptureSource, PointCapture, RecordingCapture, ScriptedCapture, TerminalCapture,
};
use vehicle_speed::clicked_points::{ClickBatch, Point};
use vehicle_speed::config::SessionConfig;
use vehicle_speed::error::{CalibrationError, CaptureError, Error};
use vehicle_speed::frames::{FrameId, FramePair};
use vehicle_speed::session::{
    CalibrationPlan, Session, LABEL_FRAME_A_HEAD, LABEL_FRAME_B_HEAD, LABEL_MARKINGS,
    LABEL_VEHICLE_HEAD, LABEL_VEHICLE_TAIL,
};

fn ys(values: &[f64]) -> Vec<Point> {
    values.iter().map(|&y| Point::new(320.0, y)).collect()
}

fn frames() -> FramePair {
    FramePair::new(FrameId::Index(20), FrameId::Index(22))
}

#[test]
fn test_reference_markings_session() {
    let config = SessionConfig::default();
    let mut script = CaptureScript::default();
    script.push(LABEL_MARKINGS, &ys(&[10.0, 20.0, 15.0, 25.0, 12.0, 22.0]));
    script.push(LABEL_FRAME_A_HEAD, &ys(&[100.0, 100.0, 100.0]));
    script.push(LABEL_FRAME_B_HEAD, &ys(&[105.4, 105.4, 105.4]));

    let plan = CalibrationPlan::ReferenceMarkings {
        reference: FrameId::Index(75),
    };
    let session = Session::new(&config).unwrap();
    let report = session
        .run(&plan, &frames(), &mut ScriptedCapture::new(script))
        .unwrap();

    assert_eq!(report.method, "reference markings");
    assert!((report.pixels_per_meter - 10.0).abs() < 1e-9);
    assert!((report.pixel_diff - 5.4).abs() < 1e-9);
    assert!((report.speed.mps - 10.0).abs() < 1e-6);
    assert!((report.speed.kph - 36.0).abs() < 1e-6);
    assert_eq!(report.summary(), "reference markings: 10.00 m/s ≈ 36.00 km/h");
}

#[test]
fn test_known_length_session() {
    let config = SessionConfig::single_click();
    let mut script = CaptureScript::default();
    script.push(LABEL_VEHICLE_HEAD, &ys(&[100.0]));
    script.push(LABEL_VEHICLE_TAIL, &ys(&[160.0]));
    script.push(LABEL_FRAME_A_HEAD, &ys(&[200.0]));
    script.push(LABEL_FRAME_B_HEAD, &ys(&[203.0]));

    let plan = CalibrationPlan::KnownLength {
        reference: FrameId::Index(1),
        real_length_m: 4.8,
    };
    let session = Session::new(&config).unwrap();
    let report = session
        .run(&plan, &frames(), &mut ScriptedCapture::new(script))
        .unwrap();

    assert_eq!(report.method, "known length");
    assert!((report.meters_per_pixel - 0.08).abs() < 1e-12);
    assert!((report.speed.mps - 4.444_444).abs() < 1e-5);
    assert!((report.speed.kph - 16.0).abs() < 1e-9);
    assert_eq!(report.reference, FrameId::Index(1));
}

#[test]
fn test_session_from_terminal_input() {
    let config = SessionConfig::single_click();
    let input = Cursor::new("0 400\n0 380\n10 300\n12 340\n");
    let mut capture = RecordingCapture::new(TerminalCapture::without_bounds_check(input));
    let plan = CalibrationPlan::ReferenceMarkings {
        reference: FrameId::Index(75),
    };
    let session = Session::new(&config).unwrap();
    let report = session.run(&plan, &frames(), &mut capture).unwrap();

    // 20 px per meter, 40 px displacement -> 2 m in 0.054 s
    assert!((report.speed.mps - 2.0 / 0.054).abs() < 1e-9);
    let script = capture.into_script();
    assert_eq!(script.batches.len(), 3);
    assert_eq!(script.batches[0].label, LABEL_MARKINGS);
}

#[test]
fn test_session_degenerate_calibration() {
    let config = SessionConfig::single_click();
    let mut script = CaptureScript::default();
    script.push(LABEL_VEHICLE_HEAD, &ys(&[120.0]));
    script.push(LABEL_VEHICLE_TAIL, &ys(&[120.0]));
    let plan = CalibrationPlan::KnownLength {
        reference: FrameId::Index(1),
        real_length_m: 4.8,
    };
    let session = Session::new(&config).unwrap();
    let err = session
        .run(&plan, &frames(), &mut ScriptedCapture::new(script))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Calibration(CalibrationError::ZeroPixelLength)
    ));
}

#[test]
fn test_session_short_capture() {
    let config = SessionConfig::default();
    let mut script = CaptureScript::default();
    script.push(LABEL_MARKINGS, &ys(&[10.0, 20.0]));
    let plan = CalibrationPlan::ReferenceMarkings {
        reference: FrameId::Index(75),
    };
    let session = Session::new(&config).unwrap();
    let err = session
        .run(&plan, &frames(), &mut ScriptedCapture::new(script))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Capture(CaptureError::ClickCount {
            expected: 6,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_session_rejects_invalid_config() {
    let config = SessionConfig {
        delta_t: -1.0,
        ..Default::default()
    };
    assert!(matches!(Session::new(&config), Err(Error::Config(_))));
}

#[test]
fn test_calibration_plan_json() {
    let plan: CalibrationPlan = serde_json::from_str(
        r#"{"method": "known_length", "reference": 1, "real_length_m": 4.8}"#,
    )
    .unwrap();
    assert_eq!(
        plan,
        CalibrationPlan::KnownLength {
            reference: FrameId::Index(1),
            real_length_m: 4.8
        }
    );
    let plan: CalibrationPlan =
        serde_json::from_str(r#"{"method": "reference_markings", "reference": 75}"#).unwrap();
    assert_eq!(plan.reference(), &FrameId::Index(75));
}

/// Returns one click fewer than asked for on `short_label`, full batches elsewhere.
struct ShortCapture {
    short_label: &'static str,
}

impl PointCapture for ShortCapture {
    fn capture(
        &mut self,
        _source: &CaptureSource,
        required_count: usize,
        label: &str,
    ) -> Result<ClickBatch, CaptureError> {
        let n = if label == self.short_label {
            required_count - 1
        } else {
            required_count
        };
        let points = (0..n).map(|i| Point::new(0.0, 10.0 * i as f64)).collect();
        Ok(ClickBatch::new(label, points))
    }
}

#[test]
fn test_session_rejects_short_marking_batch() {
    let config = SessionConfig::default();
    let plan = CalibrationPlan::ReferenceMarkings {
        reference: FrameId::Index(75),
    };
    let session = Session::new(&config).unwrap();
    let mut capture = ShortCapture {
        short_label: LABEL_MARKINGS,
    };
    let err = session.run(&plan, &frames(), &mut capture).unwrap_err();
    assert!(matches!(
        err,
        Error::Calibration(CalibrationError::ClickCount {
            expected: 6,
            actual: 5,
            ..
        })
    ));
}

#[test]
fn test_session_rejects_short_tail_batch() {
    let config = SessionConfig::default();
    let plan = CalibrationPlan::KnownLength {
        reference: FrameId::Index(1),
        real_length_m: 4.8,
    };
    let session = Session::new(&config).unwrap();
    let mut capture = ShortCapture {
        short_label: LABEL_VEHICLE_TAIL,
    };
    let err = session.run(&plan, &frames(), &mut capture).unwrap_err();
    assert!(matches!(
        err,
        Error::Calibration(CalibrationError::ClickCount {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_session_rejects_short_head_batch() {
    let config = SessionConfig::default();
    let plan = CalibrationPlan::ReferenceMarkings {
        reference: FrameId::Index(75),
    };
    let session = Session::new(&config).unwrap();
    let mut capture = ShortCapture {
        short_label: LABEL_FRAME_B_HEAD,
    };
    let err = session.run(&plan, &frames(), &mut capture).unwrap_err();
    assert_eq!(
        err.to_string(),
        "frame B head: expected 3 clicks, got 2"
    );
    assert!(matches!(
        err,
        Error::Capture(CaptureError::ClickCount {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}
