use tempfile::TempDir;
use vehicle_speed::capture::CaptureScript;
use vehicle_speed::clicked_points::Point;
use vehicle_speed::config::SessionConfig;
use vehicle_speed::frames::{FrameId, FramePair};
use vehicle_speed::io::{object_from_json, object_to_json, write_report};
use vehicle_speed::replay::{find_sessions, replay_all, replay_file, RecordedSession};
use vehicle_speed::session::{
    CalibrationPlan, LABEL_FRAME_A_HEAD, LABEL_FRAME_B_HEAD, LABEL_MARKINGS,
};

fn recorded(head_b: f64) -> RecordedSession {
    let mut script = CaptureScript::default();
    script.push(
        LABEL_MARKINGS,
        &[Point::new(0.0, 10.0), Point::new(0.0, 20.0)],
    );
    script.push(LABEL_FRAME_A_HEAD, &[Point::new(0.0, 100.0)]);
    script.push(LABEL_FRAME_B_HEAD, &[Point::new(0.0, head_b)]);
    RecordedSession {
        config: SessionConfig::single_click(),
        plan: CalibrationPlan::ReferenceMarkings {
            reference: FrameId::Index(75),
        },
        frames: FramePair::new(FrameId::Index(20), FrameId::Index(22)),
        script,
    }
}

#[test]
fn test_recorded_session_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("session.json");
    object_to_json(&path, &recorded(105.4)).unwrap();

    let loaded: RecordedSession = object_from_json(&path).unwrap();
    assert_eq!(loaded, recorded(105.4));

    let report = replay_file(&path).unwrap();
    assert!((report.speed.kph - 36.0).abs() < 1e-6);
}

#[test]
fn test_replay_all_keeps_order_and_errors() {
    let temp_dir = TempDir::new().unwrap();
    object_to_json(temp_dir.path().join("a.json"), &recorded(105.4)).unwrap();
    object_to_json(temp_dir.path().join("b.json"), &recorded(110.8)).unwrap();
    std::fs::write(temp_dir.path().join("c.json"), "{ not json").unwrap();
    std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

    let pattern = format!("{}/*", temp_dir.path().display());
    let paths = find_sessions(&pattern).unwrap();
    assert_eq!(paths.len(), 3);

    let results = replay_all(&paths);
    assert_eq!(results.len(), 3);
    assert!(results[0].0.ends_with("a.json"));
    let a = results[0].1.as_ref().unwrap();
    let b = results[1].1.as_ref().unwrap();
    assert!((a.speed.mps - 10.0).abs() < 1e-6);
    assert!((b.speed.mps - 20.0).abs() < 1e-6);
    assert!(results[2].1.is_err());
}

#[test]
fn test_write_report() {
    let temp_dir = TempDir::new().unwrap();
    let report = recorded(105.4).replay().unwrap();
    let output = temp_dir.path().join("report.txt");
    write_report(&output, &[report.clone()]).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("reference markings"));
    assert!(content.contains("frame 20 -> frame 22"));
    assert!(content.contains("10.00 m/s ≈ 36.00 km/h"));

    let json_path = temp_dir.path().join("report.json");
    object_to_json(&json_path, &report).unwrap();
    let json: serde_json::Value = object_from_json(&json_path).unwrap();
    assert_eq!(json["method"], "reference markings");
    assert!(json["speed"]["kph"].is_number());
    assert_eq!(json["frames"]["first"], 20);
}

#[test]
fn test_missing_file() {
    assert!(replay_file(std::path::Path::new("non_existent_session.json")).is_err());
}
