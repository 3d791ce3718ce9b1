use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::session::SpeedReport;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize, P: AsRef<Path>>(output_path: P, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned, P: AsRef<Path>>(file_path: P) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Writes a plain-text summary of one or more estimates.
pub fn write_report<P: AsRef<Path>>(output_path: P, reports: &[SpeedReport]) -> Result<()> {
    let mut s = String::new();
    for r in reports {
        s += format!("{} ({}):\n", r.method, r.timestamp).as_str();
        s += format!("    frames: {} -> {}\n", r.frames.first, r.frames.second).as_str();
        s += format!(
            "    scale: {:.3} px/m ({:.5} m/px) from {}\n",
            r.pixels_per_meter, r.meters_per_pixel, r.reference
        )
        .as_str();
        s += format!("    displacement: {:.2} px in {:.3} s\n", r.pixel_diff, r.delta_t).as_str();
        s += format!("    speed: {:.2} m/s ≈ {:.2} km/h\n\n", r.speed.mps, r.speed.kph).as_str();
    }
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(s.as_bytes())?;
    Ok(())
}
