use crate::clicked_points::ClickBatch;
use crate::error::MeasurementError;

/// Vertical pixel displacement between the mean click positions of two frames.
///
/// Batch sizes may differ. The result is unsigned, so swapping the batches
/// gives the same value.
pub fn measure(batch_a: &ClickBatch, batch_b: &ClickBatch) -> Result<f64, MeasurementError> {
    let y_a = batch_a
        .mean_y()
        .ok_or_else(|| MeasurementError::EmptyBatch(batch_a.label.clone()))?;
    let y_b = batch_b
        .mean_y()
        .ok_or_else(|| MeasurementError::EmptyBatch(batch_b.label.clone()))?;
    log::debug!("{}: mean y = {:.2}", batch_a.label, y_a);
    log::debug!("{}: mean y = {:.2}", batch_b.label, y_b);

    let pixel_diff = (y_b - y_a).abs();
    log::info!("head displacement = {:.2} px", pixel_diff);
    Ok(pixel_diff)
}
