//! Volume trend: mean volume over the trailing window divided by the mean
//! volume of the whole series. Above 1 means recent volume runs hotter than
//! the long-run average.

use super::mean;

pub fn volume_trend(volumes: &[f64], window: usize) -> Option<f64> {
    let start = volumes.len().saturating_sub(window);
    let recent = mean(&volumes[start..])?;
    let overall = mean(volumes)?;
    Some(recent / overall)
}
