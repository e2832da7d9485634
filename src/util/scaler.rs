use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ForecastError, Result};

/// Maps normalised values back to price units
pub trait InverseTransform {
    fn inverse_transform(&self, values: &[f64]) -> Vec<f64>;
}

/// Leaves values untouched, for data that was never scaled
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl InverseTransform for IdentityScaler {
    fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.to_vec()
    }
}

/// Median / interquartile-range scaler, robust to price spikes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    pub center: f64,
    pub scale: f64,
}

impl RobustScaler {
    /// Fit on the median and the 25th-75th percentile range of `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData {
                values: 0,
                horizon: 1,
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidMatrix(
                "cannot fit a scaler on non-finite values".into(),
            ));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let center = percentile(&sorted, 0.5);
        let range = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
        // Constant input keeps its offset but is not stretched
        let scale = if range == 0.0 { 1.0 } else { range };
        Ok(Self { center, scale })
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| (v - self.center) / self.scale).collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl InverseTransform for RobustScaler {
    fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| v * self.scale + self.center).collect()
    }
}

// Linear interpolation between the closest order statistics
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}
