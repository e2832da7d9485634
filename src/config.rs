// External imports
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Internal imports
use crate::constants;
use crate::error::{ForecastError, Result};

/// How the recorded per-epoch losses are normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LossNormalization {
    /// Mean squared error divided again by the window count, matching the
    /// reference training curves.
    #[default]
    ReferenceParity,
    /// Plain per-window mean squared error.
    Mean,
}

/// Run configuration passed to every component.
///
/// Defaults reproduce the reference setup: 100-minute windows, one-step
/// horizon, three stacked LSTM layers of width 100, 250 epochs of Adam at
/// 0.001 on an 80/20 chronological split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub input_length: usize,
    pub horizon: usize,
    pub feature_width: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub split_ratio: f64,
    pub report_every: usize,
    pub loss_normalization: LossNormalization,
    pub seed: u64,
    /// Which trained parameter set to save or load (e.g. `sept_oct`).
    pub model_variant: String,
    pub target_column: String,
    /// Number of windows to predict over when scoring.
    pub plot_extension: usize,
    /// Score on the test region (true) or on the training region (false).
    pub evaluate_on_test: bool,
    /// Robust-scale every column after loading, for CSVs holding raw prices.
    pub scale_features: bool,
    pub model_dir: PathBuf,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            input_length: constants::INPUT_LENGTH,
            horizon: constants::NUMBER_PREDICTIONS,
            feature_width: constants::FEATURE_WIDTH,
            hidden_size: constants::HIDDEN_SIZE,
            num_layers: constants::NUM_LAYERS,
            epochs: constants::EPOCHS,
            learning_rate: constants::LEARNING_RATE,
            split_ratio: constants::TRAIN_SPLIT_RATIO,
            report_every: constants::REPORT_EVERY,
            loss_normalization: LossNormalization::default(),
            seed: constants::SEED,
            model_variant: constants::MODEL_VARIANT.to_string(),
            target_column: constants::TARGET_COLUMN.to_string(),
            plot_extension: constants::PLOT_EXTENSION,
            evaluate_on_test: true,
            scale_features: false,
            model_dir: PathBuf::from(constants::MODEL_DIR),
        }
    }
}

impl ForecastConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no phase can run with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("input_length", self.input_length),
            ("horizon", self.horizon),
            ("feature_width", self.feature_width),
            ("hidden_size", self.hidden_size),
            ("num_layers", self.num_layers),
            ("epochs", self.epochs),
            ("report_every", self.report_every),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ForecastError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "split_ratio must lie in (0, 1), got {}",
                self.split_ratio
            )));
        }
        if self.model_variant.trim().is_empty() {
            return Err(ForecastError::InvalidConfig(
                "model_variant must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Directory holding the artifacts of the configured model variant.
    pub fn variant_dir(&self) -> PathBuf {
        self.model_dir.join(&self.model_variant)
    }
}
