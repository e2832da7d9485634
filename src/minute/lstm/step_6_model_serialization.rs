use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::step_3_lstm_model_arch::StackedLstm;
use super::step_4_train_model::EpochMetrics;
use crate::config::ForecastConfig;
use crate::constants::MODEL_FILE_NAME;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelMetadata {
    pub version: String,
    pub timestamp: u64,
    pub model_variant: String,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub num_layers: usize,
    pub input_length: usize,
}

impl ModelMetadata {
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            model_variant: config.model_variant.clone(),
            input_size: config.feature_width,
            hidden_size: config.hidden_size,
            output_size: config.horizon,
            num_layers: config.num_layers,
            input_length: config.input_length,
        }
    }
}

/// Base path (without extension) of the model saved for a variant
pub fn model_path(config: &ForecastConfig) -> PathBuf {
    config.variant_dir().join(MODEL_FILE_NAME)
}

/// Save the model with metadata to a file
pub fn save_model_with_metadata<B: Backend>(
    model: &StackedLstm<B>,
    metadata: &ModelMetadata,
    path: impl AsRef<Path>,
) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).context("Failed to create model parent directory")?;
    }
    let model_path = path.as_ref().with_extension("bin");
    model
        .clone()
        .save_file::<BinFileRecorder<FullPrecisionSettings>, _>(&model_path, &Default::default())
        .context("Failed to save model")?;

    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&metadata_path, metadata_json).context("Failed to write metadata file")?;
    info!("Model saved to {}", model_path.display());
    Ok(())
}

/// Load the model and its metadata from a file
pub fn load_model_with_metadata<B: Backend>(
    path: impl AsRef<Path>,
    device: &B::Device,
) -> Result<(StackedLstm<B>, ModelMetadata)> {
    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let metadata: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;

    // The record only carries weights; the shape comes from the metadata
    let model_path = path.as_ref().with_extension("bin");
    let skeleton = StackedLstm::new(
        metadata.input_size,
        metadata.hidden_size,
        metadata.output_size,
        metadata.num_layers,
        device,
    );
    let model = skeleton
        .load_file::<BinFileRecorder<FullPrecisionSettings>, _>(
            &model_path,
            &Default::default(),
            device,
        )
        .context("Failed to load model")?;
    info!("Model loaded from {}", model_path.display());
    Ok((model, metadata))
}

/// Check if a model file exists and is valid
pub fn verify_model(path: impl AsRef<Path>) -> Result<bool> {
    let model_path = path.as_ref().with_extension("bin");
    let metadata_path = path.as_ref().with_extension("meta.json");
    if !model_path.exists() || !metadata_path.exists() {
        return Ok(false);
    }
    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let _: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;
    Ok(true)
}

/// Write the per-epoch losses as `epoch,train_loss,val_loss` CSV
pub fn save_loss_history(history: &[EpochMetrics], path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).context("Failed to create loss history directory")?;
    }
    let epochs: Vec<u64> = history.iter().map(|m| m.epoch as u64).collect();
    let train: Vec<f64> = history.iter().map(|m| m.train_loss).collect();
    let val: Vec<f64> = history.iter().map(|m| m.val_loss).collect();
    let mut df = df!(
        "epoch" => epochs,
        "train_loss" => train,
        "val_loss" => val
    )?;

    let mut file = File::create(path.as_ref()).context("Failed to create loss history file")?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write loss history")?;
    Ok(())
}

/// Read a loss history written by [`save_loss_history`]
pub fn load_loss_history(path: impl AsRef<Path>) -> Result<Vec<EpochMetrics>> {
    let file = File::open(path.as_ref()).context("Failed to open loss history file")?;
    let df = CsvReader::new(file)
        .finish()
        .context("Failed to parse loss history")?;

    let column = |name: &str| -> Result<Vec<f64>> {
        let series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        series
            .f64()?
            .into_iter()
            .map(|v| v.with_context(|| format!("Missing value in column {}", name)))
            .collect()
    };
    let epochs = column("epoch")?;
    let train = column("train_loss")?;
    let val = column("val_loss")?;

    Ok(epochs
        .into_iter()
        .zip(train)
        .zip(val)
        .map(|((epoch, train_loss), val_loss)| EpochMetrics {
            epoch: epoch as usize,
            train_loss,
            val_loss,
        })
        .collect())
}
