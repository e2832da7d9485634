// External crates
use anyhow::{bail, Context, Result};
use burn_autodiff::Autodiff;
use burn_ndarray::{NdArray, NdArrayDevice};
use log::{info, warn};
use std::env;
use std::path::{Path, PathBuf};

// Local modules
use minute_direction::config::ForecastConfig;
use minute_direction::constants::{LOSS_FILE_NAME, SCALER_FILE_NAME};
use minute_direction::minute::lstm::step_6_model_serialization::{
    load_loss_history, load_model_with_metadata, model_path, save_loss_history,
    save_model_with_metadata, verify_model, ModelMetadata,
};
use minute_direction::pipeline;
use minute_direction::util::file_utils::load_feature_matrix;
use minute_direction::util::model_logger::{create_report_dir, RunReport};
use minute_direction::util::scaler::{IdentityScaler, InverseTransform, RobustScaler};

type BurnBackend = Autodiff<NdArray<f32>>;
type InferenceBackend = NdArray<f32>;

fn usage() -> String {
    "usage: minute-direction <data_preprocessed.csv> [config.json] [--load]".to_string()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let load_existing = args.iter().any(|a| a == "--load");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let data_path = match positional.first() {
        Some(path) => PathBuf::from(path.as_str()),
        None => bail!(usage()),
    };
    let config = match positional.get(1) {
        Some(path) => ForecastConfig::from_file(path.as_str())
            .with_context(|| format!("Failed to load config {}", path))?,
        None => ForecastConfig::default(),
    };
    info!(
        "Variant: {} | T = {} | P = {} | epochs = {}",
        config.model_variant, config.input_length, config.horizon, config.epochs
    );

    let matrix = load_feature_matrix(&data_path, &config.target_column)
        .context("Failed to load feature matrix")?;
    let scaler_path = config.variant_dir().join(SCALER_FILE_NAME);
    let (matrix, scaler) = if config.scale_features {
        let (scaled, close_scaler) = matrix.robust_scaled()?;
        close_scaler.save(&scaler_path)?;
        info!(
            "Scaled features; close scaler (center {:.4}, scale {:.4}) saved to {}",
            close_scaler.center,
            close_scaler.scale,
            scaler_path.display()
        );
        (scaled, Box::new(close_scaler) as Box<dyn InverseTransform>)
    } else {
        (matrix, load_scaler(&scaler_path))
    };

    if load_existing {
        evaluate_saved_model(&matrix, scaler.as_ref(), &config)
    } else {
        train_and_evaluate(&matrix, scaler.as_ref(), &config)
    }
}

fn load_scaler(path: &Path) -> Box<dyn InverseTransform> {
    match RobustScaler::load(path) {
        Ok(scaler) => {
            info!("Using close scaler from {}", path.display());
            Box::new(scaler)
        }
        Err(e) => {
            warn!(
                "No close scaler at {} ({}); reporting metrics in normalised units",
                path.display(),
                e
            );
            Box::new(IdentityScaler)
        }
    }
}

fn train_and_evaluate(
    matrix: &minute_direction::FeatureMatrix,
    scaler: &dyn InverseTransform,
    config: &ForecastConfig,
) -> Result<()> {
    let device = NdArrayDevice::Cpu;
    let (model, report) = pipeline::run::<BurnBackend>(matrix, scaler, config, &device)
        .context("Training and evaluation failed")?;

    let path = model_path(config);
    save_model_with_metadata(&model, &ModelMetadata::from_config(config), &path)?;
    save_loss_history(&report.history, config.variant_dir().join(LOSS_FILE_NAME))?;

    let mut run_report = RunReport::new(config, report.train_windows, report.test_windows);
    if let Some(last) = report.history.last() {
        run_report.set_final_losses(last.train_loss, last.val_loss);
    }
    run_report.set_training_time(report.training_seconds);
    run_report.set_evaluation(&report.scored.evaluation);
    let report_path = run_report.save(&create_report_dir(&config.model_dir)?)?;

    info!("Model saved at: {}", path.display());
    info!("Run report saved at: {}", report_path.display());
    Ok(())
}

fn evaluate_saved_model(
    matrix: &minute_direction::FeatureMatrix,
    scaler: &dyn InverseTransform,
    config: &ForecastConfig,
) -> Result<()> {
    let device = NdArrayDevice::Cpu;
    let path = model_path(config);
    if !verify_model(&path)? {
        bail!("No trained model for variant {} at {}", config.model_variant, path.display());
    }
    let (model, metadata) = load_model_with_metadata::<InferenceBackend>(&path, &device)?;
    if metadata.input_size != config.feature_width || metadata.output_size != config.horizon {
        bail!(
            "Saved model expects {} features and horizon {}, config has {} and {}",
            metadata.input_size,
            metadata.output_size,
            config.feature_width,
            config.horizon
        );
    }

    let data = pipeline::prepare(matrix, config)?;
    let (region, windows) = data.evaluation_region(config);
    let scored = pipeline::evaluate_trained::<InferenceBackend, _>(
        &model, region, windows, scaler, config, &device,
    )?;

    let mut run_report = RunReport::new(config, data.train_windows.len(), data.test_windows.len());
    let loss_path = config.variant_dir().join(LOSS_FILE_NAME);
    match load_loss_history(&loss_path) {
        Ok(history) => {
            if let Some(last) = history.last() {
                run_report.set_final_losses(last.train_loss, last.val_loss);
            }
        }
        Err(e) => warn!("No loss history at {} ({})", loss_path.display(), e),
    }
    run_report.set_evaluation(&scored.evaluation);
    run_report.add_note(&format!("Evaluated saved model from {}", path.display()));
    let report_path = run_report.save(&create_report_dir(&config.model_dir)?)?;
    info!("Run report saved at: {}", report_path.display());
    Ok(())
}
