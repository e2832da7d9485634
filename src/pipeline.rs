// External imports
use burn::tensor::backend::{AutodiffBackend, Backend};
use log::info;
use std::time::Instant;

// Internal imports
use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::minute::lstm::step_1_tensor_preparation::{FeatureMatrix, WindowSet};
use crate::minute::lstm::step_3_lstm_model_arch::{SequenceModel, StackedLstm};
use crate::minute::lstm::step_4_train_model::{train_model, EpochMetrics, TrainingData};
use crate::minute::lstm::step_5_prediction::predict_sequence;
use crate::minute::lstm::step_7_evaluation::{evaluate, ground_truth_slice, Evaluation};
use crate::util::scaler::InverseTransform;

/// Chronological regions of the feature matrix and their windows
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
    pub train_windows: WindowSet,
    pub test_windows: WindowSet,
}

impl PreparedData {
    /// Region and windows the configuration scores on
    pub fn evaluation_region(&self, config: &ForecastConfig) -> (&FeatureMatrix, &WindowSet) {
        if config.evaluate_on_test {
            (&self.test, &self.test_windows)
        } else {
            (&self.train, &self.train_windows)
        }
    }
}

/// Rescaled prediction run and its scores
#[derive(Debug, Clone)]
pub struct ScoredPredictions {
    pub predictions: Vec<f64>,
    pub ground_truth: Vec<f64>,
    pub evaluation: Evaluation,
}

/// Everything produced by one train-and-evaluate run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub history: Vec<EpochMetrics>,
    pub scored: ScoredPredictions,
    pub train_windows: usize,
    pub test_windows: usize,
    pub training_seconds: f64,
}

/// Split the matrix chronologically, then window each region on its own
pub fn prepare(matrix: &FeatureMatrix, config: &ForecastConfig) -> Result<PreparedData> {
    config.validate()?;
    if matrix.width() != config.feature_width {
        return Err(ForecastError::InvalidConfig(format!(
            "configured feature width {} but the matrix has {} columns",
            config.feature_width,
            matrix.width()
        )));
    }

    let (train, test) = matrix.split_chronological(config.split_ratio)?;
    info!(
        "Training region: {} rows, test region: {} rows",
        train.rows(),
        test.rows()
    );
    let train_windows = train.windows(config.input_length, config.horizon)?;
    let test_windows = test.windows(config.input_length, config.horizon)?;
    info!(
        "Windows: {} training, {} test",
        train_windows.len(),
        test_windows.len()
    );

    Ok(PreparedData {
        train,
        test,
        train_windows,
        test_windows,
    })
}

/// Build a freshly seeded model and train it, validating on the test windows
pub fn train<B: AutodiffBackend>(
    data: &PreparedData,
    config: &ForecastConfig,
    device: &B::Device,
) -> Result<(StackedLstm<B>, Vec<EpochMetrics>)> {
    B::seed(config.seed);
    let model = StackedLstm::<B>::from_config(config, device);
    let training = TrainingData::<B>::from_windows(&data.train_windows, &data.test_windows, device)?;
    train_model(model, &training, config)
}

/// Predict over a region, rescale both streams and score them
pub fn evaluate_trained<B, M>(
    model: &M,
    region: &FeatureMatrix,
    windows: &WindowSet,
    scaler: &dyn InverseTransform,
    config: &ForecastConfig,
    device: &B::Device,
) -> Result<ScoredPredictions>
where
    B: Backend,
    M: SequenceModel<B>,
{
    let (features, _) = windows.to_tensors::<B>(device);
    let raw = predict_sequence(model, &features, config.plot_extension, config.horizon)?;

    let target = region.target_values();
    let truth = ground_truth_slice(&target, config.input_length, raw.len())?;

    let predictions = scaler.inverse_transform(&raw);
    let ground_truth = scaler.inverse_transform(truth);
    let evaluation = evaluate(&predictions, &ground_truth, config.horizon)?;

    info!("RMSE: {:.6}", evaluation.rmse);
    info!(
        "Direction errors: {}/{}, accuracy: {:.2}%",
        evaluation.direction.errors,
        evaluation.direction.transitions,
        evaluation.direction.accuracy
    );
    Ok(ScoredPredictions {
        predictions,
        ground_truth,
        evaluation,
    })
}

/// Split, window, train, predict, rescale and score
pub fn run<B: AutodiffBackend>(
    matrix: &FeatureMatrix,
    scaler: &dyn InverseTransform,
    config: &ForecastConfig,
    device: &B::Device,
) -> Result<(StackedLstm<B::InnerBackend>, PipelineReport)> {
    let data = prepare(matrix, config)?;

    let start = Instant::now();
    let (model, history) = train::<B>(&data, config, device)?;
    let training_seconds = start.elapsed().as_secs_f64();

    let model = burn::module::AutodiffModule::valid(&model);
    let (region, windows) = data.evaluation_region(config);
    let scored = evaluate_trained::<B::InnerBackend, _>(
        &model, region, windows, scaler, config, device,
    )?;

    Ok((
        model,
        PipelineReport {
            history,
            scored,
            train_windows: data.train_windows.len(),
            test_windows: data.test_windows.len(),
            training_seconds,
        },
    ))
}
