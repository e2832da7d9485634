// External imports
use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

// Internal imports
use super::step_1_tensor_preparation::WindowSet;
use super::step_3_lstm_model_arch::SequenceModel;
use crate::config::{ForecastConfig, LossNormalization};
use crate::constants::ADAM_EPSILON;
use crate::error::{ForecastError, Result};

/// Train and validation loss recorded after one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: f64,
}

/// Training and validation windows as tensors on the autodiff backend
pub struct TrainingData<B: Backend> {
    pub train_features: Tensor<B, 3>,
    pub train_targets: Tensor<B, 2>,
    pub val_features: Tensor<B, 3>,
    pub val_targets: Tensor<B, 2>,
}

impl<B: Backend> TrainingData<B> {
    pub fn from_windows(train: &WindowSet, val: &WindowSet, device: &B::Device) -> Result<Self> {
        for (name, set) in [("training", train), ("validation", val)] {
            if set.is_empty() {
                return Err(ForecastError::InvalidMatrix(format!(
                    "{} window set is empty",
                    name
                )));
            }
        }
        let (train_features, train_targets) = train.to_tensors::<B>(device);
        let (val_features, val_targets) = val.to_tensors::<B>(device);
        Ok(Self {
            train_features,
            train_targets,
            val_features,
            val_targets,
        })
    }

    pub fn train_len(&self) -> usize {
        self.train_features.dims()[0]
    }

    pub fn val_len(&self) -> usize {
        self.val_features.dims()[0]
    }
}

/// Scalar loss recorded for an epoch from the mean squared error of `windows` windows
pub fn normalize_loss(mse: f64, windows: usize, normalization: LossNormalization) -> f64 {
    match normalization {
        LossNormalization::ReferenceParity => mse / windows as f64,
        LossNormalization::Mean => mse,
    }
}

/// Adam settings shared by every training run
pub fn adam_config() -> AdamConfig {
    AdamConfig::new().with_epsilon(ADAM_EPSILON)
}

/// Train `model` for `config.epochs` full-batch epochs.
///
/// Every epoch runs one forward pass over all training windows, one Adam step
/// on the mean squared error, then a gradient-free validation pass. The
/// returned history holds one entry per epoch, in order. A non-finite loss
/// aborts training with [`ForecastError::Divergence`].
pub fn train_model<B, M>(
    model: M,
    data: &TrainingData<B>,
    config: &ForecastConfig,
) -> Result<(M, Vec<EpochMetrics>)>
where
    B: AutodiffBackend,
    M: SequenceModel<B> + AutodiffModule<B>,
    M::InnerModule: SequenceModel<B::InnerBackend>,
{
    config.validate()?;
    let train_windows = data.train_len();
    let val_windows = data.val_len();
    info!(
        "Starting training: {} epochs, {} training windows, {} validation windows, {} parameters",
        config.epochs,
        train_windows,
        val_windows,
        model.num_parameters()
    );
    debug!(
        "Training features {:?}, targets {:?}",
        data.train_features.dims(),
        data.train_targets.dims()
    );

    let mut model = model;
    let mut optimizer = adam_config().init::<B, M>();
    let loss_fn = MseLoss::new();
    let val_features = data.val_features.clone().inner();
    let val_targets = data.val_targets.clone().inner();

    let mut history = Vec::with_capacity(config.epochs);
    let start = Instant::now();
    let mut report_start = Instant::now();

    for epoch in 0..config.epochs {
        // Forward pass over the whole training set
        let predictions = model.forward(data.train_features.clone());
        let loss = loss_fn.forward(predictions, data.train_targets.clone(), Reduction::Mean);
        let train_mse = loss.clone().into_scalar().elem::<f64>();
        let train_loss = normalize_loss(train_mse, train_windows, config.loss_normalization);

        // Backward pass and optimizer step
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optimizer.step(config.learning_rate, model, grads);

        // Validation without gradient tracking
        let val_predictions = model.valid().forward(val_features.clone());
        let val_mse = loss_fn
            .forward(val_predictions, val_targets.clone(), Reduction::Mean)
            .into_scalar()
            .elem::<f64>();
        let val_loss = normalize_loss(val_mse, val_windows, config.loss_normalization);

        if !train_loss.is_finite() || !val_loss.is_finite() {
            return Err(ForecastError::Divergence {
                epoch,
                train_loss,
                val_loss,
            });
        }

        history.push(EpochMetrics {
            epoch,
            train_loss,
            val_loss,
        });

        if epoch % config.report_every == 0 {
            info!(
                "Epoch {:>4}: train loss {:.8}, val loss {:.8}, {:.2}s",
                epoch,
                train_loss,
                val_loss,
                report_start.elapsed().as_secs_f64()
            );
            report_start = Instant::now();
        }
    }

    info!(
        "Training completed in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok((model, history))
}
