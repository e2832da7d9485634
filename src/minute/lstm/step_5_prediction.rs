// External imports
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use log::info;

// Internal imports
use super::step_3_lstm_model_arch::SequenceModel;
use crate::error::{ForecastError, Result};

/// Indices of the windows visited when predicting `extension` steps
pub fn prediction_indices(extension: usize, horizon: usize) -> impl Iterator<Item = usize> {
    (0..extension).step_by(horizon.max(1))
}

/// Predict a flat sequence over the first `extension` windows.
///
/// Windows `0, P, 2P, ...` below `extension` are fed through the model one at
/// a time and all `P` outputs of each are appended, so the result holds
/// `ceil(extension / P) * P` values in time order.
pub fn predict_sequence<B, M>(
    model: &M,
    windows: &Tensor<B, 3>,
    extension: usize,
    horizon: usize,
) -> Result<Vec<f64>>
where
    B: Backend,
    M: SequenceModel<B>,
{
    if horizon == 0 {
        return Err(ForecastError::InvalidConfig(
            "horizon must be greater than zero".into(),
        ));
    }
    if horizon != model.horizon() {
        return Err(ForecastError::InvalidConfig(format!(
            "model predicts {} steps per window, horizon {} requested",
            model.horizon(),
            horizon
        )));
    }

    let available = windows.dims()[0];
    let selected = extension.div_ceil(horizon);
    if selected > 0 && (selected - 1) * horizon >= available {
        return Err(ForecastError::IndexOutOfRange {
            requested: extension,
            available,
        });
    }

    info!(
        "Predicting {} windows (extension {}, horizon {})",
        selected, extension, horizon
    );
    let mut predictions = Vec::with_capacity(selected * horizon);
    for index in prediction_indices(extension, horizon) {
        let window = windows.clone().narrow(0, index, 1);
        let output = model
            .forward(window)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| ForecastError::Tensor(format!("{:?}", e)))?;
        predictions.extend(output.into_iter().map(f64::from));
    }

    Ok(predictions)
}
