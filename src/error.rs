use polars::error::PolarsError;
use thiserror::Error;

/// Errors raised by the windowing, training, prediction and scoring phases.
///
/// Every variant aborts the current phase. Sizes are carried along so the
/// caller can see what was requested against what was available.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(
        "not enough rows to build windows: {rows} rows, input length {input_length}, horizon {horizon} (need more than {})",
        .input_length + .horizon
    )]
    InvalidShape {
        rows: usize,
        input_length: usize,
        horizon: usize,
    },

    #[error("invalid feature matrix: {0}")]
    InvalidMatrix(String),

    #[error("training diverged at epoch {epoch}: train loss {train_loss}, validation loss {val_loss}")]
    Divergence {
        epoch: usize,
        train_loss: f64,
        val_loss: f64,
    },

    #[error("need at least two blocks of {horizon} values to score direction, got {values}")]
    InsufficientData { values: usize, horizon: usize },

    #[error("{values} values do not split into whole blocks of {horizon}")]
    PartialBlock { values: usize, horizon: usize },

    #[error("requested {requested} steps but only {available} are available")]
    IndexOutOfRange { requested: usize, available: usize },

    #[error("prediction stream has {predictions} values but ground truth has {ground_truth}")]
    LengthMismatch {
        predictions: usize,
        ground_truth: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tensor data error: {0}")]
    Tensor(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
