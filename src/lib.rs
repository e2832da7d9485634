pub mod config;
pub mod constants;
pub mod error;
pub mod minute;
pub mod pipeline;
pub mod util {
    pub mod file_utils;
    pub mod model_logger;
    pub mod scaler;
}

pub use config::{ForecastConfig, LossNormalization};
pub use error::ForecastError;
pub use minute::lstm::step_1_tensor_preparation::{build_windows, FeatureMatrix, WindowSet};
pub use minute::lstm::step_3_lstm_model_arch::{SequenceModel, StackedLstm};
pub use minute::lstm::step_4_train_model::{train_model, EpochMetrics};
pub use minute::lstm::step_5_prediction::predict_sequence;
pub use minute::lstm::step_7_evaluation::{direction_accuracy, rmse, DirectionReport, Evaluation};
