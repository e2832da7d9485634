/// # Stacked LSTM forecasting on minute bars
///
/// ## Module Structure:
///
/// 1. **step_1_tensor_preparation**: Feature matrix, chronological split and window construction
/// 2. **step_2_lstm_cell**: LSTM layer with packed gates and the stacked cell
/// 3. **step_3_lstm_model_arch**: `SequenceModel` contract and the stacked LSTM regressor
/// 4. **step_4_train_model**: Full-batch training loop with train/validation loss tracking
/// 5. **step_5_prediction**: Per-window prediction over a region
/// 6. **step_6_model_serialization**: Model, metadata and loss history persistence
/// 7. **step_7_evaluation**: RMSE and lagged directional accuracy
///
pub mod step_1_tensor_preparation;
pub mod step_2_lstm_cell;
pub mod step_3_lstm_model_arch;
pub mod step_4_train_model;
pub mod step_5_prediction;
pub mod step_6_model_serialization;
pub mod step_7_evaluation;
