// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;

// Internal imports
use super::step_2_lstm_cell::StackedLstmCell;
use crate::config::ForecastConfig;

/// Trainable parameter state of a sequence model
pub type ModelState<B, M> = <M as Module<B>>::Record;

/// Regressor from a batch of windows to per-window target predictions.
///
/// Any Burn module mapping `[batch, steps, features]` to `[batch, horizon]`
/// can be trained, used for prediction and persisted through this trait.
pub trait SequenceModel<B: Backend>: Module<B> {
    /// Predict `[batch, horizon]` targets from `[batch, steps, features]` windows
    fn forward(&self, windows: Tensor<B, 3>) -> Tensor<B, 2>;

    /// Number of target steps produced per window
    fn horizon(&self) -> usize;

    /// Snapshot of the trainable parameters
    fn parameters(&self) -> ModelState<B, Self>
    where
        Self: Sized,
    {
        self.clone().into_record()
    }

    fn num_parameters(&self) -> usize {
        self.num_params()
    }
}

/// Stacked LSTM with a linear head on the last time step
#[derive(Module, Debug)]
pub struct StackedLstm<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    lstm: StackedLstmCell<B>,
    output: Linear<B>,
}

impl<B: Backend> StackedLstm<B> {
    /// Create a new StackedLstm model
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        num_layers: usize,
        device: &B::Device,
    ) -> Self {
        let lstm = StackedLstmCell::new(input_size, hidden_size, num_layers, device);
        let output = LinearConfig::new(hidden_size, output_size).init(device);

        Self {
            input_size,
            hidden_size,
            output_size,
            lstm,
            output,
        }
    }

    /// Build the model described by a run configuration
    pub fn from_config(config: &ForecastConfig, device: &B::Device) -> Self {
        Self::new(
            config.feature_width,
            config.hidden_size,
            config.horizon,
            config.num_layers,
            device,
        )
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn num_layers(&self) -> usize {
        self.lstm.num_layers()
    }
}

impl<B: Backend> SequenceModel<B> for StackedLstm<B> {
    fn forward(&self, windows: Tensor<B, 3>) -> Tensor<B, 2> {
        let sequence = self.lstm.forward(windows);
        let [batch_size, seq_len, hidden] = sequence.dims();

        let last_step = sequence
            .narrow(1, seq_len - 1, 1)
            .reshape([batch_size, hidden]);

        self.output.forward(last_step)
    }

    fn horizon(&self) -> usize {
        self.output_size
    }
}
