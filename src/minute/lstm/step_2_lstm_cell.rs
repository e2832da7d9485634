// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{activation, backend::Backend, Tensor};

/// One LSTM layer with the four gates packed into two projections
#[derive(Module, Debug)]
pub struct LstmLayer<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    // [input_size -> 4 * hidden_size], gate order: input, forget, cell, output
    input_weights: Linear<B>,
    hidden_weights: Linear<B>,
}

impl<B: Backend> LstmLayer<B> {
    pub fn new(input_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        let gate_size = 4 * hidden_size;
        Self {
            input_size,
            hidden_size,
            input_weights: LinearConfig::new(input_size, gate_size).init(device),
            hidden_weights: LinearConfig::new(hidden_size, gate_size).init(device),
        }
    }

    /// Run the layer over `[batch, seq_len, input_size]` starting from zero
    /// hidden and cell state. Returns `[batch, seq_len, hidden_size]`.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let device = x.device();
        let [batch_size, seq_len, _] = x.dims();

        let mut h = Tensor::<B, 2>::zeros([batch_size, self.hidden_size], &device);
        let mut c = Tensor::<B, 2>::zeros([batch_size, self.hidden_size], &device);
        let mut outputs = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let x_t = x
                .clone()
                .narrow(1, t, 1)
                .reshape([batch_size, self.input_size]);

            let gates = self.input_weights.forward(x_t) + self.hidden_weights.forward(h);
            let gates = gates.reshape([batch_size, 4, self.hidden_size]);
            let gate = |k: usize| {
                gates
                    .clone()
                    .narrow(1, k, 1)
                    .reshape([batch_size, self.hidden_size])
            };

            let i = activation::sigmoid(gate(0));
            let f = activation::sigmoid(gate(1));
            let g = activation::tanh(gate(2));
            let o = activation::sigmoid(gate(3));

            c = f * c + i * g;
            h = o * activation::tanh(c.clone());
            outputs.push(h.clone());
        }

        Tensor::stack(outputs, 1)
    }
}

/// Stack of LSTM layers; each layer reads the full output sequence of the one below
#[derive(Module, Debug)]
pub struct StackedLstmCell<B: Backend> {
    hidden_size: usize,
    layers: Vec<LstmLayer<B>>,
}

impl<B: Backend> StackedLstmCell<B> {
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        device: &B::Device,
    ) -> Self {
        let layers = (0..num_layers)
            .map(|layer| {
                let layer_input = if layer == 0 { input_size } else { hidden_size };
                LstmLayer::new(layer_input, hidden_size, device)
            })
            .collect();
        Self {
            hidden_size,
            layers,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Output sequence of the top layer, `[batch, seq_len, hidden_size]`
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.layers
            .iter()
            .fold(x, |sequence, layer| layer.forward(sequence))
    }
}
