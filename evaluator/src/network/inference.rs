use candle_core::Result;

use crate::error::EvalError;

use super::linear::{relu, LinearLayer};
use super::model::Network;

/// Tensor-free copy of a [`Network`].
///
/// Useful for inspecting or exporting trained weights, and for scoring single
/// positions without building tensors. Produces the same scores as the candle
/// forward pass up to float rounding.
pub struct CpuNetwork {
    hidden: Vec<LinearLayer>,
    output: LinearLayer,

    // Scratch buffers to avoid allocation during forward pass
    buffers: Vec<Vec<f32>>,
    output_buffer: [f32; 1],
}

impl CpuNetwork {
    pub fn from_network(network: &Network) -> Result<Self> {
        let hidden = network
            .hidden
            .iter()
            .map(|(name, linear)| LinearLayer::from_candle_linear(name, linear))
            .collect::<Result<Vec<_>>>()?;
        let buffers = hidden.iter().map(|l| vec![0.0; l.output_size()]).collect();

        Ok(Self {
            hidden,
            output: LinearLayer::from_candle_linear("output", &network.output)?,
            buffers,
            output_buffer: [0.0; 1],
        })
    }

    /// Linear layers in forward order, output layer last.
    pub fn layers(&self) -> impl Iterator<Item = &LinearLayer> {
        self.hidden.iter().chain(std::iter::once(&self.output))
    }

    pub fn input_size(&self) -> usize {
        self.hidden[0].input_size()
    }

    /// Scores one encoded position. Inputs of any other width are rejected.
    pub fn forward(&mut self, input: &[f32]) -> std::result::Result<f32, EvalError> {
        if input.len() != self.input_size() {
            return Err(EvalError::width(self.input_size(), input.len()));
        }

        for i in 0..self.hidden.len() {
            let (done, rest) = self.buffers.split_at_mut(i);
            let layer_input: &[f32] = match done.last() {
                Some(prev) => prev,
                None => input,
            };
            self.hidden[i].forward(layer_input, &mut rest[0]);
            relu(&mut rest[0]);
        }

        let last = self.buffers.last().map(|b| b.as_slice()).unwrap_or(input);
        self.output.forward(last, &mut self.output_buffer);

        Ok(self.output_buffer[0])
    }
}
