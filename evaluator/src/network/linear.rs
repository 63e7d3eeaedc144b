use candle_core::{Error, Result};
use candle_nn::Linear;

// Linear layer copied out of the tensors for plain CPU inference and export.
#[derive(Debug, Clone)]
pub struct LinearLayer {
    name: String,
    weights: Box<[f32]>,
    biases: Box<[f32]>,
    input_size: usize,
    output_size: usize,
}

impl LinearLayer {
    pub fn from_candle_linear(name: &str, linear: &Linear) -> Result<Self> {
        let biases = linear
            .bias()
            .ok_or_else(|| Error::Msg(format!("layer {} has no bias", name)))?;

        Ok(Self {
            name: name.to_string(),
            weights: linear.weight().flatten_all()?.to_vec1()?.into_boxed_slice(),
            biases: biases.to_vec1()?.into_boxed_slice(),
            input_size: linear.weight().dim(1)?,
            output_size: linear.weight().dim(0)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row-major `[output][input]` weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn forward(&self, input: &[f32], output: &mut [f32]) {
        output.copy_from_slice(&self.biases);

        for (i, val) in output.iter_mut().enumerate().take(self.output_size) {
            let offset = i * self.input_size;
            let weights_row = &self.weights[offset..offset + self.input_size];
            *val += dot_product(input, weights_row);
        }
    }
}

#[inline(always)]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline(always)]
pub(crate) fn relu(values: &mut [f32]) {
    for val in values {
        *val = val.max(0.0);
    }
}
