use candle_core::{Result, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

use crate::config::NetworkConfig;

use super::layers::LayerDescriptor;

// Candle network definition (used for training, saving and loading)
pub struct Network {
    pub(crate) hidden: Vec<(String, Linear)>,
    pub(crate) output: Linear,
    descriptors: Vec<LayerDescriptor>,
}

impl Network {
    pub fn new(config: &NetworkConfig, vs: &VarBuilder) -> Result<Self> {
        let mut hidden = Vec::with_capacity(config.hidden_widths.len());
        let mut descriptors = Vec::with_capacity(config.hidden_widths.len() * 2 + 1);

        let mut inputs = config.input_width;
        for (i, &outputs) in config.hidden_widths.iter().enumerate() {
            let name = format!("hidden{}", i);
            hidden.push((name.clone(), linear(inputs, outputs, vs.pp(&name))?));
            descriptors.push(LayerDescriptor::linear(name, inputs, outputs));
            descriptors.push(LayerDescriptor::relu(format!("relu{}", i)));
            inputs = outputs;
        }

        let output = linear(inputs, 1, vs.pp("output"))?;
        descriptors.push(LayerDescriptor::linear("output", inputs, 1));

        Ok(Self {
            hidden,
            output,
            descriptors,
        })
    }

    pub fn descriptors(&self) -> &[LayerDescriptor] {
        &self.descriptors
    }
}

impl Module for Network {
    #[inline]
    fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let mut x = x.clone();
        for (_, layer) in &self.hidden {
            x = x.apply(layer)?.relu()?;
        }
        x.apply(&self.output)
    }
}
